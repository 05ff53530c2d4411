//! # Error Types
//!
//! General error handling for Tapline sessions.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Session operations never hand these errors to their callers: a protocol
//! failure ends the session and is reported as an
//! [`Output`](crate::events::SessionEvent::Output) event followed by
//! [`End`](crate::events::SessionEvent::End). The error type is still used
//! internally and when building a session.

use tapline_protocol::ProtocolError;
use thiserror::Error;

/// Main error type for Tapline
///
/// ## Error Categories
///
/// 1. **Protocol errors**: the remote debuggee could not be reached or sent
///    a body that could not be decoded
/// 2. **Configuration errors**: an unusable endpoint or interval
#[derive(Error, Debug)]
pub enum TaplineError
{
    /// Talking to the remote debuggee failed
    ///
    /// This happens when:
    /// - The connection is refused, reset or times out
    /// - The remote answers with a non-success status
    /// - A JSON endpoint returns a body that is not JSON
    #[error("Remote debuggee unavailable: {0}")]
    Protocol(#[from] ProtocolError),

    /// The session configuration cannot be used
    ///
    /// Examples:
    /// - An endpoint that is not an `http`/`https` URL
    /// - A zero poll interval
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for `Result<T, TaplineError>`
///
/// ```rust
/// use tapline_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, TaplineError>;
