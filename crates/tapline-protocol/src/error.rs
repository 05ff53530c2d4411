//! # Error Types
//!
//! Failures that can occur while talking to the remote debuggee.
//!
//! Every variant here is a *transport failure* from the session's point of
//! view: the session treats any of them as "the remote debuggee is gone".

use thiserror::Error;
use url::Url;

/// Error returned by a [`Transport`](crate::Transport) or by response decoding.
#[derive(Error, Debug)]
pub enum ProtocolError
{
    /// The HTTP request could not be sent or its body could not be read
    ///
    /// Covers refused connections, timeouts, resets and bodies that are not
    /// valid text.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote debuggee answered with a non-success status code
    #[error("{url} answered with HTTP status {status}")]
    Status
    {
        /// Requested URL
        url: Url,
        /// Status code returned by the remote debuggee
        status: u16,
    },

    /// A response body that must be JSON could not be parsed
    #[error("invalid JSON from {url}: {source}")]
    InvalidJson
    {
        /// Requested URL
        url: Url,
        /// Underlying parse failure
        source: serde_json::Error,
    },

    /// A route could not be resolved against the configured base URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenience type alias for `Result<T, ProtocolError>`
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
