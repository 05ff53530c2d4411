//! # Tapline Utilities
//!
//! Shared utilities for the Tapline workspace, mainly the logging setup used
//! by the command-line front end.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! binary's job and goes through [`init_logging`].

pub mod logging;

// Re-export commonly used logging items for convenience
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
