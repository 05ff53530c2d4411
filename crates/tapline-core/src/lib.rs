//! # tapline-core
//!
//! Execution-state synchronization engine for remote debuggees reachable
//! over HTTP.
//!
//! This crate provides:
//! - An execution controller that issues continue/step/pause commands and
//!   polls the remote debuggee to notice pauses it did not cause
//! - A variable tree cache handing out stable references for drill-down
//! - Normalization of front-end paths into remote source identifiers
//! - A session facade combining the above into front-end operations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tapline_core::{Session, SessionConfig};
//!
//! # async fn example() -> tapline_core::Result<()> {
//! let config = SessionConfig::new("http://127.0.0.1:8000/")?;
//! let (session, mut events) = Session::connect(&config)?;
//! session.start();
//!
//! while let Some(event) = events.recv().await {
//!     println!("{}", event.describe());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod path;
pub mod prelude;
pub mod session;
pub mod types;
pub mod variables;

// Re-export commonly used types
pub use config::SessionConfig;
pub use controller::ExecutionController;
pub use error::{Result, TaplineError};
pub use events::{SessionEvent, StopReason};
pub use session::Session;
pub use tapline_protocol::ExecutionState;
pub use types::{BreakpointSet, Scope, StackFrame, Variable, VariableReference};
