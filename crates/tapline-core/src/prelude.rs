//! Common module for library exports

pub use crate::config::SessionConfig;
pub use crate::controller::ExecutionController;
pub use crate::error::{Result, TaplineError};
pub use crate::events::{OutputCategory, SessionEvent, SessionEventReceiver, StopReason};
pub use crate::session::Session;
pub use crate::types::{Breakpoint, BreakpointSet, Scope, StackFrame, Variable, VariableReference};
pub use tapline_protocol::{Endpoint, ExecutionState, Transport};
