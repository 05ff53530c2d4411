//! Session event types and helpers.
//!
//! The front end consumes these events to learn about state changes it did
//! not cause directly: a breakpoint hit detected by the poll loop, a step
//! that completed, or the remote debuggee going away. Each remote state
//! transition produces exactly one event.

use std::fmt;

use tapline_protocol::ExecutionState;
use tokio::sync::mpsc;

/// Why execution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason
{
    /// Paused by a pause command or by an actor outside this session.
    Pause,
    /// Stopped on a breakpoint.
    Breakpoint,
    /// A step completed.
    Step,
}

impl StopReason
{
    /// Stop reason for a paused execution state, `None` otherwise.
    #[must_use]
    pub const fn from_state(state: ExecutionState) -> Option<Self>
    {
        match state {
            ExecutionState::ExternallyPaused => Some(Self::Pause),
            ExecutionState::BreakpointPaused => Some(Self::Breakpoint),
            ExecutionState::StepPaused => Some(Self::Step),
            ExecutionState::Running | ExecutionState::Terminated => None,
        }
    }
}

/// Category attached to [`SessionEvent::Output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputCategory
{
    /// Informational text for the debug console.
    Console,
    /// Error text, e.g. why the session ended.
    Stderr,
}

impl fmt::Display for OutputCategory
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(match self {
            Self::Console => "console",
            Self::Stderr => "stderr",
        })
    }
}

/// Event emitted by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent
{
    /// Execution stopped.
    Stopped(StopReason),
    /// Text for the front end's output view.
    Output
    {
        /// Kind of output.
        category: OutputCategory,
        /// The text itself.
        text: String,
    },
    /// The session is over. Sent at most once.
    End,
}

impl SessionEvent
{
    /// Human-readable description of the event.
    #[must_use]
    pub fn describe(&self) -> String
    {
        match self {
            Self::Stopped(reason) => format_stop_reason(*reason),
            Self::Output { category, text } => format!("[{category}] {text}"),
            Self::End => "Debug session ended".to_string(),
        }
    }
}

/// Format a [`StopReason`] into a user-facing message.
#[must_use]
pub fn format_stop_reason(reason: StopReason) -> String
{
    match reason {
        StopReason::Pause => "Paused".to_string(),
        StopReason::Breakpoint => "Stopped on breakpoint".to_string(),
        StopReason::Step => "Stopped after step".to_string(),
    }
}

/// Sender side of the session event channel.
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;
/// Receiver side of the session event channel.
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create a new session event channel.
#[must_use]
pub fn event_channel() -> (SessionEventSender, SessionEventReceiver)
{
    mpsc::unbounded_channel()
}
