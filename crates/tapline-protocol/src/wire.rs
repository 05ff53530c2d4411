//! Response payload decoding.
//!
//! Payloads are decoded one entry at a time: each entry either validates
//! into its wire struct or is dropped with a `debug!` record. A malformed
//! entry never fails its siblings or the enclosing response.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Execution state reported in `{ "execution": <state> }` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionState
{
    /// The debuggee is running (also used for absent or unknown states).
    Running,
    /// Paused by a pause command or by an actor outside this session.
    ExternallyPaused,
    /// Stopped on a breakpoint.
    BreakpointPaused,
    /// Stopped after a step.
    StepPaused,
    /// The debuggee has finished.
    Terminated,
}

impl ExecutionState
{
    /// Map the wire string to a state. Unknown strings mean `Running`.
    #[must_use]
    pub fn from_wire(value: &str) -> Self
    {
        match value {
            "paused" => Self::ExternallyPaused,
            "breakpoint" => Self::BreakpointPaused,
            "step" => Self::StepPaused,
            "terminated" => Self::Terminated,
            _ => Self::Running,
        }
    }
}

impl fmt::Display for ExecutionState
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(match self {
            Self::Running => "running",
            Self::ExternallyPaused => "paused",
            Self::BreakpointPaused => "breakpoint",
            Self::StepPaused => "step",
            Self::Terminated => "terminated",
        })
    }
}

/// Read the `execution` field of a control or poll response.
///
/// A missing field, a non-string value or a body that is not an object all
/// decode as [`ExecutionState::Running`].
#[must_use]
pub fn decode_execution(payload: &Value) -> ExecutionState
{
    payload
        .get("execution")
        .and_then(Value::as_str)
        .map_or(ExecutionState::Running, ExecutionState::from_wire)
}

/// One entry of the `stacktrace` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFrame
{
    pub name: String,
    pub source_uri: String,
    #[serde(default)]
    pub source_number: Option<i64>,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// One node of a `values` response.
///
/// `children` is kept as raw JSON so that each child validates on its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireVariable
{
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
    #[serde(default)]
    pub children: Option<Value>,
}

impl WireVariable
{
    /// Raw child entries, if `children` is an array.
    #[must_use]
    pub fn child_entries(&self) -> Option<&[Value]>
    {
        self.children.as_ref().and_then(Value::as_array).map(Vec::as_slice)
    }
}

/// Response of `breakpoints/set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireBreakpoints
{
    /// Canonical identifier the remote uses for the file, if it sent one.
    pub source_uri: Option<String>,
    /// Lines the remote confirmed.
    pub lines: Vec<u32>,
}

/// Decode a `breakpoints/set` response, dropping non-numeric lines.
#[must_use]
pub fn decode_breakpoints(payload: &Value) -> WireBreakpoints
{
    let source_uri = payload.get("sourceUri").and_then(Value::as_str).map(str::to_string);
    let lines = payload
        .get("breakpoints")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_u64().and_then(|line| u32::try_from(line).ok()))
                .collect()
        })
        .unwrap_or_default();

    WireBreakpoints { source_uri, lines }
}

/// Decode a single entry, returning `None` if it does not validate.
#[must_use]
pub fn decode_entry<T: DeserializeOwned>(entry: &Value) -> Option<T>
{
    match T::deserialize(entry) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            debug!(%err, "dropping malformed entry");
            None
        }
    }
}

/// Decode every valid entry of `entries`, in order.
#[must_use]
pub fn decode_entries<T: DeserializeOwned>(entries: &[Value]) -> Vec<T>
{
    entries.iter().filter_map(decode_entry).collect()
}

/// Decode a response that should be an array of entries.
///
/// Anything other than an array yields no entries.
#[must_use]
pub fn decode_list<T: DeserializeOwned>(payload: &Value) -> Vec<T>
{
    payload.as_array().map(|entries| decode_entries(entries)).unwrap_or_default()
}
