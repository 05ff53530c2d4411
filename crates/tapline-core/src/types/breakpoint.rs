//! Breakpoint types.
//!
//! Breakpoints are owned by the remote debuggee. The client keeps no set of
//! its own: each update replaces every breakpoint of one file and the answer
//! is taken as-is.

/// A breakpoint the remote debuggee confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Breakpoint
{
    /// Remote identifier of the file.
    pub source_identifier: String,
    /// Confirmed line.
    pub line: u32,
}

/// Result of replacing the breakpoints of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointSet
{
    /// Identifier the remote uses for the file; use it for later correlation.
    pub source_uri: String,
    /// Lines the remote will actually break on.
    pub verified_lines: Vec<u32>,
}

impl BreakpointSet
{
    /// Whether `line` was confirmed.
    #[must_use]
    pub fn is_verified(&self, line: u32) -> bool
    {
        self.verified_lines.contains(&line)
    }

    /// One [`Breakpoint`] per verified line.
    #[must_use]
    pub fn breakpoints(&self) -> Vec<Breakpoint>
    {
        self.verified_lines
            .iter()
            .map(|&line| Breakpoint {
                source_identifier: self.source_uri.clone(),
                line,
            })
            .collect()
    }
}
