//! Route builder for the remote debuggee's HTTP surface.
//!
//! | Route | Query |
//! |---|---|
//! | `execution/{continue,step,pause,poll}` | |
//! | `stacktrace` | |
//! | `breakpoints/set` | `path`, `lines` (comma-joined) |
//! | `values/stack` | |
//! | `values` | `path` |
//! | `sources/content` | `uri` |
//!
//! Routes are resolved relative to the base URL, so a base carrying a path
//! prefix (`http://host:8000/debug/`) works the same as a bare host.

use std::fmt;

use url::Url;

use crate::error::ProtocolResult;

/// Requests served under `execution/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionAction
{
    /// Resume execution.
    Continue,
    /// Execute one step.
    Step,
    /// Interrupt execution.
    Pause,
    /// Sample the current state without changing it.
    Poll,
}

impl ExecutionAction
{
    /// Route segment for this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str
    {
        match self {
            Self::Continue => "continue",
            Self::Step => "step",
            Self::Pause => "pause",
            Self::Poll => "poll",
        }
    }
}

impl fmt::Display for ExecutionAction
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

/// Base URL of a remote debuggee plus the routes it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint
{
    base: Url,
}

impl Endpoint
{
    /// Wrap a base URL. A trailing `/` is added to the path if missing so that
    /// routes resolve underneath it instead of replacing its last segment.
    #[must_use]
    pub fn new(mut base: Url) -> Self
    {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Self { base }
    }

    /// Parse a base URL.
    ///
    /// ## Errors
    ///
    /// Returns [`ProtocolError::InvalidUrl`](crate::ProtocolError::InvalidUrl) if `base` is not a valid URL.
    pub fn parse(base: &str) -> ProtocolResult<Self>
    {
        Ok(Self::new(Url::parse(base)?))
    }

    /// The normalized base URL.
    #[must_use]
    pub fn base(&self) -> &Url
    {
        &self.base
    }

    fn route(&self, path: &str) -> ProtocolResult<Url>
    {
        Ok(self.base.join(path)?)
    }

    /// `execution/<action>`
    ///
    /// ## Errors
    ///
    /// Fails only if the base URL cannot carry a path.
    pub fn execution(&self, action: ExecutionAction) -> ProtocolResult<Url>
    {
        self.route(&format!("execution/{action}"))
    }

    /// `stacktrace`
    ///
    /// ## Errors
    ///
    /// Fails only if the base URL cannot carry a path.
    pub fn stack_trace(&self) -> ProtocolResult<Url>
    {
        self.route("stacktrace")
    }

    /// `breakpoints/set?path=..&lines=..`
    ///
    /// ## Errors
    ///
    /// Fails only if the base URL cannot carry a path.
    pub fn set_breakpoints(&self, path: &str, lines: &[u32]) -> ProtocolResult<Url>
    {
        let lines = lines.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
        let mut url = self.route("breakpoints/set")?;
        url.query_pairs_mut().append_pair("path", path).append_pair("lines", &lines);
        Ok(url)
    }

    /// `values/stack`: the whole value tree of the current stack top.
    ///
    /// ## Errors
    ///
    /// Fails only if the base URL cannot carry a path.
    pub fn stack_values(&self) -> ProtocolResult<Url>
    {
        self.route("values/stack")
    }

    /// `values?path=..`: a single node addressed by its dotted path.
    ///
    /// ## Errors
    ///
    /// Fails only if the base URL cannot carry a path.
    pub fn values(&self, path: &str) -> ProtocolResult<Url>
    {
        let mut url = self.route("values")?;
        url.query_pairs_mut().append_pair("path", path);
        Ok(url)
    }

    /// `sources/content?uri=..`
    ///
    /// ## Errors
    ///
    /// Fails only if the base URL cannot carry a path.
    pub fn source_content(&self, uri: &str) -> ProtocolResult<Url>
    {
        let mut url = self.route("sources/content")?;
        url.query_pairs_mut().append_pair("uri", uri);
        Ok(url)
    }
}
