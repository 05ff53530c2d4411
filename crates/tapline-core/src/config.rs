//! Session configuration.

use std::time::Duration;

use tapline_protocol::Endpoint;

use crate::error::{Result, TaplineError};

/// Delay between two poll requests while the debuggee is running.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound for a single request when using the HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a session needs to reach and sample a remote debuggee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig
{
    /// Base URL of the remote debuggee.
    pub endpoint: Endpoint,
    /// Delay before the next poll while the debuggee is running.
    pub poll_interval: Duration,
    /// Per-request timeout for the HTTP transport (`None` = no timeout).
    pub request_timeout: Option<Duration>,
}

impl SessionConfig
{
    /// Configuration with default timings for the debuggee at `endpoint`.
    ///
    /// ## Errors
    ///
    /// - `Protocol`: `endpoint` is not a valid URL
    /// - `InvalidConfig`: `endpoint` is not an `http` or `https` URL
    pub fn new(endpoint: &str) -> Result<Self>
    {
        let endpoint = Endpoint::parse(endpoint)?;
        match endpoint.base().scheme() {
            "http" | "https" => {}
            other => {
                return Err(TaplineError::InvalidConfig(format!(
                    "unsupported endpoint scheme '{other}', expected http or https"
                )))
            }
        }

        Ok(Self {
            endpoint,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        })
    }

    /// Replace the poll interval.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidConfig` for a zero interval, which would turn the poll
    /// loop into a busy loop.
    pub fn with_poll_interval(mut self, interval: Duration) -> Result<Self>
    {
        if interval.is_zero() {
            return Err(TaplineError::InvalidConfig("poll interval must be greater than zero".to_string()));
        }
        self.poll_interval = interval;
        Ok(self)
    }

    /// Replace the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self
    {
        self.request_timeout = timeout;
        self
    }
}
