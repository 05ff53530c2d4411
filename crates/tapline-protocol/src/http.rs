//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::trace;
use url::Url;

use crate::error::{ProtocolError, ProtocolResult};
use crate::transport::{Fetched, Transport};

/// Production [`Transport`] issuing plain `GET` requests.
#[derive(Debug, Clone)]
pub struct HttpTransport
{
    client: reqwest::Client,
}

impl HttpTransport
{
    /// Create a transport whose requests fail after `timeout` (if given).
    ///
    /// ## Errors
    ///
    /// Returns [`ProtocolError::Http`] if the underlying client cannot be built
    /// (for example when the TLS backend fails to initialize).
    pub fn new(timeout: Option<Duration>) -> ProtocolResult<Self>
    {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport
{
    async fn fetch(&self, url: &Url) -> ProtocolResult<Fetched>
    {
        trace!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProtocolError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        trace!(%url, bytes = body.len(), "response collected");

        Ok(Fetched::new(url.clone(), content_type, body))
    }
}
