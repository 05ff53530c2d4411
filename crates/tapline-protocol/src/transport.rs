//! Transport abstraction.
//!
//! A transport issues exactly one outbound request per call and resolves
//! exactly once, with either the full response or an error. It never retries
//! and never inspects the payload beyond collecting it as text.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::{ProtocolError, ProtocolResult};

/// A fully collected response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched
{
    /// URL that produced this response.
    pub url: Url,
    /// Value of the `Content-Type` header, if the remote sent one.
    pub content_type: Option<String>,
    /// Complete response body.
    pub body: String,
}

impl Fetched
{
    /// Build a response from its parts.
    #[must_use]
    pub fn new(url: Url, content_type: Option<String>, body: impl Into<String>) -> Self
    {
        Self {
            url,
            content_type,
            body: body.into(),
        }
    }

    /// Whether the remote labelled the body as text (`text/*`).
    #[must_use]
    pub fn is_text(&self) -> bool
    {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.trim_start().to_ascii_lowercase().starts_with("text/"))
    }

    /// Parse the body as JSON.
    ///
    /// ## Errors
    ///
    /// Returns [`ProtocolError::InvalidJson`] if the body is not valid JSON.
    pub fn json(&self) -> ProtocolResult<Value>
    {
        serde_json::from_str(&self.body).map_err(|source| ProtocolError::InvalidJson {
            url: self.url.clone(),
            source,
        })
    }
}

/// Issues a single `GET` request against the remote debuggee.
///
/// Implementations must be cheap to share between tasks; the session holds
/// one behind an `Arc` and calls it from the poll loop and from front-end
/// operations concurrently.
#[async_trait]
pub trait Transport: Send + Sync
{
    /// Fetch `url` and collect the full response.
    ///
    /// ## Errors
    ///
    /// Any failure to obtain a complete, successful response.
    async fn fetch(&self, url: &Url) -> ProtocolResult<Fetched>;
}
