//! # Session
//!
//! The operations a debugging front end needs, on top of the
//! [`ExecutionController`], the [`VariableCache`] and the path normalizer.
//!
//! No operation returns an error. A transport failure ends the session (see
//! [`SessionEvent::End`](crate::events::SessionEvent::End)) and the operation
//! completes with its empty result; malformed entries are dropped; stale
//! references and out-of-range windows give empty results. Once the session
//! has ended, operations return their empty result without contacting the
//! remote debuggee.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tapline_protocol::wire::{decode_breakpoints, decode_list, WireFrame};
use tapline_protocol::{Endpoint, Fetched, HttpTransport, ProtocolResult, Transport};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SessionConfig;
use crate::controller::ExecutionController;
use crate::error::Result;
use crate::events::{event_channel, SessionEventReceiver};
use crate::path::normalize;
use crate::types::{window, BreakpointSet, Scope, StackFrame, Variable, VariableReference};
use crate::variables::VariableCache;

/// Source text returned when the remote has no text for a file.
pub const BLANK_SOURCE: &str = "\n";

/// A debugging session against one remote debuggee.
pub struct Session
{
    controller: ExecutionController,
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    variables: Mutex<VariableCache>,
}

impl Session
{
    /// Create a session using `transport` for every request.
    ///
    /// Returns the session and the receiver for its events.
    #[must_use]
    pub fn new(config: &SessionConfig, transport: Arc<dyn Transport>) -> (Self, SessionEventReceiver)
    {
        let (events, receiver) = event_channel();
        let controller = ExecutionController::new(
            Arc::clone(&transport),
            config.endpoint.clone(),
            config.poll_interval,
            events,
        );
        let session = Self {
            controller,
            transport,
            endpoint: config.endpoint.clone(),
            variables: Mutex::new(VariableCache::new()),
        };
        (session, receiver)
    }

    /// Create a session talking HTTP to `config.endpoint`.
    ///
    /// ## Errors
    ///
    /// Returns `Protocol` if the HTTP client cannot be built.
    pub fn connect(config: &SessionConfig) -> Result<(Self, SessionEventReceiver)>
    {
        let transport = HttpTransport::new(config.request_timeout)?;
        info!(endpoint = %config.endpoint.base(), "connecting to remote debuggee");
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// The execution controller driving this session.
    #[must_use]
    pub fn controller(&self) -> &ExecutionController
    {
        &self.controller
    }

    /// Start watching the debuggee: issue the first poll.
    pub fn start(&self)
    {
        info!("starting poll loop");
        self.controller.poll_execution();
    }

    /// Resume execution.
    pub async fn continue_execution(&self)
    {
        self.controller.continue_execution().await;
    }

    /// Execute one step.
    pub async fn step(&self)
    {
        self.controller.step().await;
    }

    /// Pause execution.
    pub async fn pause(&self)
    {
        self.controller.pause().await;
    }

    /// End the session and forget every variable reference.
    pub fn stop(&self)
    {
        self.controller.stop();
        self.cache().clear();
    }

    /// Whether the session has ended.
    #[must_use]
    pub fn is_terminated(&self) -> bool
    {
        self.controller.is_terminated()
    }

    /// Frames `start..start + count` of the remote stack (`count == 0` = all
    /// remaining). The stack is fetched anew on every call.
    pub async fn stack_trace(&self, start: usize, count: usize) -> Vec<StackFrame>
    {
        let Some(payload) = self.fetch_json(self.endpoint.stack_trace()).await else {
            return Vec::new();
        };
        let frames: Vec<StackFrame> = decode_list::<WireFrame>(&payload)
            .into_iter()
            .enumerate()
            .map(|(index, frame)| StackFrame::from_wire(index, frame))
            .collect();
        debug!(frames = frames.len(), start, count, "stack trace");
        window(&frames, start, count)
    }

    /// Replace every breakpoint of the file at `path` with `lines`.
    ///
    /// The returned set is exactly what the remote confirmed, under the
    /// identifier the remote uses for the file.
    pub async fn set_breakpoints(&self, path: &str, lines: &[u32]) -> BreakpointSet
    {
        let identifier = normalize(path);
        let Some(payload) = self
            .fetch_json(self.endpoint.set_breakpoints(&identifier, lines))
            .await
        else {
            return BreakpointSet {
                source_uri: identifier,
                verified_lines: Vec::new(),
            };
        };

        let decoded = decode_breakpoints(&payload);
        let set = BreakpointSet {
            source_uri: decoded.source_uri.unwrap_or(identifier),
            verified_lines: decoded.lines,
        };
        debug!(
            source = %set.source_uri,
            requested = lines.len(),
            verified = set.verified_lines.len(),
            "breakpoints set"
        );
        set
    }

    /// Scopes of the current stack top.
    #[must_use]
    pub fn scopes(&self) -> Vec<Scope>
    {
        vec![Scope::stack()]
    }

    /// Variables behind `reference`: the stack scope lists the root of the
    /// tree, any other reference lists that node's children.
    pub async fn variables(&self, reference: VariableReference, start: usize, count: usize) -> Vec<Variable>
    {
        if reference == VariableReference::STACK_SCOPE {
            self.list_root(start, count).await
        } else {
            window(&self.list_children(reference).await, start, count)
        }
    }

    /// Fetch the value tree of the stack top, replace the cached tree and
    /// return a page of its top-level entries.
    pub async fn list_root(&self, start: usize, count: usize) -> Vec<Variable>
    {
        let Some(payload) = self.fetch_json(self.endpoint.stack_values()).await else {
            return Vec::new();
        };
        let mut cache = self.cache();
        cache.replace_root(&payload);
        cache.root_page(start, count)
    }

    /// Children of the node behind `reference`, re-resolved by path.
    ///
    /// Unknown references and nodes that no longer have children yield an
    /// empty list.
    pub async fn list_children(&self, reference: VariableReference) -> Vec<Variable>
    {
        let Some(path) = self.cache().expandable_path(reference) else {
            debug!(%reference, "reference does not resolve to an expandable node");
            return Vec::new();
        };
        let Some(payload) = self.fetch_json(self.endpoint.values(&path)).await else {
            return Vec::new();
        };
        self.cache().replace_children(&path, &payload)
    }

    /// Resolve the node at dotted `path`.
    pub async fn evaluate(&self, path: &str) -> Option<Variable>
    {
        let payload = self.fetch_json(self.endpoint.values(path)).await?;
        let resolved = self.cache().resolve(path, &payload);
        if resolved.is_none() {
            debug!(path, "remote returned no usable node");
        }
        resolved
    }

    /// Text of the source at `uri`, or [`BLANK_SOURCE`] if the remote has no
    /// text for it.
    pub async fn source(&self, uri: &str) -> String
    {
        let identifier = normalize(uri);
        match self.fetch(self.endpoint.source_content(&identifier)).await {
            Some(fetched) if fetched.is_text() => fetched.body,
            Some(fetched) => {
                warn!(
                    source = %identifier,
                    content_type = fetched.content_type.as_deref().unwrap_or("none"),
                    "source content is not text"
                );
                BLANK_SOURCE.to_string()
            }
            None => BLANK_SOURCE.to_string(),
        }
    }

    fn cache(&self) -> MutexGuard<'_, VariableCache>
    {
        self.variables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch `url`; a failure ends the session. Returns `None` if the session
    /// has ended, before or while the request was in flight.
    async fn fetch(&self, url: ProtocolResult<Url>) -> Option<Fetched>
    {
        if self.controller.is_terminated() {
            debug!("session ended, request skipped");
            return None;
        }
        let outcome = match url {
            Ok(url) => self.transport.fetch(&url).await,
            Err(error) => Err(error),
        };
        if self.controller.is_terminated() {
            debug!("session ended, response ignored");
            return None;
        }
        match outcome {
            Ok(fetched) => Some(fetched),
            Err(error) => {
                self.controller.fail(&error.into());
                None
            }
        }
    }

    async fn fetch_json(&self, url: ProtocolResult<Url>) -> Option<Value>
    {
        let fetched = self.fetch(url).await?;
        match fetched.json() {
            Ok(payload) => Some(payload),
            Err(error) => {
                self.controller.fail(&error.into());
                None
            }
        }
    }
}
