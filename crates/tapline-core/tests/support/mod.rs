//! Scripted in-memory transport for session tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tapline_core::events::{SessionEvent, SessionEventReceiver};
use tapline_core::{Session, SessionConfig};
use tapline_protocol::{Fetched, ProtocolError, ProtocolResult, Transport};
use url::Url;

pub const ENDPOINT: &str = "http://debuggee.test/";
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

enum Reply
{
    Body
    {
        content_type: Option<&'static str>,
        body: String,
    },
    Failure,
}

struct Scripted
{
    delay: Duration,
    reply: Reply,
}

/// Transport answering each route from a queue of scripted replies.
///
/// A route with nothing left in its queue answers with HTTP 404.
#[derive(Default)]
pub struct ScriptedTransport
{
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport
{
    pub fn new() -> Arc<Self>
    {
        Arc::new(Self::default())
    }

    fn push(&self, route: &str, delay: Duration, reply: Reply)
    {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(Scripted { delay, reply });
    }

    /// Queue a JSON reply for `route`.
    pub fn json(&self, route: &str, body: Value)
    {
        self.json_after(route, Duration::ZERO, body);
    }

    /// Queue a JSON reply for `route`, delivered after `delay`.
    pub fn json_after(&self, route: &str, delay: Duration, body: Value)
    {
        self.push(
            route,
            delay,
            Reply::Body {
                content_type: Some("application/json"),
                body: body.to_string(),
            },
        );
    }

    /// Queue a raw reply for `route`.
    pub fn raw(&self, route: &str, content_type: Option<&'static str>, body: &str)
    {
        self.push(
            route,
            Duration::ZERO,
            Reply::Body {
                content_type,
                body: body.to_string(),
            },
        );
    }

    /// Queue a transport failure for `route`, delivered after `delay`.
    pub fn fail_after(&self, route: &str, delay: Duration)
    {
        self.push(route, delay, Reply::Failure);
    }

    /// Queue `{ "execution": state }` replies for `execution/poll`.
    pub fn polls(&self, states: &[&str])
    {
        for state in states {
            self.json("execution/poll", serde_json::json!({ "execution": state }));
        }
    }

    /// Every request issued so far, in order.
    pub fn requests(&self) -> Vec<Url>
    {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests issued to `route`.
    pub fn count(&self, route: &str) -> usize
    {
        self.requests()
            .iter()
            .filter(|url| url.path().trim_start_matches('/') == route)
            .count()
    }

    /// Most recent request issued to `route`.
    pub fn last(&self, route: &str) -> Option<Url>
    {
        self.requests()
            .into_iter()
            .rev()
            .find(|url| url.path().trim_start_matches('/') == route)
    }
}

#[async_trait]
impl Transport for ScriptedTransport
{
    async fn fetch(&self, url: &Url) -> ProtocolResult<Fetched>
    {
        self.requests.lock().unwrap().push(url.clone());
        let route = url.path().trim_start_matches('/').to_string();
        let scripted = self.routes.lock().unwrap().get_mut(&route).and_then(VecDeque::pop_front);

        let Some(Scripted { delay, reply }) = scripted else {
            return Err(ProtocolError::Status {
                url: url.clone(),
                status: 404,
            });
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Body { content_type, body } => Ok(Fetched::new(url.clone(), content_type.map(str::to_string), body)),
            Reply::Failure => Err(ProtocolError::Status {
                url: url.clone(),
                status: 503,
            }),
        }
    }
}

/// Session wired to `transport` with the test poll interval.
pub fn session(transport: &Arc<ScriptedTransport>) -> (Session, SessionEventReceiver)
{
    let config = SessionConfig::new(ENDPOINT)
        .unwrap()
        .with_poll_interval(POLL_INTERVAL)
        .unwrap();
    Session::new(&config, Arc::clone(transport) as Arc<dyn Transport>)
}

/// Wait for the next event, failing the test if none arrives.
pub async fn next_event(events: &mut SessionEventReceiver) -> SessionEvent
{
    tokio::time::timeout(Duration::from_secs(30), events.recv())
        .await
        .expect("timed out waiting for a session event")
        .expect("event channel closed")
}

/// Let every pending timer and request run to completion.
pub async fn settle()
{
    tokio::time::sleep(POLL_INTERVAL * 20).await;
}

/// Drain the events that are already queued.
pub fn drain(events: &mut SessionEventReceiver) -> Vec<SessionEvent>
{
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
