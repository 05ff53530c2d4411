//! # Execution Controller
//!
//! Turns front-end commands into `execution/*` requests and keeps a
//! best-effort view of the remote execution state by polling.
//!
//! ## Poll loop
//!
//! The remote debuggee can pause on its own (a breakpoint hit, an external
//! pause), and the only way to notice is to sample it. Each poll response is
//! handled as follows:
//!
//! | State | Effect |
//! |---|---|
//! | breakpoint / step / paused | emit [`SessionEvent::Stopped`], stop polling |
//! | terminated | end the session |
//! | anything else | poll again after the poll interval |
//!
//! `continue` and `step` cancel the pending timer and restart the loop at
//! once; `pause` only cancels the timer. Command responses go through the same
//! handler as poll responses.
//!
//! ## Ordering
//!
//! Requests in flight are never cancelled, so a poll issued before a command
//! can answer after it. Every request carries a sequence number taken when it
//! is issued, and a response older than the last applied one is dropped.
//! Failures are never dropped: any failed request ends the session, once.
//!
//! ## Timer
//!
//! At most one poll timer exists. It is cancelled before a new one is armed,
//! before every command, on every pause and when the session ends. Cancelling
//! only affects a timer that has not fired yet; a fired timer has already
//! handed its request to an independent task. Timers hold a weak handle, so
//! dropping the controller ends the loop.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tapline_protocol::wire::decode_execution;
use tapline_protocol::{Endpoint, ExecutionAction, ExecutionState, Transport};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, TaplineError};
use crate::events::{OutputCategory, SessionEvent, SessionEventSender, StopReason};

/// Drives execution of the remote debuggee.
///
/// Cloning is cheap; clones share the same state and poll loop.
#[derive(Clone)]
pub struct ExecutionController
{
    shared: Arc<Shared>,
}

struct Shared
{
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    poll_interval: Duration,
    events: SessionEventSender,
    control: Mutex<ControlState>,
}

#[derive(Debug, Default)]
struct ControlState
{
    /// Pending poll timer, if armed.
    poll_timer: Option<JoinHandle<()>>,
    /// Sequence number of the most recently issued request.
    issued: u64,
    /// Sequence number of the most recently applied response.
    applied: u64,
    /// State carried by the most recently applied response.
    last_state: Option<ExecutionState>,
    /// Stop already reported since the last command or running state.
    reported_stop: Option<StopReason>,
    terminated: bool,
}

impl ControlState
{
    fn cancel_timer(&mut self)
    {
        if let Some(timer) = self.poll_timer.take() {
            timer.abort();
        }
    }

    fn next_sequence(&mut self) -> u64
    {
        self.issued += 1;
        self.issued
    }
}

impl ExecutionController
{
    /// Create a controller. Nothing is requested until a command is issued or
    /// [`poll_execution`](Self::poll_execution) is called.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: Endpoint,
        poll_interval: Duration,
        events: SessionEventSender,
    ) -> Self
    {
        Self {
            shared: Arc::new(Shared {
                transport,
                endpoint,
                poll_interval,
                events,
                control: Mutex::new(ControlState::default()),
            }),
        }
    }

    /// Resume execution and restart the poll loop.
    ///
    /// Completes once the command's own response has been handled. The poll
    /// loop runs on independently.
    pub async fn continue_execution(&self)
    {
        self.command(ExecutionAction::Continue).await;
    }

    /// Execute one step and restart the poll loop.
    pub async fn step(&self)
    {
        self.command(ExecutionAction::Step).await;
    }

    /// Ask the debuggee to pause. The poll loop is stopped, not restarted:
    /// the response itself carries the resulting state.
    pub async fn pause(&self)
    {
        self.command(ExecutionAction::Pause).await;
    }

    /// End the session: cancel the poll timer and emit [`SessionEvent::End`].
    ///
    /// Idempotent; responses arriving afterwards are ignored.
    pub fn stop(&self)
    {
        let mut control = self.shared.lock();
        self.shared.end(&mut control, None);
    }

    /// Issue one poll request. Further polls follow as long as the debuggee
    /// reports it is running.
    pub fn poll_execution(&self)
    {
        self.shared.poll();
    }

    /// State carried by the last applied response.
    #[must_use]
    pub fn current_state(&self) -> Option<ExecutionState>
    {
        self.shared.lock().last_state
    }

    /// Whether the session has ended.
    #[must_use]
    pub fn is_terminated(&self) -> bool
    {
        self.shared.lock().terminated
    }

    /// End the session because of `error`.
    pub(crate) fn fail(&self, error: &TaplineError)
    {
        self.shared.fail(error);
    }

    async fn command(&self, action: ExecutionAction)
    {
        let sequence = {
            let mut control = self.shared.lock();
            if control.terminated {
                debug!(%action, "session ended, command ignored");
                return;
            }
            control.cancel_timer();
            control.reported_stop = None;
            control.next_sequence()
        };

        info!(%action, sequence, "execution command");
        let request = tokio::spawn(Arc::clone(&self.shared).request(sequence, action));
        if action != ExecutionAction::Pause {
            self.shared.poll();
        }

        if let Err(err) = request.await {
            warn!(%action, %err, "execution request task did not complete");
        }
    }
}

impl Shared
{
    fn lock(&self) -> MutexGuard<'_, ControlState>
    {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poll(self: &Arc<Self>)
    {
        let sequence = {
            let mut control = self.lock();
            if control.terminated {
                return;
            }
            control.next_sequence()
        };
        tokio::spawn(Arc::clone(self).request(sequence, ExecutionAction::Poll));
    }

    async fn request(self: Arc<Self>, sequence: u64, action: ExecutionAction)
    {
        debug!(%action, sequence, "execution request");
        match self.fetch_state(action).await {
            Ok(state) => self.apply(sequence, action, state),
            Err(error) => {
                warn!(%action, sequence, %error, "execution request failed");
                self.fail(&error);
            }
        }
    }

    async fn fetch_state(&self, action: ExecutionAction) -> Result<ExecutionState>
    {
        let url = self.endpoint.execution(action)?;
        let fetched = self.transport.fetch(&url).await?;
        Ok(decode_execution(&fetched.json()?))
    }

    fn apply(self: &Arc<Self>, sequence: u64, action: ExecutionAction, state: ExecutionState)
    {
        let mut control = self.lock();
        if control.terminated {
            debug!(%action, sequence, "session ended, response ignored");
            return;
        }
        if sequence <= control.applied {
            debug!(%action, sequence, applied = control.applied, %state, "stale response dropped");
            return;
        }
        control.applied = sequence;
        control.last_state = Some(state);
        debug!(%action, sequence, %state, "execution state");

        match StopReason::from_state(state) {
            Some(reason) => {
                control.cancel_timer();
                if control.reported_stop == Some(reason) {
                    debug!(?reason, "stop already reported");
                } else {
                    control.reported_stop = Some(reason);
                    info!(?reason, "execution stopped");
                    self.emit(SessionEvent::Stopped(reason));
                }
            }
            None if state == ExecutionState::Terminated => {
                info!("remote debuggee terminated");
                self.emit(SessionEvent::Output {
                    category: OutputCategory::Console,
                    text: "Remote debuggee terminated".to_string(),
                });
                self.end(&mut control, None);
            }
            None => {
                control.reported_stop = None;
                self.schedule_poll(&mut control);
            }
        }
    }

    fn schedule_poll(self: &Arc<Self>, control: &mut ControlState)
    {
        control.cancel_timer();
        let shared = Arc::downgrade(self);
        let interval = self.poll_interval;
        control.poll_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if let Some(shared) = shared.upgrade() {
                shared.poll();
            }
        }));
    }

    fn fail(&self, error: &TaplineError)
    {
        let mut control = self.lock();
        self.end(&mut control, Some(error));
    }

    fn end(&self, control: &mut ControlState, cause: Option<&TaplineError>)
    {
        if control.terminated {
            if let Some(error) = cause {
                debug!(%error, "failure after session end ignored");
            }
            return;
        }
        control.terminated = true;
        control.cancel_timer();

        if let Some(error) = cause {
            warn!(%error, "ending session");
            self.emit(SessionEvent::Output {
                category: OutputCategory::Stderr,
                text: error.to_string(),
            });
        } else {
            info!("ending session");
        }
        self.emit(SessionEvent::End);
    }

    fn emit(&self, event: SessionEvent)
    {
        if self.events.send(event).is_err() {
            debug!("no event receiver left");
        }
    }
}
