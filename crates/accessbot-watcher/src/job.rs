// SPDX-FileCopyrightText: 2026 Accessbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The watcher job.
//!
//! One long-lived loop owns the event stream. It connects, waits for the
//! initial sync, publishes readiness, then reads events in delivery order and
//! spawns one handler task per event without waiting for it. Recoverable
//! stream errors restart the cycle; cancellation ends it cleanly; anything
//! else ends it with the error.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use accessbot_core::error::WatchError;
use accessbot_core::traits::{EventSource, EventStream};
use accessbot_core::types::{Event, WatchFilter};

use crate::backoff::Backoff;
use crate::handler::EventHandler;
use crate::shutdown::cancel_on_signal;

/// Lifecycle of a [`WatcherJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, `run` not called yet.
    Starting,
    /// Opening the subscription.
    Connecting,
    /// Waiting for the initial sync.
    Syncing,
    /// Synced and reading events.
    Ready,
    /// Lost the stream, about to connect again.
    Reconnecting,
    /// `run` has returned.
    Terminated,
}

impl JobState {
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

/// Timing knobs for the watcher job.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Bound on the wait for the initial sync.
    pub init_timeout: Duration,
    /// First delay between failed subscription attempts.
    pub connect_backoff_base: Duration,
    /// Cap on the delay between failed subscription attempts.
    pub connect_backoff_max: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            init_timeout: Duration::from_secs(5),
            connect_backoff_base: Duration::from_millis(500),
            connect_backoff_max: Duration::from_secs(30),
        }
    }
}

/// Observes a job's readiness from elsewhere, e.g. a health endpoint.
#[derive(Debug, Clone)]
pub struct Readiness(watch::Receiver<JobState>);

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.0.borrow().is_ready()
    }

    pub fn state(&self) -> JobState {
        *self.0.borrow()
    }

    /// Resolves once the job reaches `state`, or returns false if the job is dropped first.
    pub async fn wait_for(&mut self, state: JobState) -> bool {
        self.0.wait_for(|s| *s == state).await.is_ok()
    }
}

/// Reads one event stream and fans events out to a handler.
pub struct WatcherJob {
    source: Arc<dyn EventSource>,
    handler: Arc<dyn EventHandler>,
    filter: WatchFilter,
    config: WatcherConfig,
    state: watch::Sender<JobState>,
    tracker: TaskTracker,
}

impl WatcherJob {
    pub fn new(
        source: Arc<dyn EventSource>,
        filter: WatchFilter,
        handler: Arc<dyn EventHandler>,
        config: WatcherConfig,
    ) -> Self {
        let (state, _) = watch::channel(JobState::Starting);
        Self {
            source,
            handler,
            filter,
            config,
            state,
            tracker: TaskTracker::new(),
        }
    }

    pub fn readiness(&self) -> Readiness {
        Readiness(self.state.subscribe())
    }

    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    /// Handler tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Runs until cancelled or until a non-recoverable stream error.
    ///
    /// Cancellation, by `cancel` or by a shutdown signal, returns `Ok(())`.
    /// Handler tasks keep running after return; see [`WatcherJob::drain`].
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), WatchError> {
        info!(filter = ?self.filter, "watcher job starting");
        let cancel = cancel_on_signal(&cancel);

        let result = loop {
            match self.run_once(&cancel).await {
                Err(e) if e.is_cancellation() => break Ok(()),
                Err(e) if e.is_recoverable() => {
                    error!(error = %e, "event stream failed, reconnecting");
                    self.set_state(JobState::Reconnecting);
                }
                Err(e) => {
                    error!(error = %e, "event stream failed permanently");
                    break Err(e);
                }
                Ok(()) => break Ok(()),
            }
        };

        self.set_state(JobState::Terminated);
        match &result {
            Ok(()) => info!("watcher job cancelled"),
            Err(_) => warn!("watcher job terminated with error"),
        }
        result
    }

    /// Waits up to `timeout` for in-flight handlers. Returns true if all finished.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        if self.tracker.is_empty() {
            return true;
        }
        info!(count = self.tracker.len(), "waiting for in-flight event handlers");
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => {
                info!("all event handlers finished");
                true
            }
            Err(_) => {
                warn!(
                    remaining = self.tracker.len(),
                    timeout_secs = timeout.as_secs(),
                    "event handler drain timed out"
                );
                false
            }
        }
    }

    fn set_state(&self, state: JobState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = ?previous, to = ?state, "watcher state changed");
        }
    }

    /// One connect, sync and read cycle. Always ends in an error;
    /// cancellation is [`WatchError::Cancelled`].
    async fn run_once(&self, cancel: &CancellationToken) -> Result<(), WatchError> {
        self.set_state(JobState::Connecting);
        let mut stream = self.connect(cancel).await?;

        self.set_state(JobState::Syncing);
        if let Err(e) = self.sync(stream.as_mut(), cancel).await {
            stream.close().await;
            return Err(e);
        }

        self.set_state(JobState::Ready);
        info!("event stream synced, watcher ready");

        let err = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = stream.next_event() => Some(next),
            };
            match next {
                None => break WatchError::Cancelled,
                Some(Ok(event)) => self.dispatch(event, cancel),
                Some(Err(e)) => break e,
            }
        };
        stream.close().await;
        Err(err)
    }

    /// Opens a subscription, retrying connection problems with backoff.
    async fn connect(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn EventStream>, WatchError> {
        let mut backoff = Backoff::new(
            self.config.connect_backoff_base,
            self.config.connect_backoff_max,
        );
        loop {
            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WatchError::Cancelled),
                attempt = self.source.watch(&self.filter) => attempt,
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(WatchError::ConnectionProblem(reason)) => {
                    let delay = backoff.next_delay();
                    warn!(
                        error = %reason,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "event API unavailable, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(WatchError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn sync(
        &self,
        stream: &mut dyn EventStream,
        cancel: &CancellationToken,
    ) -> Result<(), WatchError> {
        let timeout = self.config.init_timeout;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WatchError::Cancelled),
            synced = tokio::time::timeout(timeout, stream.wait_init()) => {
                synced.unwrap_or(Err(WatchError::InitTimeout(timeout)))
            }
        }
    }

    fn dispatch(&self, event: Event, cancel: &CancellationToken) {
        let handler = Arc::clone(&self.handler);
        let cancel = cancel.clone();
        let request_id = event.request_id().to_string();
        debug!(request_id = %request_id, "dispatching event");

        self.tracker.spawn(async move {
            match AssertUnwindSafe(handler.handle(cancel, event))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(request_id = %request_id, error = %e, "event handler failed"),
                Err(_) => error!(request_id = %request_id, "event handler panicked"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use accessbot_core::error::AccessBotError;
    use accessbot_test_utils::ScriptedEventSource;
    use tracing_test::traced_test;

    use super::*;

    fn noop_job(source: &ScriptedEventSource) -> WatcherJob {
        let handler = |_cancel: CancellationToken, _event: Event| async {
            Ok::<(), AccessBotError>(())
        };
        WatcherJob::new(
            Arc::new(source.clone()),
            WatchFilter::pending(),
            Arc::new(handler),
            WatcherConfig::default(),
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn connection_problem_logs_and_reconnects() {
        let source = ScriptedEventSource::new();
        let first = source.push_stream();
        let job = noop_job(&source);
        let cancel = CancellationToken::new();
        let mut readiness = job.readiness();

        let (result, ()) = tokio::join!(job.run(cancel.clone()), async {
            assert!(readiness.wait_for(JobState::Ready).await);
            first.fail(WatchError::ConnectionProblem("connection reset".into()));
            source.wait_for_connects(2).await;
            assert!(readiness.wait_for(JobState::Ready).await);
            cancel.cancel();
        });

        assert!(result.is_ok());
        assert_eq!(job.state(), JobState::Terminated);
        assert_eq!(source.connect_count(), 2);
        assert!(logs_contain("event stream failed, reconnecting"));
        assert!(logs_contain("connection reset"));
        assert!(logs_contain("watcher job cancelled"));
    }

    #[tokio::test]
    #[traced_test]
    async fn unexpected_end_of_stream_reconnects() {
        let source = ScriptedEventSource::new();
        let first = source.push_stream();
        let job = noop_job(&source);
        let cancel = CancellationToken::new();

        let (result, ()) = tokio::join!(job.run(cancel.clone()), async {
            source.wait_for_connects(1).await;
            drop(first);
            source.wait_for_connects(2).await;
            cancel.cancel();
        });

        assert!(result.is_ok());
        assert!(logs_contain("event stream closed unexpectedly"));
    }

    #[tokio::test]
    #[traced_test]
    async fn cancellation_is_not_logged_as_error() {
        let source = ScriptedEventSource::new();
        let job = noop_job(&source);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(job.run(cancel).await.is_ok());
        assert!(!logs_contain("reconnecting"));
        assert!(!logs_contain("failed permanently"));
    }
}
