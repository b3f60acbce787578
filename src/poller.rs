//! Periodic re-fetch with an explicit lifetime.
//!
//! A screen that shows live data starts a poller when it becomes visible
//! and stops it (or drops the handle) when it goes away, so no timer
//! outlives the view that needed it.
//!
//! ```rust,ignore
//! let sensors = api.watch_sensors();
//! let mut updates = sensors.subscribe();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow().clone();
//!     render(snapshot.value);
//! }
//! sensors.stop().await;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ClientError;

/// The latest outcome of a poller.
#[derive(Debug, Clone)]
pub struct PollSnapshot<T> {
    /// Last successfully fetched value. Survives later failures.
    pub value: Option<T>,
    /// Error from the most recent attempt, cleared by the next success.
    pub error: Option<ClientError>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Number of completed attempts, successful or not.
    pub attempts: u64,
}

impl<T> Default for PollSnapshot<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            fetched_at: None,
            attempts: 0,
        }
    }
}

/// Owner of a running poller. Dropping it cancels the task.
pub struct PollHandle<T> {
    name: &'static str,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
    snapshots: watch::Receiver<PollSnapshot<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T: Clone> PollHandle<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the most recent snapshot.
    pub fn snapshot(&self) -> PollSnapshot<T> {
        self.snapshots.borrow().clone()
    }

    /// Returns the last good value.
    pub fn latest(&self) -> Option<T> {
        self.snapshots.borrow().value.clone()
    }

    /// Receiver that wakes on every completed attempt.
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot<T>> {
        self.snapshots.clone()
    }

    /// Fetches now without waiting for the next tick. The regular
    /// schedule is unaffected.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancels the poller and waits for an in-flight fetch to be abandoned.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Shortest period a poller runs at; smaller periods are raised to it.
pub const MIN_POLL_PERIOD: Duration = Duration::from_millis(100);

/// Spawns a poller that calls `fetch` immediately and then every `period`.
///
/// Must be called from within a tokio runtime.
pub fn poll<T, F, Fut>(name: &'static str, period: Duration, mut fetch: F) -> PollHandle<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send,
{
    let period = if period < MIN_POLL_PERIOD {
        log::warn!(
            target: "smartfarm::poller",
            "msg=\"poll period too short, using minimum\" name={name} requested_ms={} min_ms={}",
            period.as_millis(),
            MIN_POLL_PERIOD.as_millis()
        );
        MIN_POLL_PERIOD
    } else {
        period
    };

    let cancel = CancellationToken::new();
    let refresh = Arc::new(Notify::new());
    let (tx, rx) = watch::channel(PollSnapshot::default());

    let task = tokio::spawn({
        let cancel = cancel.clone();
        let refresh = refresh.clone();
        async move {
            log::debug!(
                target: "smartfarm::poller",
                "msg=\"poller started\" name={name} period_ms={}",
                period.as_millis()
            );

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                    _ = refresh.notified() => {}
                }

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    outcome = fetch() => outcome,
                };

                tx.send_modify(|snapshot| {
                    snapshot.attempts += 1;
                    snapshot.fetched_at = Some(Utc::now());
                    match outcome {
                        Ok(value) => {
                            snapshot.value = Some(value);
                            snapshot.error = None;
                        }
                        Err(error) => {
                            log::warn!(
                                target: "smartfarm::poller",
                                "msg=\"poll failed\" name={name} error=\"{error}\""
                            );
                            snapshot.error = Some(error);
                        }
                    }
                });
            }

            log::debug!(target: "smartfarm::poller", "msg=\"poller stopped\" name={name}");
        }
    });

    PollHandle {
        name,
        cancel,
        refresh,
        snapshots: rx,
        task: Some(task),
    }
}
