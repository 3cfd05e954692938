//! # Delayed and repeating tasks.
//!
//! A [`ScheduledTask`] sleeps for its interval, then invokes its handler, once
//! ([`ScheduledTask::timer`]) or forever ([`ScheduledTask::interval`]) until
//! cancelled.
//!
//! ## Execution loop
//! ```text
//! loop {
//!   ├─► cancelled? ─► stop
//!   ├─► sleep(interval)          (cancel during sleep ─► stop)
//!   ├─► cancelled? ─► stop
//!   ├─► handler().await          (Err ─► task fails with it)
//!   └─► repeat? continue : stop
//! }
//! ```
//!
//! ## Rules
//! - `cancel()` is idempotent and never reverts.
//! - Cancellation is only observed at the decision points above; a handler
//!   invocation that already started runs to completion.
//! - Clones share the cancellation state: cancelling any clone cancels all of them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TaskError;
use crate::tasks::work::WorkFuture;

type HandlerFactory = Arc<dyn Fn() -> WorkFuture + Send + Sync>;

/// Cancellable delay-then-run wrapper around a unit of work.
///
/// Construction does not register the task anywhere; pass it to
/// [`TaskOrchestrator::add_task`](crate::TaskOrchestrator::add_task) or use the
/// one-step [`TaskOrchestrator::timer`](crate::TaskOrchestrator::timer) /
/// [`TaskOrchestrator::interval`](crate::TaskOrchestrator::interval).
///
/// # Example
/// ```rust
/// use taskloop::{Delay, ScheduledTask, TaskError};
///
/// let heartbeat = ScheduledTask::interval(Delay::new().seconds(30.0), || async {
///     Ok::<_, TaskError>(())
/// });
/// assert!(heartbeat.is_repeating());
///
/// heartbeat.cancel();
/// heartbeat.cancel();
/// assert!(heartbeat.is_cancelled());
/// ```
#[derive(Clone)]
pub struct ScheduledTask {
    handler: HandlerFactory,
    period: Duration,
    repeat: bool,
    token: CancellationToken,
}

impl ScheduledTask {
    /// Creates a non-cancelled task firing after `period`, optionally repeating.
    pub fn new<F, Fut>(handler: F, period: Duration, repeat: bool) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move || -> WorkFuture { Box::pin(handler()) }),
            period,
            repeat,
            token: CancellationToken::new(),
        }
    }

    /// One-shot task: fires once after `delay`.
    pub fn timer<F, Fut>(delay: impl Into<Duration>, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::new(handler, delay.into(), false)
    }

    /// Repeating task: fires every `delay` until cancelled.
    pub fn interval<F, Fut>(delay: impl Into<Duration>, handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::new(handler, delay.into(), true)
    }

    /// Prevents any future handler run. Calling it again has no further effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Delay before each run.
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// Runs the sleep/invoke loop until cancellation, exhaustion of a one-shot
    /// run, or a handler error.
    pub async fn run(self) -> Result<(), TaskError> {
        loop {
            if self.token.is_cancelled() {
                break;
            }
            select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = time::sleep(self.period) => {}
            }
            if self.token.is_cancelled() {
                break;
            }

            (self.handler)().await?;

            if !self.repeat {
                return Ok(());
            }
        }
        debug!(period = ?self.period, repeat = self.repeat, "scheduled task cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: Arc<AtomicUsize>) -> impl Fn() -> WorkFuture + Send + Sync + 'static {
        move || -> WorkFuture {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_timer_fires_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::timer(Duration::ZERO, counting(hits.clone()));
        task.run().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_sleep_elapses_prevents_run() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::timer(Duration::from_secs(60), counting(hits.clone()));
        let handle = task.clone();

        let join = tokio::spawn(task.run());
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        join.await.unwrap().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_before_start_prevents_run() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::interval(Duration::ZERO, counting(hits.clone()));
        task.cancel();
        task.run().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_does_not_abort_running_handler() {
        let finished = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(tokio::sync::Notify::new());

        let task = {
            let finished = finished.clone();
            let started = started.clone();
            ScheduledTask::timer(Duration::ZERO, move || {
                let finished = finished.clone();
                let started = started.clone();
                async move {
                    started.notify_one();
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        let handle = task.clone();
        let join = tokio::spawn(task.run());

        started.notified().await;
        handle.cancel();
        join.await.unwrap().unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interval_stops_after_cancel() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = ScheduledTask::interval(Duration::from_millis(10), counting(hits.clone()));
        let handle = task.clone();
        let join = tokio::spawn(task.run());

        while hits.load(Ordering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        handle.cancel();
        join.await.unwrap().unwrap();

        let seen = hits.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn test_handler_error_ends_loop() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = {
            let hits = hits.clone();
            ScheduledTask::interval(Duration::ZERO, move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Err(TaskError::fail("boom"))
                }
            })
        };
        let err = task.run().await.unwrap_err();
        assert!(matches!(err, TaskError::Fail { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_is_idempotent_and_shared() {
        let task = ScheduledTask::timer(Duration::ZERO, || async { Ok(()) });
        let clone = task.clone();
        assert!(!clone.is_cancelled());
        task.cancel();
        task.cancel();
        assert!(clone.is_cancelled());
        assert!(!task.is_repeating());
        assert_eq!(task.period(), Duration::ZERO);
    }
}
