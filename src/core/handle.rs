//! # Handle for adding tasks to a running orchestrator.
//!
//! [`OrchestratorHandle`] is cloneable and `Send`; running tasks (or any
//! thread) use it to add work while the loop runs. Work sent before `run` is
//! queued and submitted together with the pending list.
//!
//! ## Rules
//! - Work added while the wait cycle runs is folded into the next wait round.
//! - Once the wait cycle has ended, every call fails with [`RuntimeError::Closed`].

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{RuntimeError, TaskError};
use crate::tasks::{ScheduledTask, Work};

/// Cloneable submission handle to a [`TaskOrchestrator`](crate::TaskOrchestrator).
#[derive(Clone, Debug)]
pub struct OrchestratorHandle {
    tx: mpsc::UnboundedSender<Work>,
}

impl OrchestratorHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Work>) -> Self {
        Self { tx }
    }

    /// Submits a unit of work: a [`Work`] or a [`ScheduledTask`].
    ///
    /// Bare futures and async functions go through [`add_future`](Self::add_future)
    /// and [`add_fn`](Self::add_fn).
    pub fn add_task(&self, work: impl Into<Work>) -> Result<(), RuntimeError> {
        self.tx.send(work.into()).map_err(|_| RuntimeError::Closed)
    }

    /// Submits a future.
    pub fn add_future<Fut>(&self, fut: Fut) -> Result<(), RuntimeError>
    where
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.add_task(Work::from_future(fut))
    }

    /// Submits an async function, called once when the task starts.
    pub fn add_fn<F, Fut>(&self, f: F) -> Result<(), RuntimeError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.add_task(Work::from_fn(f))
    }

    /// Submits a dynamically-typed unit of work.
    ///
    /// Fails with [`RuntimeError::TypeMismatch`] if `value` is not a [`Work`],
    /// a [`ScheduledTask`] or a [`WorkFuture`](crate::WorkFuture).
    pub fn add_task_any(&self, value: Box<dyn Any + Send>) -> Result<(), RuntimeError> {
        self.add_task(Work::try_from_any(value)?)
    }

    /// Builds a one-shot [`ScheduledTask`], submits it and returns it for cancellation.
    pub fn timer<F, Fut>(
        &self,
        delay: impl Into<Duration>,
        f: F,
    ) -> Result<ScheduledTask, RuntimeError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let task = ScheduledTask::timer(delay, f);
        self.add_task(task.clone())?;
        Ok(task)
    }

    /// Builds a repeating [`ScheduledTask`], submits it and returns it for cancellation.
    pub fn interval<F, Fut>(
        &self,
        delay: impl Into<Duration>,
        f: F,
    ) -> Result<ScheduledTask, RuntimeError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let task = ScheduledTask::interval(delay, f);
        self.add_task(task.clone())?;
        Ok(task)
    }

    /// True once the orchestrator stopped accepting work.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_futures_and_fns_are_queued() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = OrchestratorHandle::new(tx);

        handle.add_future(async { Ok(()) }).unwrap();
        handle.add_fn(|| async { Ok(()) }).unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());

        drop(rx);
        assert!(handle.is_closed());
        assert!(matches!(
            handle.add_fn(|| async { Ok(()) }),
            Err(RuntimeError::Closed)
        ));
    }
}
