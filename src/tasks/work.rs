//! # Units of work accepted by the orchestrator.
//!
//! A [`Work`] is either already built (a future), not yet started (a
//! zero-argument async function), or a [`ScheduledTask`]. Deferred kinds are
//! invoked when the work is submitted to the loop.
//!
//! ## Example
//! ```rust
//! use taskloop::{ScheduledTask, TaskError, Work};
//! use std::time::Duration;
//!
//! let a = Work::from_future(async { Ok::<_, TaskError>(()) }).named("poller");
//! let b = Work::from_fn(|| async { Ok::<_, TaskError>(()) });
//! let c: Work = ScheduledTask::timer(Duration::from_secs(1), || async { Ok(()) }).into();
//!
//! assert_eq!(a.name(), "poller");
//! assert_eq!(b.name(), "task");
//! assert_eq!(c.name(), "timer");
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{RuntimeError, TaskError};
use crate::tasks::ScheduledTask;

/// Boxed unit of work as driven by the loop.
pub type WorkFuture = BoxFuture<'static, Result<(), TaskError>>;

type DeferredFn = Box<dyn FnOnce() -> WorkFuture + Send>;

enum Kind {
    Future(WorkFuture),
    Deferred(DeferredFn),
    Scheduled(ScheduledTask),
}

/// A unit of work, optionally named for logs and events.
pub struct Work {
    name: Option<Cow<'static, str>>,
    kind: Kind,
}

impl Work {
    /// Wraps an already-built future.
    pub fn from_future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            name: None,
            kind: Kind::Future(Box::pin(fut)),
        }
    }

    /// Wraps a zero-argument async function, invoked at submission.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            name: None,
            kind: Kind::Deferred(Box::new(move || -> WorkFuture { Box::pin(f()) })),
        }
    }

    /// Attaches a name used in logs and events.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name of the work; unnamed scheduled tasks report `timer` or `interval`.
    pub fn name(&self) -> &str {
        match (&self.name, &self.kind) {
            (Some(name), _) => name.as_ref(),
            (None, Kind::Scheduled(s)) if s.is_repeating() => "interval",
            (None, Kind::Scheduled(_)) => "timer",
            (None, _) => "task",
        }
    }

    /// Accepts a dynamically-typed value if it is a [`Work`], a [`ScheduledTask`]
    /// or a [`WorkFuture`].
    ///
    /// # Example
    /// ```rust
    /// use taskloop::{RuntimeError, Work};
    ///
    /// let err = Work::try_from_any(Box::new(42_u32)).err().unwrap();
    /// assert!(matches!(err, RuntimeError::TypeMismatch));
    /// ```
    pub fn try_from_any(value: Box<dyn Any + Send>) -> Result<Self, RuntimeError> {
        let value = match value.downcast::<Work>() {
            Ok(work) => return Ok(*work),
            Err(value) => value,
        };
        let value = match value.downcast::<ScheduledTask>() {
            Ok(task) => return Ok(Work::from(*task)),
            Err(value) => value,
        };
        match value.downcast::<WorkFuture>() {
            Ok(fut) => Ok(Work::from(*fut)),
            Err(_) => Err(RuntimeError::TypeMismatch),
        }
    }

    /// Invokes deferred kinds and returns the name with the running future.
    pub(crate) fn into_parts(self) -> (Arc<str>, WorkFuture) {
        let name: Arc<str> = Arc::from(self.name());
        let fut = match self.kind {
            Kind::Future(fut) => fut,
            Kind::Deferred(f) => f(),
            Kind::Scheduled(task) => Box::pin(task.run()),
        };
        (name, fut)
    }
}

impl From<ScheduledTask> for Work {
    fn from(task: ScheduledTask) -> Self {
        Self {
            name: None,
            kind: Kind::Scheduled(task),
        }
    }
}

impl From<WorkFuture> for Work {
    fn from(fut: WorkFuture) -> Self {
        Self {
            name: None,
            kind: Kind::Future(fut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn test_try_from_any_accepts_supported_kinds() {
        let w = Work::try_from_any(Box::new(Work::from_fn(|| async { Ok(()) }).named("x")));
        assert_eq!(w.unwrap().name(), "x");

        let s = ScheduledTask::interval(Duration::from_secs(1), || async { Ok(()) });
        assert_eq!(Work::try_from_any(Box::new(s)).unwrap().name(), "interval");

        let fut: WorkFuture = Box::pin(async { Ok(()) });
        assert_eq!(Work::try_from_any(Box::new(fut)).unwrap().name(), "task");
    }

    #[test]
    fn test_try_from_any_rejects_other_values() {
        assert!(matches!(
            Work::try_from_any(Box::new("not a task")),
            Err(RuntimeError::TypeMismatch)
        ));
    }

    #[tokio::test]
    async fn test_deferred_fn_invoked_at_submission() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let work = Work::from_fn(move || {
            flag.store(true, Ordering::SeqCst);
            async { Ok(()) }
        });
        assert!(!called.load(Ordering::SeqCst));

        let (name, fut) = work.into_parts();
        assert!(called.load(Ordering::SeqCst));
        assert_eq!(&*name, "task");
        fut.await.unwrap();
    }
}
