//! # Task set driver: submission, per-result inspection, forced cancellation.
//!
//! [`TaskSet`] owns the orchestrator's `JoinSet`. Each unit of work is wrapped
//! so that a panic is caught inside the task and reported as a [`Completion`].
//!
//! ## Inspection
//! ```text
//! join_next() ─► Completion
//!   ├─ Ok(())                 ─► TaskFinished                 (continue)
//!   ├─ Err(Canceled)          ─► TaskFinished                 (continue)
//!   ├─ Err(Fail)              ─► log + TaskFailed             (continue)
//!   ├─ Err(Escalated | Exit)  ─► Escaped                      (leave wait cycle)
//!   └─ panic                  ─► log + TaskPanicked           (continue,
//!                                                              or Escaped if escalate_panics)
//! ```
//!
//! ## Rules
//! - Only the orchestrator's own tasks are observed (scoped `JoinSet`).
//! - Forced cancellation aborts every remaining task and awaits it; the
//!   cancellation `JoinError` is expected and not reported.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, warn};

use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::failures::{Failure, panic_message};
use crate::subscribers::SubscriberSet;
use crate::tasks::Work;

/// How a unit of work ended.
pub(crate) enum Outcome {
    Done(Result<(), TaskError>),
    Panicked(String),
}

/// Output of every spawned unit of work.
pub(crate) struct Completion {
    pub(crate) name: Arc<str>,
    pub(crate) outcome: Outcome,
}

/// A failure that escaped per-result inspection.
#[derive(Debug)]
pub(crate) struct Escaped {
    /// Originating task; `None` for OS signals.
    pub(crate) task: Option<Arc<str>>,
    pub(crate) failure: Failure,
}

/// The orchestrator's running tasks.
pub(crate) struct TaskSet<'a> {
    set: JoinSet<Completion>,
    subs: &'a SubscriberSet,
    escalate_panics: bool,
}

impl<'a> TaskSet<'a> {
    pub(crate) fn new(subs: &'a SubscriberSet, escalate_panics: bool) -> Self {
        Self {
            set: JoinSet::new(),
            subs,
            escalate_panics,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.set.len()
    }

    /// Starts `work` as a concurrent task.
    pub(crate) fn submit(&mut self, work: Work) {
        let (name, fut) = work.into_parts();
        debug!(task = %name, "task submitted");
        self.subs
            .emit(Event::new(EventKind::TaskSubmitted).with_task(Arc::clone(&name)));

        self.set.spawn(async move {
            let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => Outcome::Done(res),
                Err(panic_err) => Outcome::Panicked(panic_message(panic_err.as_ref())),
            };
            Completion { name, outcome }
        });
    }

    /// Waits for the first task to end. `None` when the set is empty.
    pub(crate) async fn join_next(&mut self) -> Option<Result<Completion, JoinError>> {
        self.set.join_next().await
    }

    /// Logs one ended task; returns the failure if it must escape the wait cycle.
    pub(crate) fn inspect(&self, joined: Result<Completion, JoinError>) -> Option<Escaped> {
        let Completion { name, outcome } = match joined {
            Ok(completion) => completion,
            Err(je) if je.is_cancelled() => {
                debug!("task cancelled");
                return None;
            }
            Err(je) => {
                error!(error = %je, "task terminated abnormally");
                return None;
            }
        };

        match outcome {
            Outcome::Done(Ok(())) => {
                debug!(task = %name, "task finished");
                self.subs.emit(Event::new(EventKind::TaskFinished).with_task(name));
            }
            Outcome::Done(Err(TaskError::Canceled)) => {
                debug!(task = %name, "task stopped after cancellation");
                self.subs.emit(Event::new(EventKind::TaskFinished).with_task(name));
            }
            Outcome::Done(Err(e)) => match e.into_escaped() {
                Ok(failure) => {
                    return Some(Escaped {
                        task: Some(name),
                        failure,
                    });
                }
                Err(e) => {
                    error!(task = %name, error = %e, "task failed");
                    self.subs.emit(
                        Event::new(EventKind::TaskFailed)
                            .with_task(name)
                            .with_reason(e.to_string()),
                    );
                }
            },
            Outcome::Panicked(info) => {
                error!(task = %name, info = %info, "task panicked");
                self.subs.emit(
                    Event::new(EventKind::TaskPanicked)
                        .with_task(Arc::clone(&name))
                        .with_reason(info.as_str()),
                );
                if self.escalate_panics {
                    let failure = Failure::panic(&name, &info);
                    return Some(Escaped {
                        task: Some(name),
                        failure,
                    });
                }
            }
        }
        None
    }

    /// Aborts every remaining task and waits for each to acknowledge.
    ///
    /// Returns the number of tasks that were still running.
    pub(crate) async fn cancel_all(&mut self) -> usize {
        let count = self.set.len();
        self.set.abort_all();

        while let Some(joined) = self.set.join_next().await {
            if let Some(late) = self.inspect(joined) {
                warn!(
                    task = late.task.as_deref().unwrap_or("-"),
                    failure = %late.failure,
                    "failure raised during cancellation ignored"
                );
            }
        }
        self.subs
            .emit(Event::new(EventKind::TasksCancelled).with_count(count));
        count
    }
}
