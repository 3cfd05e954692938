//! Error types used by the taskloop runtime and its tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the orchestrator itself.
//! - [`TaskError`]: errors returned by units of work, lifecycle hooks and failure handlers.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;

use crate::failures::Failure;

/// # Errors produced by the taskloop runtime.
///
/// Under normal operation the only one of these surfaced by
/// [`TaskOrchestrator::run`](crate::TaskOrchestrator::run) is [`RuntimeError::Startup`];
/// task failures are absorbed by the wait cycle and the failure registry.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The owned event loop could not be created.
    #[error("failed to build event loop: {0}")]
    Build(#[from] std::io::Error),

    /// A startup hook failed; no task was submitted.
    #[error("startup hook {hook:?} failed: {error}")]
    Startup {
        /// Name of the hook that failed.
        hook: Arc<str>,
        /// The error returned (or the panic message raised) by the hook.
        error: TaskError,
    },

    /// A dynamically-typed value passed to
    /// [`TaskOrchestrator::add_task_any`](crate::TaskOrchestrator::add_task_any)
    /// is not a unit of work.
    #[error("task should be a future, an async function or a ScheduledTask")]
    TypeMismatch,

    /// The orchestrator has already been torn down.
    #[error("orchestrator is closed")]
    Closed,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskloop::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::TypeMismatch.as_label(), "runtime_type_mismatch");
    /// assert_eq!(RuntimeError::Closed.as_label(), "runtime_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Build(_) => "runtime_build_failed",
            RuntimeError::Startup { .. } => "runtime_startup_failed",
            RuntimeError::TypeMismatch => "runtime_type_mismatch",
            RuntimeError::Closed => "runtime_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Build(e) => format!("build: {e}"),
            RuntimeError::Startup { hook, error } => {
                format!("startup hook={hook} {}", error.as_message())
            }
            RuntimeError::TypeMismatch => "unsupported task type".to_string(),
            RuntimeError::Closed => "closed".to_string(),
        }
    }
}

/// # Errors produced by units of work.
///
/// How the orchestrator reacts depends on the variant:
/// - [`TaskError::Fail`] is logged; sibling tasks keep running.
/// - [`TaskError::Canceled`] is a graceful exit.
/// - [`TaskError::Escalated`] and [`TaskError::Exit`] escape the wait cycle, are dispatched
///   to the [`FailureRegistry`](crate::FailureRegistry), and tear the loop down.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Execution failed; the failure stays local to the task.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A failure that must reach the recovery handlers of its category.
    #[error("escalated: {0}")]
    Escalated(Failure),

    /// The task requested the process to exit with the given code.
    #[error("exit requested with code {code}")]
    Exit {
        /// Requested exit code.
        code: i32,
    },

    /// The task observed cancellation and stopped.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] from anything displayable.
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskloop::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Exit { code: 2 }.as_label(), "task_exit");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Escalated(_) => "task_escalated",
            TaskError::Exit { .. } => "task_exit",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Escalated(f) => format!("escalated: {f}"),
            TaskError::Exit { code } => format!("exit: {code}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Converts the error into the failure that escapes the wait cycle, if any.
    ///
    /// `Escalated` yields its failure, `Exit` yields an exit-category failure;
    /// everything else stays contained.
    ///
    /// # Example
    /// ```
    /// use taskloop::{FailureCategory, TaskError};
    ///
    /// let f = TaskError::Exit { code: 3 }.into_escaped().unwrap();
    /// assert_eq!(f.category(), &FailureCategory::Exit);
    /// assert_eq!(f.exit_code(), Some(3));
    ///
    /// assert!(TaskError::fail("local").into_escaped().is_err());
    /// ```
    pub fn into_escaped(self) -> Result<Failure, TaskError> {
        match self {
            TaskError::Escalated(f) => Ok(f),
            TaskError::Exit { code } => Ok(Failure::exit(code)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failures::FailureCategory;

    #[test]
    fn test_startup_error_mentions_hook() {
        let err = RuntimeError::Startup {
            hook: Arc::from("migrate"),
            error: TaskError::fail("db down"),
        };
        assert_eq!(err.as_label(), "runtime_startup_failed");
        assert!(err.to_string().contains("migrate"));
        assert!(err.as_message().contains("db down"));
    }

    #[test]
    fn test_escalated_keeps_category() {
        let err = TaskError::Escalated(Failure::new("value_error", "bad input"));
        assert_eq!(err.as_label(), "task_escalated");
        let failure = err.into_escaped().unwrap();
        assert_eq!(failure.category(), &FailureCategory::custom("value_error"));
    }

    #[test]
    fn test_canceled_is_contained() {
        assert!(matches!(
            TaskError::Canceled.into_escaped(),
            Err(TaskError::Canceled)
        ));
    }
}
