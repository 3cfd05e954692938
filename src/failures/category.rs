//! # Failure categories and escaped failure values.
//!
//! A [`Failure`] is what escapes the orchestrator's wait cycle: an OS interrupt,
//! an exit request, an escalated panic, or any application-defined failure a
//! task chose to escalate with [`TaskError::Escalated`](crate::TaskError::Escalated).
//!
//! Recovery handlers are keyed by [`FailureCategory`], a stable identifier.
//! Lookups are exact: `Custom("io")` and `Custom("io.timeout")` are unrelated.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Classification key used to look up recovery handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// Interrupt-style signal (SIGINT/SIGTERM/SIGQUIT, Ctrl-C).
    Interrupt,
    /// A task asked the process to exit with a code.
    Exit,
    /// A task panicked while [`Config::escalate_panics`](crate::Config::escalate_panics) was set.
    Panic,
    /// Application-defined category.
    Custom(Cow<'static, str>),
}

impl FailureCategory {
    /// Builds an application-defined category.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        FailureCategory::Custom(name.into())
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &str {
        match self {
            FailureCategory::Interrupt => "interrupt",
            FailureCategory::Exit => "exit",
            FailureCategory::Panic => "panic",
            FailureCategory::Custom(name) => name,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl From<&'static str> for FailureCategory {
    fn from(name: &'static str) -> Self {
        FailureCategory::custom(name)
    }
}

impl From<String> for FailureCategory {
    fn from(name: String) -> Self {
        FailureCategory::custom(name)
    }
}

/// A failure that escaped the wait cycle.
///
/// Cheap to clone; handlers receive it by reference.
///
/// # Example
/// ```
/// use taskloop::{Failure, FailureCategory};
///
/// let f = Failure::new("value_error", "negative amount");
/// assert_eq!(f.category(), &FailureCategory::custom("value_error"));
/// assert_eq!(f.message(), "negative amount");
/// assert_eq!(f.to_string(), "value_error: negative amount");
/// ```
#[derive(Debug, Clone)]
pub struct Failure {
    category: FailureCategory,
    message: Arc<str>,
    exit_code: Option<i32>,
}

impl Failure {
    /// Creates a failure of the given category.
    pub fn new(category: impl Into<FailureCategory>, message: impl Into<Arc<str>>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            exit_code: None,
        }
    }

    /// Interrupt failure (OS signal observed).
    pub fn interrupt() -> Self {
        Self::new(FailureCategory::Interrupt, "interrupted")
    }

    /// Exit request carrying `code`.
    pub fn exit(code: i32) -> Self {
        Self {
            category: FailureCategory::Exit,
            message: Arc::from(format!("exit requested with code {code}")),
            exit_code: Some(code),
        }
    }

    /// Escalated panic of the named task.
    pub fn panic(task: &str, info: &str) -> Self {
        Self::new(FailureCategory::Panic, format!("task {task:?} panicked: {info}"))
    }

    pub fn category(&self) -> &FailureCategory {
        &self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Requested exit code, set only for [`FailureCategory::Exit`].
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_categories_compare_by_name() {
        assert_eq!(FailureCategory::custom("io"), FailureCategory::from("io"));
        assert_ne!(FailureCategory::custom("io"), FailureCategory::custom("io.timeout"));
        assert_ne!(FailureCategory::custom("exit"), FailureCategory::Exit);
    }

    #[test]
    fn test_exit_failure_carries_code() {
        let f = Failure::exit(7);
        assert_eq!(f.category(), &FailureCategory::Exit);
        assert_eq!(f.exit_code(), Some(7));
        assert!(f.message().contains('7'));
    }

    #[test]
    fn test_interrupt_has_no_exit_code() {
        let f = Failure::interrupt();
        assert_eq!(f.category().as_label(), "interrupt");
        assert_eq!(f.exit_code(), None);
    }
}
