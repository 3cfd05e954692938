//! Built-in handlers registered for [`FailureCategory::Interrupt`] and
//! [`FailureCategory::Exit`] by [`FailureRegistry::new`](crate::FailureRegistry::new).
//!
//! Both only log; they never stop teardown.

use async_trait::async_trait;
use tracing::info;

use crate::error::TaskError;
use crate::failures::{Failure, FailureCategory, FailureHandler};

/// Acknowledges an interrupt: a blank line after the terminal's `^C`, then a log line.
#[derive(Debug, Default)]
pub struct InterruptLogger;

#[async_trait]
impl FailureHandler for InterruptLogger {
    fn name(&self) -> &str {
        "interrupt_logger"
    }

    async fn handle(&self, _failure: &Failure) -> Result<(), TaskError> {
        println!();
        info!(category = %FailureCategory::Interrupt, "interrupted");
        Ok(())
    }
}

/// Logs the exit code requested by a task.
#[derive(Debug, Default)]
pub struct ExitLogger;

#[async_trait]
impl FailureHandler for ExitLogger {
    fn name(&self) -> &str {
        "exit_logger"
    }

    async fn handle(&self, failure: &Failure) -> Result<(), TaskError> {
        match failure.exit_code() {
            Some(code) => info!(code, "system exit with code {code}"),
            None => info!(reason = failure.message(), "system exit"),
        }
        Ok(())
    }
}
