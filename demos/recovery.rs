//! # Example: recovery
//!
//! Failure categories and recovery handlers.
//!
//! - `flaky` fails locally: the error is logged and nothing else happens.
//! - `validator` escalates a `value_error` failure: its handler runs once, the
//!   remaining `worker` task is cancelled, and shutdown hooks still run.
//! - Press Ctrl-C before the validator fires to see the interrupt path instead.
//!
//! ## Flow
//! ```text
//! validator ─► Err(Escalated(value_error))
//!     └─► FailureRegistry::handle
//!           ├─► "report" handler
//!           └─► cancel "worker" ─► shutdown hooks ─► loop closed
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example recovery
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskloop::{
    Config, Failure, FailureCategory, HandlerFn, LogWriter, TaskError, TaskOrchestrator, Work,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut orch = TaskOrchestrator::builder(Config::default())
        .with_handler(
            "value_error",
            HandlerFn::arc("report", |failure: Failure| async move {
                tracing::warn!(%failure, "reporting invalid input");
                Ok(())
            }),
        )
        .with_handler(
            FailureCategory::Interrupt,
            HandlerFn::arc("goodbye", |_f: Failure| async {
                tracing::info!("interrupted by user");
                Ok(())
            }),
        )
        .with_subscribers(vec![Arc::new(LogWriter::new())])
        .build()?;

    orch.add_task(
        Work::from_fn(|| async { Err(TaskError::fail("connection refused")) }).named("flaky"),
    );

    orch.add_task(
        Work::from_fn(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Err(TaskError::Escalated(Failure::new(
                "value_error",
                "amount must be positive",
            )))
        })
        .named("validator"),
    );

    orch.add_task(
        Work::from_fn(|| async {
            for step in 1..=60 {
                tokio::time::sleep(Duration::from_millis(500)).await;
                tracing::info!(step, "worker still busy");
            }
            Ok(())
        })
        .named("worker"),
    );

    orch.on_shutdown(|| async {
        tracing::info!("flushing state");
        Ok(())
    });

    orch.run()?;
    Ok(())
}
