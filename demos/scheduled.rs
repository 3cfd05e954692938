//! # Example: scheduled
//!
//! Timers, intervals and cancellation.
//!
//! A heartbeat fires every 250ms. A one-shot timer cancels it after a second,
//! and a second timer is cancelled before it ever fires. Once the heartbeat
//! stops, the set drains and `run` returns.
//!
//! A third task uses the [`OrchestratorHandle`](taskloop::OrchestratorHandle)
//! to schedule more work while the loop is already running.
//!
//! ## Run
//! ```bash
//! cargo run --example scheduled
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use taskloop::{Config, Delay, TaskError, TaskOrchestrator, Work};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut orch = TaskOrchestrator::new(Config::default())?;
    let beats = Arc::new(AtomicU32::new(0));

    let counter = beats.clone();
    let heartbeat = orch.interval(Duration::from_millis(250), move || {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(n, "heartbeat");
            Ok(())
        }
    });

    orch.timer(Delay::new().seconds(1.0), move || {
        let heartbeat = heartbeat.clone();
        async move {
            tracing::info!("stopping heartbeat");
            heartbeat.cancel();
            Ok(())
        }
    });

    let never = orch.timer(Delay::new().minutes(5), || async {
        tracing::error!("this timer should never fire");
        Ok(())
    });
    never.cancel();

    let handle = orch.handle();
    orch.add_task(
        Work::from_fn(move || async move {
            tokio::time::sleep(Duration::from_millis(400)).await;
            handle
                .timer(Duration::from_millis(100), || async {
                    tracing::info!("late timer added while running");
                    Ok(())
                })
                .map(|_late| ())
                .map_err(TaskError::fail)
        })
        .named("scheduler"),
    );

    orch.run()?;
    tracing::info!(beats = beats.load(Ordering::SeqCst), "done");
    Ok(())
}
