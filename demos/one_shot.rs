//! # Example: one_shot
//!
//! Minimal run: a startup hook, two plain tasks and a shutdown hook.
//!
//! Demonstrates how to:
//! - Wrap futures and async functions in [`Work`].
//! - Order work around startup/shutdown hooks.
//! - Observe lifecycle events with the built-in [`LogWriter`].
//!
//! ## Flow
//! ```text
//! TaskOrchestrator::run()
//!     ├─► startup hook
//!     ├─► submit "greeter", "counter"
//!     ├─► wait cycle (greeter ends first, then counter)
//!     └─► shutdown hook ─► loop closed
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example one_shot
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskloop::{Config, LogWriter, TaskOrchestrator, Work};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskloop=info,one_shot=info")),
        )
        .init();

    let mut orch = TaskOrchestrator::builder(Config::default())
        .with_subscribers(vec![Arc::new(LogWriter::new())])
        .build()?;

    orch.on_startup(|| async {
        tracing::info!("opening resources");
        Ok(())
    });

    orch.add_task(
        Work::from_future(async {
            tracing::info!("hello from greeter");
            Ok(())
        })
        .named("greeter"),
    );

    orch.add_task(
        Work::from_fn(|| async {
            for i in 1..=3 {
                tracing::info!(tick = i, "counter");
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(())
        })
        .named("counter"),
    );

    orch.on_shutdown(|| async {
        tracing::info!("releasing resources");
        Ok(())
    });

    orch.run()?;
    Ok(())
}
