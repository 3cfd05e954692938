//! Runtime core: owned event loop, lifecycle and teardown.
//!
//! The public API from this module is [`TaskOrchestrator`] with its
//! [`OrchestratorBuilder`], [`OrchestratorHandle`] and [`Config`].
//!
//! Internal modules:
//! - [`orchestrator`]: run sequence, wait cycle, failure recovery;
//! - [`runner`]: submission and per-result inspection of tasks;
//! - [`lifecycle`]: ordered startup/shutdown hooks;
//! - [`shutdown`]: cross-platform interrupt signal handling.

mod builder;
mod config;
mod handle;
mod lifecycle;
mod orchestrator;
mod runner;
mod shutdown;

pub use builder::OrchestratorBuilder;
pub use config::Config;
pub use handle::OrchestratorHandle;
pub use orchestrator::TaskOrchestrator;
