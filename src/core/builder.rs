//! # Builder for [`TaskOrchestrator`].
//!
//! Collects initial tasks, extra failure handlers and subscribers, then builds
//! the orchestrator (and its runtime) in one step.
//!
//! Extra handlers are merged on top of the built-in interrupt and exit loggers;
//! use [`FailureRegistry::replace`] through
//! [`TaskOrchestrator::registry_mut`] to overwrite a category instead.
//!
//! ## Example
//! ```rust
//! use std::collections::HashMap;
//! use taskloop::{Config, Failure, FailureCategory, HandlerFn, TaskOrchestrator, Work};
//!
//! let mut handlers = HashMap::new();
//! handlers.insert(
//!     FailureCategory::Interrupt,
//!     vec![HandlerFn::arc("flush", |_f: Failure| async { Ok(()) })],
//! );
//!
//! let orch = TaskOrchestrator::builder(Config::without_signals())
//!     .with_tasks(vec![Work::from_future(async { Ok(()) }).named("noop")])
//!     .with_failure_handlers(handlers)
//!     .build()?;
//!
//! assert_eq!(orch.pending_len(), 1);
//! assert_eq!(orch.registry().handlers(&FailureCategory::Interrupt).len(), 2);
//! # Ok::<(), taskloop::RuntimeError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{Config, TaskOrchestrator};
use crate::error::RuntimeError;
use crate::failures::{FailureCategory, FailureRegistry, HandlerRef};
use crate::subscribers::Subscribe;
use crate::tasks::Work;

/// Builder for constructing a [`TaskOrchestrator`] with optional features.
pub struct OrchestratorBuilder {
    cfg: Config,
    tasks: Vec<Work>,
    handlers: HashMap<FailureCategory, Vec<HandlerRef>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            tasks: Vec::new(),
            handlers: HashMap::new(),
            subscribers: Vec::new(),
        }
    }

    /// Adds initial units of work, submitted by `run` after the startup hooks.
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Work>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Merges extra failure handlers; each list runs after the handlers
    /// already registered for its category.
    pub fn with_failure_handlers(
        mut self,
        handlers: HashMap<FailureCategory, Vec<HandlerRef>>,
    ) -> Self {
        for (category, list) in handlers {
            self.handlers.entry(category).or_default().extend(list);
        }
        self
    }

    /// Appends one failure handler for `category`.
    pub fn with_handler(
        mut self,
        category: impl Into<FailureCategory>,
        handler: HandlerRef,
    ) -> Self {
        self.handlers.entry(category.into()).or_default().push(handler);
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive orchestrator events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the orchestrator; fails with [`RuntimeError::Build`] if the
    /// runtime cannot be created.
    pub fn build(self) -> Result<TaskOrchestrator, RuntimeError> {
        let mut registry = FailureRegistry::new();
        registry.merge(self.handlers);

        let mut orch = TaskOrchestrator::with_parts(self.cfg, registry, self.subscribers)?;
        for work in self.tasks {
            orch.add_task(work);
        }
        Ok(orch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failures::{Failure, HandlerFn};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_builder_keeps_defaults_and_appends() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let orch = TaskOrchestrator::builder(Config::without_signals())
            .with_handler(
                FailureCategory::Exit,
                HandlerFn::arc("count", move |_f: Failure| {
                    let h = h.clone();
                    async move {
                        h.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .with_tasks(vec![Work::from_fn(|| async {
                Err(crate::TaskError::Exit { code: 0 })
            })])
            .build()
            .unwrap();

        let names: Vec<&str> = orch
            .registry()
            .handlers(&FailureCategory::Exit)
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(names, vec!["exit_logger", "count"]);

        orch.run().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
