//! # Failure registry: category-keyed recovery handlers.
//!
//! [`FailureRegistry`] maps a [`FailureCategory`] to an ordered list of
//! [`FailureHandler`]s. The orchestrator dispatches every failure that escapes
//! its wait cycle here before cancelling the remaining tasks.
//!
//! ## Rules
//! - Lookup is by **exact** category; there is no hierarchy.
//! - An unregistered category is a no-op, not an error.
//! - Handlers run **sequentially** in registration order, each to completion.
//! - A handler error or panic is logged with the handler name and swallowed;
//!   the remaining handlers still run.
//!
//! ## Dispatch
//! ```text
//! handle(&failure)
//!   └─► handlers[failure.category()]
//!         ├─► h1.handle(&failure)  ── Err/panic ─► log + DispatchReport.failures
//!         ├─► h2.handle(&failure)
//!         └─► hN.handle(&failure)
//! ```

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error};

use crate::failures::defaults::{ExitLogger, InterruptLogger};
use crate::failures::{Failure, FailureCategory, HandlerRef, panic_message};

/// A handler that failed while handling a failure.
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    /// Name of the handler.
    pub handler: Arc<str>,
    /// Error message or panic payload.
    pub reason: String,
}

/// Outcome of one [`FailureRegistry::handle`] call.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Number of handlers invoked (successful or not).
    pub invoked: usize,
    /// Handlers that returned an error or panicked, in invocation order.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// True if at least one handler was registered for the category.
    pub fn is_handled(&self) -> bool {
        self.invoked > 0
    }
}

/// Category-keyed recovery handlers.
///
/// # Example
/// ```rust
/// use taskloop::{Failure, FailureCategory, FailureRegistry, HandlerFn, TaskError};
///
/// let mut registry = FailureRegistry::new();
/// registry.register(
///     "value_error",
///     HandlerFn::arc("report", |_f: Failure| async { Ok::<_, TaskError>(()) }),
/// );
///
/// assert!(registry.contains(&FailureCategory::Interrupt));
/// assert_eq!(registry.handlers(&"value_error".into()).len(), 1);
/// assert!(registry.handlers(&"other".into()).is_empty());
/// ```
#[derive(Clone)]
pub struct FailureRegistry {
    handlers: HashMap<FailureCategory, Vec<HandlerRef>>,
}

impl FailureRegistry {
    /// Creates a registry pre-populated with the interrupt and exit loggers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(FailureCategory::Interrupt, Arc::new(InterruptLogger));
        registry.register(FailureCategory::Exit, Arc::new(ExitLogger));
        registry
    }

    /// Creates a registry without any handler.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Appends `handler` to the list of `category`.
    pub fn register(
        &mut self,
        category: impl Into<FailureCategory>,
        handler: HandlerRef,
    ) -> &mut Self {
        self.handlers.entry(category.into()).or_default().push(handler);
        self
    }

    /// Replaces every handler of `category` (including built-in defaults).
    pub fn replace(
        &mut self,
        category: impl Into<FailureCategory>,
        handlers: Vec<HandlerRef>,
    ) -> &mut Self {
        self.handlers.insert(category.into(), handlers);
        self
    }

    /// Appends each list in `extra` after the handlers already present for its category.
    pub fn merge(&mut self, extra: HashMap<FailureCategory, Vec<HandlerRef>>) -> &mut Self {
        for (category, handlers) in extra {
            self.handlers.entry(category).or_default().extend(handlers);
        }
        self
    }

    /// Removes a category and returns its handlers.
    pub fn remove(&mut self, category: &FailureCategory) -> Option<Vec<HandlerRef>> {
        self.handlers.remove(category)
    }

    /// Handlers registered for `category`, in invocation order.
    pub fn handlers(&self, category: &FailureCategory) -> &[HandlerRef] {
        self.handlers.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `category` has a handler list (possibly emptied by `replace`).
    pub fn contains(&self, category: &FailureCategory) -> bool {
        self.handlers.contains_key(category)
    }

    /// Registered categories, in no particular order.
    pub fn categories(&self) -> impl Iterator<Item = &FailureCategory> {
        self.handlers.keys()
    }

    /// Runs every handler registered for the failure's category.
    ///
    /// Each handler completes (or fails) before the next starts. Failures of
    /// handlers are logged and collected into the returned report.
    pub async fn handle(&self, failure: &Failure) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(handlers) = self.handlers.get(failure.category()) else {
            debug!(category = %failure.category(), "no recovery handlers registered");
            return report;
        };

        for handler in handlers {
            report.invoked += 1;
            let fut = handler.handle(failure);
            let reason = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic_err) => format!("panicked: {}", panic_message(panic_err.as_ref())),
            };
            error!(
                handler = handler.name(),
                category = %failure.category(),
                error = %reason,
                "recovery handler failed"
            );
            report.failures.push(HandlerFailure {
                handler: Arc::from(handler.name()),
                reason,
            });
        }
        report
    }
}

impl Default for FailureRegistry {
    /// Same as [`FailureRegistry::new`].
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::failures::HandlerFn;
    use std::sync::Mutex;

    fn recorder(name: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> HandlerRef {
        HandlerFn::arc(name, move |_f: Failure| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(name);
                Ok::<_, TaskError>(())
            }
        })
    }

    #[tokio::test]
    async fn test_unregistered_category_is_noop() {
        let registry = FailureRegistry::new();
        let report = registry.handle(&Failure::new("unknown", "x")).await;
        assert!(!report.is_handled());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = FailureRegistry::empty();
        registry
            .register("io", recorder("first", log.clone()))
            .register("io", recorder("second", log.clone()))
            .register("io", recorder("third", log.clone()));

        let report = registry.handle(&Failure::new("io", "disk gone")).await;
        assert_eq!(report.invoked, 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_siblings() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = FailureRegistry::empty();
        registry
            .register(
                "io",
                HandlerFn::arc("broken", |_f: Failure| async {
                    Err::<(), _>(TaskError::fail("handler exploded"))
                }),
            )
            .register(
                "io",
                HandlerFn::arc("panicky", |f: Failure| async move {
                    if f.message() == "x" {
                        panic!("handler panicked");
                    }
                    Ok::<(), TaskError>(())
                }),
            )
            .register("io", recorder("after", log.clone()));

        let report = registry.handle(&Failure::new("io", "x")).await;
        assert_eq!(report.invoked, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(&*report.failures[0].handler, "broken");
        assert!(report.failures[0].reason.contains("handler exploded"));
        assert_eq!(&*report.failures[1].handler, "panicky");
        assert!(report.failures[1].reason.contains("handler panicked"));
        assert_eq!(*log.lock().unwrap(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_merge_augments_defaults() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut extra = HashMap::new();
        extra.insert(FailureCategory::Interrupt, vec![recorder("custom", log.clone())]);

        let mut registry = FailureRegistry::new();
        registry.merge(extra);

        let names: Vec<&str> = registry
            .handlers(&FailureCategory::Interrupt)
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(names, vec!["interrupt_logger", "custom"]);

        let report = registry.handle(&Failure::interrupt()).await;
        assert_eq!(report.invoked, 2);
        assert_eq!(*log.lock().unwrap(), vec!["custom"]);
    }

    #[tokio::test]
    async fn test_replace_overwrites_only_that_category() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = FailureRegistry::new();
        registry.replace(FailureCategory::Exit, vec![recorder("only", log.clone())]);

        assert_eq!(registry.handlers(&FailureCategory::Exit).len(), 1);
        assert_eq!(registry.handlers(&FailureCategory::Interrupt).len(), 1);

        registry.handle(&Failure::exit(1)).await;
        assert_eq!(*log.lock().unwrap(), vec!["only"]);
    }

    #[test]
    fn test_exact_category_match() {
        let mut registry = FailureRegistry::empty();
        registry.register("io", recorder("io", Arc::default()));
        assert!(registry.contains(&"io".into()));
        assert!(!registry.contains(&"io.timeout".into()));
        assert!(registry.remove(&"io".into()).is_some());
        assert_eq!(registry.categories().count(), 0);
    }
}
