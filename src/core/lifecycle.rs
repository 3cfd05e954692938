//! # Startup and shutdown hooks.
//!
//! Hooks are zero-argument async functions run once per `run`, strictly in
//! registration order, each to completion before the next starts.
//!
//! ## Rules
//! - Startup: the first failing hook (error or panic) aborts `run` with
//!   [`RuntimeError::Startup`]; later hooks are skipped.
//! - Shutdown: a failing hook is logged; later hooks still run.
//! - Each list is drained when run, so a hook never runs twice.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error};

use crate::error::{RuntimeError, TaskError};
use crate::failures::panic_message;
use crate::tasks::WorkFuture;

type HookFn = Box<dyn FnOnce() -> WorkFuture + Send>;

struct Hook {
    name: Arc<str>,
    f: HookFn,
}

impl Hook {
    async fn call(self) -> Result<(), TaskError> {
        let fut = (self.f)();
        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic_err) => Err(TaskError::fail(format!(
                "panicked: {}",
                panic_message(panic_err.as_ref())
            ))),
        }
    }
}

/// Ordered startup and shutdown hook lists.
#[derive(Default)]
pub(crate) struct Hooks {
    startup: Vec<Hook>,
    shutdown: Vec<Hook>,
}

impl Hooks {
    pub(crate) fn on_startup<F, Fut>(&mut self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let name = format!("startup#{}", self.startup.len() + 1);
        self.startup.push(Hook {
            name: Arc::from(name),
            f: Box::new(move || -> WorkFuture { Box::pin(f()) }),
        });
    }

    pub(crate) fn on_shutdown<F, Fut>(&mut self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let name = format!("shutdown#{}", self.shutdown.len() + 1);
        self.shutdown.push(Hook {
            name: Arc::from(name),
            f: Box::new(move || -> WorkFuture { Box::pin(f()) }),
        });
    }

    pub(crate) fn startup_len(&self) -> usize {
        self.startup.len()
    }

    pub(crate) fn shutdown_len(&self) -> usize {
        self.shutdown.len()
    }

    /// Runs startup hooks in order; stops at the first failure.
    pub(crate) async fn run_startup(&mut self) -> Result<(), RuntimeError> {
        for hook in std::mem::take(&mut self.startup) {
            let name = Arc::clone(&hook.name);
            debug!(hook = %name, "running startup hook");
            if let Err(error) = hook.call().await {
                error!(hook = %name, error = %error, "startup hook failed");
                return Err(RuntimeError::Startup { hook: name, error });
            }
        }
        Ok(())
    }

    /// Runs every shutdown hook in order; failures are logged.
    pub(crate) async fn run_shutdown(&mut self) {
        for hook in std::mem::take(&mut self.shutdown) {
            let name = Arc::clone(&hook.name);
            debug!(hook = %name, "running shutdown hook");
            if let Err(error) = hook.call().await {
                error!(hook = %name, error = %error, "shutdown hook failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn push(
        log: Arc<Mutex<Vec<&'static str>>>,
        v: &'static str,
    ) -> impl FnOnce() -> WorkFuture + Send + 'static {
        move || -> WorkFuture {
            Box::pin(async move {
                log.lock().unwrap().push(v);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_startup_runs_in_order_and_drains() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::default();
        hooks.on_startup(push(log.clone(), "a"));
        hooks.on_startup(push(log.clone(), "b"));
        assert_eq!(hooks.startup_len(), 2);

        hooks.run_startup().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(hooks.startup_len(), 0);
    }

    #[tokio::test]
    async fn test_startup_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::default();
        hooks.on_startup(push(log.clone(), "a"));
        hooks.on_startup(|| async { Err(TaskError::fail("no config")) });
        hooks.on_startup(push(log.clone(), "c"));

        let err = hooks.run_startup().await.unwrap_err();
        match err {
            RuntimeError::Startup { hook, error } => {
                assert_eq!(&*hook, "startup#2");
                assert!(error.to_string().contains("no config"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_shutdown_continues_after_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::default();
        hooks.on_shutdown(|| async { Err(TaskError::fail("flush failed")) });
        hooks.on_shutdown(|| async {
            if hooks_should_panic() {
                panic!("hook panicked");
            }
            Ok(())
        });
        hooks.on_shutdown(push(log.clone(), "last"));
        assert_eq!(hooks.shutdown_len(), 3);

        hooks.run_shutdown().await;
        assert_eq!(*log.lock().unwrap(), vec!["last"]);
    }

    fn hooks_should_panic() -> bool {
        true
    }
}
