//! # TaskOrchestrator: owned event loop, lifecycle hooks and failure recovery.
//!
//! The [`TaskOrchestrator`] owns a single-threaded tokio runtime for its whole
//! lifetime. Work is collected before [`TaskOrchestrator::run`], submitted as
//! concurrent tasks after the startup hooks, and awaited one completion at a
//! time. A failure that escapes per-result inspection is dispatched to the
//! [`FailureRegistry`] and tears the loop down.
//!
//! ## Run sequence
//! ```text
//! run(self)
//!   ├─► no pending work?      ─► warn + EmptyRun
//!   ├─► startup hooks (in order)
//!   │       └─ Err ─► RuntimeError::Startup   (no task submitted, no shutdown hooks)
//!   ├─► StartupCompleted
//!   ├─► submit pending + handle-queued work   ─► TaskSubmitted (each)
//!   ├─► wait cycle:
//!   │     loop {
//!   │       ├─ OS signal (handle_signals)     ─► Escaped(Interrupt)
//!   │       ├─ handle.add_task(..)            ─► submit, next round
//!   │       └─ join_next()                    ─► inspect
//!   │             ├─ contained                ─► next round
//!   │             └─ Escalated / Exit / panic ─► Escaped
//!   │     } until the set is empty
//!   ├─► close the handle channel              (handles now see Closed)
//!   ├─► Escaped?
//!   │     ├─► registry.handle(&failure)       ─► FailureEscalated, HandlerFailed*
//!   │     └─► abort + await remaining tasks   ─► TasksCancelled
//!   ├─► shutdown hooks (in order, failures logged)
//!   │     (a signal anywhere in teardown ─► default action, process ends)
//!   ├─► release the signal listener
//!   ├─► ShutdownCompleted, flush subscribers
//!   └─► drop the runtime
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//! use taskloop::{Config, TaskOrchestrator};
//!
//! let fired = Arc::new(AtomicBool::new(false));
//!
//! let mut orch = TaskOrchestrator::new(Config::without_signals())?;
//! let flag = fired.clone();
//! orch.timer(Duration::ZERO, move || {
//!     let flag = flag.clone();
//!     async move {
//!         flag.store(true, Ordering::SeqCst);
//!         Ok(())
//!     }
//! });
//! orch.run()?;
//!
//! assert!(fired.load(Ordering::SeqCst));
//! # Ok::<(), taskloop::RuntimeError>(())
//! ```

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::core::builder::OrchestratorBuilder;
use crate::core::handle::OrchestratorHandle;
use crate::core::lifecycle::Hooks;
use crate::core::runner::{Escaped, TaskSet};
use crate::core::shutdown::{self, InterruptListener};
use crate::core::Config;
use crate::error::{RuntimeError, TaskError};
use crate::events::{Event, EventKind};
use crate::failures::{Failure, FailureCategory, FailureRegistry};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{ScheduledTask, Work};

/// Runs units of work on an owned single-threaded event loop.
///
/// Consumed by [`run`](Self::run): an orchestrator runs exactly once.
pub struct TaskOrchestrator {
    cfg: Config,
    runtime: Runtime,
    hooks: Hooks,
    pending: Vec<Work>,
    registry: FailureRegistry,
    subscribers: Vec<Arc<dyn Subscribe>>,
    tx: mpsc::UnboundedSender<Work>,
    rx: mpsc::UnboundedReceiver<Work>,
}

impl TaskOrchestrator {
    /// Creates an orchestrator with the default failure handlers and no subscriber.
    ///
    /// Fails with [`RuntimeError::Build`] if the runtime cannot be created.
    pub fn new(cfg: Config) -> Result<Self, RuntimeError> {
        Self::with_parts(cfg, FailureRegistry::new(), Vec::new())
    }

    /// Returns a builder for initial tasks, extra failure handlers and subscribers.
    pub fn builder(cfg: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg)
    }

    pub(crate) fn with_parts(
        cfg: Config,
        registry: FailureRegistry,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, RuntimeError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name(cfg.thread_name.clone())
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            cfg,
            runtime,
            hooks: Hooks::default(),
            pending: Vec::new(),
            registry,
            subscribers,
            tx,
            rx,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns a cloneable handle that can add work while the loop runs.
    pub fn handle(&self) -> OrchestratorHandle {
        OrchestratorHandle::new(self.tx.clone())
    }

    /// Appends a unit of work to the pending list.
    ///
    /// Accepts a [`Work`] or a [`ScheduledTask`]. A bare future or async
    /// function goes through [`add_future`](Self::add_future) and
    /// [`add_fn`](Self::add_fn), or is wrapped with [`Work::from_future`] /
    /// [`Work::from_fn`] first (needed to give it a name).
    pub fn add_task(&mut self, work: impl Into<Work>) -> &mut Self {
        self.pending.push(work.into());
        self
    }

    /// Appends a future to the pending list.
    pub fn add_future<Fut>(&mut self, fut: Fut) -> &mut Self
    where
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.add_task(Work::from_future(fut))
    }

    /// Appends an async function, called once when the task starts.
    pub fn add_fn<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.add_task(Work::from_fn(f))
    }

    /// Appends a dynamically-typed unit of work to the pending list.
    ///
    /// Fails with [`RuntimeError::TypeMismatch`] if `value` is not a [`Work`],
    /// a [`ScheduledTask`] or a [`WorkFuture`](crate::WorkFuture).
    pub fn add_task_any(&mut self, value: Box<dyn Any + Send>) -> Result<(), RuntimeError> {
        self.pending.push(Work::try_from_any(value)?);
        Ok(())
    }

    /// Builds a one-shot [`ScheduledTask`], adds it and returns it for cancellation.
    pub fn timer<F, Fut>(&mut self, delay: impl Into<Duration>, f: F) -> ScheduledTask
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let task = ScheduledTask::timer(delay, f);
        self.pending.push(task.clone().into());
        task
    }

    /// Builds a repeating [`ScheduledTask`], adds it and returns it for cancellation.
    pub fn interval<F, Fut>(&mut self, delay: impl Into<Duration>, f: F) -> ScheduledTask
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let task = ScheduledTask::interval(delay, f);
        self.pending.push(task.clone().into());
        task
    }

    /// Appends a hook run before any task is submitted.
    pub fn on_startup<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.hooks.on_startup(f);
        self
    }

    /// Appends a hook run after every task ended.
    pub fn on_shutdown<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.hooks.on_shutdown(f);
        self
    }

    pub fn registry(&self) -> &FailureRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FailureRegistry {
        &mut self.registry
    }

    /// Adds an event subscriber.
    pub fn subscribe(&mut self, sub: Arc<dyn Subscribe>) -> &mut Self {
        self.subscribers.push(sub);
        self
    }

    /// Number of units of work waiting for [`run`](Self::run).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Runs hooks and tasks to completion, then closes the event loop.
    ///
    /// Blocks the calling thread. Under normal operation the only error
    /// returned is [`RuntimeError::Startup`].
    pub fn run(self) -> Result<(), RuntimeError> {
        let Self {
            cfg,
            runtime,
            mut hooks,
            mut pending,
            registry,
            subscribers,
            tx,
            mut rx,
        } = self;
        drop(tx);

        let res = runtime.block_on(async {
            let subs = SubscriberSet::new(subscribers);
            let res = drive(&cfg, &mut hooks, &mut pending, &registry, &subs, &mut rx).await;
            subs.shutdown().await;
            res
        });

        drop(runtime);
        debug!("event loop closed");
        res
    }
}

async fn drive(
    cfg: &Config,
    hooks: &mut Hooks,
    pending: &mut Vec<Work>,
    registry: &FailureRegistry,
    subs: &SubscriberSet,
    rx: &mut mpsc::UnboundedReceiver<Work>,
) -> Result<(), RuntimeError> {
    while let Ok(work) = rx.try_recv() {
        pending.push(work);
    }
    if pending.is_empty() {
        if cfg.warn_on_empty {
            warn!("running with zero tasks");
        }
        subs.emit(Event::new(EventKind::EmptyRun));
    }

    debug!(
        startup = hooks.startup_len(),
        shutdown = hooks.shutdown_len(),
        tasks = pending.len(),
        "starting event loop"
    );
    hooks.run_startup().await?;
    subs.emit(Event::new(EventKind::StartupCompleted));

    let mut set = TaskSet::new(subs, cfg.escalate_panics);
    for work in pending.drain(..) {
        set.submit(work);
    }

    let mut listener = if cfg.handle_signals {
        shutdown::listen()
    } else {
        None
    };
    let escaped = wait_cycle(&mut set, rx, &mut listener).await;

    let teardown = async {
        rx.close();
        let mut dropped = 0usize;
        while let Ok(work) = rx.try_recv() {
            debug!(task = work.name(), "dropping work added during teardown");
            dropped += 1;
        }
        if dropped > 0 {
            warn!(dropped, "work added during teardown was not run");
        }

        if let Some(escaped) = escaped {
            recover(registry, subs, escaped).await;
            let cancelled = set.cancel_all().await;
            info!(cancelled, "remaining tasks cancelled");
        }

        hooks.run_shutdown().await;
    };
    tokio::select! {
        () = teardown => {}
        received = shutdown::next_signal(&mut listener) => {
            error!(signal = received.name, "signal received during teardown, terminating");
            received.terminate();
        }
    }
    drop(listener);

    subs.emit(Event::new(EventKind::ShutdownCompleted));
    Ok(())
}

/// Awaits tasks one completion at a time until the set is empty or a failure escapes.
async fn wait_cycle(
    set: &mut TaskSet<'_>,
    rx: &mut mpsc::UnboundedReceiver<Work>,
    listener: &mut Option<InterruptListener>,
) -> Option<Escaped> {
    loop {
        while let Ok(work) = rx.try_recv() {
            set.submit(work);
        }
        if set.is_empty() {
            return None;
        }

        tokio::select! {
            received = shutdown::next_signal(listener) => {
                info!(signal = received.name, running = set.len(), "interrupt signal received");
                let message = format!("received {}", received.name);
                return Some(Escaped {
                    task: None,
                    failure: Failure::new(FailureCategory::Interrupt, message),
                });
            }
            Some(work) = rx.recv() => set.submit(work),
            Some(joined) = set.join_next() => {
                if let Some(escaped) = set.inspect(joined) {
                    return Some(escaped);
                }
            }
            else => return None,
        }
    }
}

/// Dispatches an escaped failure to its recovery handlers.
async fn recover(registry: &FailureRegistry, subs: &SubscriberSet, escaped: Escaped) {
    let Escaped { task, failure } = escaped;
    let category = failure.category().clone();
    warn!(
        task = task.as_deref().unwrap_or("-"),
        category = %category,
        failure = %failure,
        "failure escaped, tearing down"
    );

    let report = registry.handle(&failure).await;
    if !report.is_handled() {
        warn!(category = %category, "no recovery handler for escaped failure");
    }

    let mut ev = Event::new(EventKind::FailureEscalated)
        .with_category(category.clone())
        .with_reason(failure.message())
        .with_count(report.invoked);
    if let Some(task) = task {
        ev = ev.with_task(task);
    }
    subs.emit(ev);

    for hf in report.failures {
        subs.emit(
            Event::new(EventKind::HandlerFailed)
                .with_task(hf.handler)
                .with_category(category.clone())
                .with_reason(hf.reason),
        );
    }
}
