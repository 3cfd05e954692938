//! # taskloop
//!
//! **Taskloop** is a small cooperative task orchestrator for Rust.
//!
//! A [`TaskOrchestrator`] owns a single-threaded tokio runtime, runs ordered
//! startup hooks, drives a set of concurrent units of work until they all
//! finish, routes failures that escape to category-keyed recovery handlers,
//! and always runs its shutdown hooks before closing the loop for good.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌─────────────────────┐
//!   │  Work        │   │ ScheduledTask│   │ OrchestratorHandle  │
//!   │ (future/fn)  │   │(timer/interv)│   │ (add while running) │
//!   └──────┬───────┘   └──────┬───────┘   └──────────┬──────────┘
//!          ▼                  ▼                      ▼ (unbounded channel)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TaskOrchestrator (owns a current-thread tokio Runtime)           │
//! │  - Hooks          (startup / shutdown, ordered)                   │
//! │  - TaskSet        (JoinSet, first-completion wait cycle)          │
//! │  - FailureRegistry (category → ordered recovery handlers)         │
//! │  - SubscriberSet  (fans out events to user subscribers)           │
//! └──────┬───────────────────────────┬─────────────────────────┬──────┘
//!        │ spawn                     │ escaped Failure         │ emit(Event)
//!        ▼                           ▼                         ▼
//!   ┌──────────┐            ┌──────────────────┐      ┌─────────────────┐
//!   │ task 1..N│            │ handler 1..N     │      │ [queue] worker  │
//!   │ (tokio)  │            │ (sequential)     │      │ sub.on_event()  │
//!   └──────────┘            └──────────────────┘      └─────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! run(self)
//!   ├─► startup hooks            (Err ─► RuntimeError::Startup)
//!   ├─► submit pending work
//!   ├─► loop {
//!   │     ├─ first task ends ─► inspect
//!   │     │     ├─ Ok / Fail / panic         ─► logged, continue
//!   │     │     └─ Escalated / Exit          ─► break with failure
//!   │     ├─ OS signal                       ─► break with Interrupt
//!   │     └─ no task left                    ─► break
//!   │   }
//!   ├─► failure? ─► registry.handle(&failure) ─► abort + await the rest
//!   ├─► shutdown hooks
//!   │     (signal during recovery or shutdown ─► default action, process ends)
//!   └─► runtime closed (the orchestrator was consumed)
//! ```
//!
//! ## Features
//! | Area               | Description                                             | Key types / traits                           |
//! |--------------------|---------------------------------------------------------|----------------------------------------------|
//! | **Orchestration**  | Owned event loop, hooks, wait cycle, teardown.          | [`TaskOrchestrator`], [`OrchestratorHandle`] |
//! | **Tasks**          | Futures, async functions and cancellable delayed tasks. | [`Work`], [`ScheduledTask`], [`Delay`]       |
//! | **Recovery**       | Category-keyed handlers for escaped failures.           | [`FailureRegistry`], [`FailureHandler`]      |
//! | **Subscriber API** | Observe lifecycle events (logging, metrics, tests).     | [`Subscribe`], [`LogWriter`]                 |
//! | **Errors**         | Typed errors for the runtime and for units of work.     | [`RuntimeError`], [`TaskError`]              |
//! | **Configuration**  | Signals, panic escalation, runtime thread name.         | [`Config`]                                   |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskloop::{Config, Delay, Failure, TaskError, TaskOrchestrator, Work};
//!
//! let mut orch = TaskOrchestrator::new(Config::without_signals())?;
//!
//! orch.on_startup(|| async {
//!     println!("connecting");
//!     Ok(())
//! });
//! orch.on_shutdown(|| async {
//!     println!("disconnected");
//!     Ok(())
//! });
//!
//! orch.add_task(Work::from_future(async { Ok(()) }).named("hello"));
//! orch.timer(Delay::new().seconds(0.01), || async { Ok(()) });
//! orch.add_task(Work::from_fn(|| async {
//!     tokio::time::sleep(Duration::from_millis(5)).await;
//!     Err(TaskError::Escalated(Failure::new("value_error", "bad input")))
//! }));
//!
//! orch.run()?;
//! # Ok::<(), taskloop::RuntimeError>(())
//! ```

mod core;
mod error;
mod events;
mod failures;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{Config, OrchestratorBuilder, OrchestratorHandle, TaskOrchestrator};
pub use error::{RuntimeError, TaskError};
pub use events::{Event, EventKind};
pub use failures::{
    DispatchReport, ExitLogger, Failure, FailureCategory, FailureHandler, FailureRegistry,
    HandlerFailure, HandlerFn, HandlerRef, InterruptLogger,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Delay, ScheduledTask, Work, WorkFuture};
