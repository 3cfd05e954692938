//! # Units of work and scheduled tasks.
//!
//! - [`Work`] - what the orchestrator accepts (future, async fn or scheduled task)
//! - [`ScheduledTask`] - cancellable delay-then-run wrapper, one-shot or repeating
//! - [`Delay`] - composite days/hours/minutes/seconds delay

mod delay;
mod scheduled;
mod work;

pub use delay::Delay;
pub use scheduled::ScheduledTask;
pub use work::{Work, WorkFuture};
