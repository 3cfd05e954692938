//! # Event subscribers.
//!
//! ## Contents
//! - [`Subscribe`] extension trait for observing orchestrator events
//! - [`SubscriberSet`] non-blocking fan-out with per-subscriber queues
//! - [`LogWriter`] built-in subscriber writing events through `tracing`

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
