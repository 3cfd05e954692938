//! Orchestrator lifecycle events.
//!
//! The orchestrator is the only publisher: it hands each [`Event`] to the
//! [`SubscriberSet`](crate::SubscriberSet), which fans it out to user
//! subscribers without awaiting them.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata

mod event;

pub use event::{Event, EventKind};
