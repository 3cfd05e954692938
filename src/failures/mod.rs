//! Failure recovery: categories, handlers and the registry.
//!
//! ## Contents
//! - [`Failure`], [`FailureCategory`] what escapes the wait cycle and how it is keyed
//! - [`FailureHandler`], [`HandlerFn`] recovery handler trait and closure adapter
//! - [`FailureRegistry`] category → ordered handlers, with interrupt/exit defaults

mod category;
mod defaults;
mod handler;
mod registry;

pub use category::{Failure, FailureCategory};
pub use defaults::{ExitLogger, InterruptLogger};
pub use handler::{FailureHandler, HandlerFn, HandlerRef};
pub use registry::{DispatchReport, FailureRegistry, HandlerFailure};

use std::any::Any;

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
