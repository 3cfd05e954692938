//! # Recovery handler abstraction and closure-backed implementation.
//!
//! [`FailureHandler`] is the extension point invoked by the
//! [`FailureRegistry`](crate::FailureRegistry) when a failure of a registered
//! category escapes the wait cycle. [`HandlerFn`] wraps a closure so most
//! callers never implement the trait by hand.
//!
//! ## Example
//! ```rust
//! use taskloop::{Failure, HandlerFn, HandlerRef, TaskError};
//!
//! let h: HandlerRef = HandlerFn::arc("alert", |failure: Failure| async move {
//!     eprintln!("alert: {failure}");
//!     Ok::<_, TaskError>(())
//! });
//! assert_eq!(h.name(), "alert");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::failures::Failure;

/// Shared handle to a recovery handler.
pub type HandlerRef = Arc<dyn FailureHandler>;

/// # Asynchronous recovery handler.
///
/// Handlers run one at a time, in registration order. Returning an error (or
/// panicking) is reported with [`name`](FailureHandler::name) and does not stop
/// the remaining handlers.
#[async_trait]
pub trait FailureHandler: Send + Sync + 'static {
    /// Returns a stable, human-readable handler name.
    fn name(&self) -> &str;

    /// Reacts to an escaped failure.
    async fn handle(&self, failure: &Failure) -> Result<(), TaskError>;
}

/// Function-backed recovery handler.
///
/// The closure receives an owned clone of the [`Failure`].
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the handler and returns it as a [`HandlerRef`].
    pub fn arc<Fut>(name: impl Into<Cow<'static, str>>, f: F) -> HandlerRef
    where
        F: Fn(Failure) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> FailureHandler for HandlerFn<F>
where
    F: Fn(Failure) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, failure: &Failure) -> Result<(), TaskError> {
        (self.f)(failure.clone()).await
    }
}
