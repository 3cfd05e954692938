//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for observing orchestrator events. Each
//! subscriber is driven by a dedicated worker fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they do **not** block the orchestrator nor
//!   other subscribers.
//! - Each subscriber declares its queue capacity via [`Subscribe::queue_capacity`].
//!   On overflow, events for that subscriber are **dropped** (warn).
//! - Every event queued before teardown is delivered before `run` returns.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use taskloop::{Event, EventKind, Subscribe};
///
/// struct FailureCounter(std::sync::atomic::AtomicUsize);
///
/// #[async_trait]
/// impl Subscribe for FailureCounter {
///     async fn on_event(&self, ev: &Event) {
///         if ev.kind == EventKind::TaskFailed {
///             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///         }
///     }
///     fn name(&self) -> &'static str { "failure_counter" }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
