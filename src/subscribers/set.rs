//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes events to multiple subscribers
//! without blocking the orchestrator's wait cycle.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → warn, continue
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: use `Event::seq` to reorder if needed
//! - **Per-subscriber FIFO**: each subscriber sees events in emission order
//! - **Overflow**: event dropped for that subscriber only (warn)
//! - **Isolation**: a panicking subscriber doesn't affect others
//!
//! Workers are spawned on the current runtime, so the set must be created
//! inside it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::events::Event;
use crate::failures::panic_message;
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Minimum queue capacity is 1.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
                        warn!(
                            subscriber = sub.name(),
                            info = %panic_message(panic_err.as_ref()),
                            "subscriber panicked"
                        );
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self { channels, workers }
    }

    /// Emits an event to all subscribers (non-blocking).
    pub fn emit(&self, event: Event) {
        let event = Arc::new(event);
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        subscriber = channel.name,
                        kind = ?event.kind,
                        "subscriber dropped event: queue full"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(
                        subscriber = channel.name,
                        kind = ?event.kind,
                        "subscriber dropped event: worker closed"
                    );
                }
            }
        }
    }

    /// Closes all queues and waits until every queued event was processed.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Collect(Arc<Mutex<Vec<EventKind>>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Explode;

    #[async_trait]
    impl Subscribe for Explode {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber blew up");
        }
    }

    #[tokio::test]
    async fn test_events_delivered_in_order_before_shutdown_returns() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(vec![Arc::new(Collect(seen.clone())), Arc::new(Explode)]);
        assert_eq!(set.len(), 2);

        set.emit(Event::new(EventKind::StartupCompleted));
        set.emit(Event::new(EventKind::TaskSubmitted));
        set.emit(Event::new(EventKind::ShutdownCompleted));
        set.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                EventKind::StartupCompleted,
                EventKind::TaskSubmitted,
                EventKind::ShutdownCompleted
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_set() {
        let set = SubscriberSet::new(Vec::new());
        assert!(set.is_empty());
        set.emit(Event::new(EventKind::EmptyRun));
        set.shutdown().await;
    }
}
