//! # LogWriter: renders events through `tracing`
//!
//! A minimal subscriber that forwards [`Event`]s to the `tracing` facade.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output
//! ```text
//! INFO  taskloop: [startup-completed]
//! DEBUG taskloop: [submitted] task="poller"
//! WARN  taskloop: [failed] task="poller" err="execution failed: refused"
//! ERROR taskloop: [escalated] task="poller" category=value_error reason="bad input" handlers=1
//! INFO  taskloop: [shutdown-completed]
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::EmptyRun => warn!("[empty-run]"),
            EventKind::StartupCompleted => info!("[startup-completed]"),
            EventKind::TaskSubmitted => debug!("[submitted] task={task:?}"),
            EventKind::TaskFinished => debug!("[finished] task={task:?}"),
            EventKind::TaskFailed => warn!("[failed] task={task:?} err={reason:?}"),
            EventKind::TaskPanicked => error!("[panicked] task={task:?} info={reason:?}"),
            EventKind::FailureEscalated => error!(
                "[escalated] task={task:?} category={} reason={reason:?} handlers={}",
                e.category.as_ref().map(|c| c.as_label()).unwrap_or("-"),
                e.count.unwrap_or(0),
            ),
            EventKind::HandlerFailed => error!("[handler-failed] handler={task:?} err={reason:?}"),
            EventKind::TasksCancelled => info!("[cancelled] count={}", e.count.unwrap_or(0)),
            EventKind::ShutdownCompleted => info!("[shutdown-completed]"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
