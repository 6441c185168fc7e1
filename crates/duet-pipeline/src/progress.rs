//! Stage transition observers
//!
//! The orchestrator reports every stage transition to an optional observer.
//! Observers must not block; slow consumers should hand events to a channel.

use duet_core::{ProgressEvent, StageStatus};
use tokio::sync::mpsc::UnboundedSender;

pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Forwards events to a channel; a closed receiver drops them silently
impl ProgressObserver for UnboundedSender<ProgressEvent> {
    fn on_event(&self, event: &ProgressEvent) {
        if self.send(event.clone()).is_err() {
            tracing::trace!(stage = %event.stage, "progress receiver dropped");
        }
    }
}

/// Adapts a closure into an observer
pub struct CallbackObserver<F>(F);

impl<F> CallbackObserver<F>
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    pub const fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F> ProgressObserver for CallbackObserver<F>
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        (self.0)(event);
    }
}

/// Writes every event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_event(&self, event: &ProgressEvent) {
        let run_id = event.run_id.as_ref().map(ToString::to_string);
        match event.status {
            StageStatus::Failed => tracing::error!(
                run_id,
                stage = %event.stage,
                status = %event.status,
                "{}",
                event.message
            ),
            _ => tracing::info!(
                run_id,
                stage = %event.stage,
                status = %event.status,
                "{}",
                event.message
            ),
        }
    }
}
