use tokio::sync::{broadcast, mpsc};

use crate::sensor::WorkerEvent;

#[derive(Debug, thiserror::Error)]
#[error("Event receiver closed")]
pub struct SinkClosed;

/// Outbound event channel to the host.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: WorkerEvent) -> Result<(), SinkClosed>;
}

impl EventSink for mpsc::UnboundedSender<WorkerEvent> {
    fn emit(&self, event: WorkerEvent) -> Result<(), SinkClosed> {
        self.send(event).map_err(|_| SinkClosed)
    }
}

impl EventSink for broadcast::Sender<WorkerEvent> {
    fn emit(&self, event: WorkerEvent) -> Result<(), SinkClosed> {
        self.send(event).map(|_| ()).map_err(|_| SinkClosed)
    }
}

/// Emit and log on failure. A missing host never stops the read loop.
pub(crate) fn emit_event(sink: &dyn EventSink, event: WorkerEvent) {
    if let Err(e) = sink.emit(event) {
        log::warn!("Failed to emit event: {}", e);
    }
}
