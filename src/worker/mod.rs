pub mod monitor;
pub mod sink;

pub use monitor::SensorWorker;
pub use sink::{EventSink, SinkClosed};

use serde::{Deserialize, Serialize};

/// Control messages from the host.
///
/// `{"type": "CONNECT", "baudRate": 115200}` or `{"type": "DISCONNECT"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerCommand {
    #[serde(rename_all = "camelCase")]
    Connect {
        /// Falls back to the configured rate when absent
        #[serde(default)]
        baud_rate: Option<u32>,
    },
    Disconnect,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Device already connected")]
    AlreadyConnected,

    #[error("Serial communication error: {0}")]
    Serial(#[from] crate::serial::SerialError),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
