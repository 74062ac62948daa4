use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest readings reported by the device.
///
/// Each vector is replaced as a whole whenever its line arrives, so its
/// length follows whatever the device printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Heading, pitch, roll in degrees
    pub orientation: Vec<f64>,
    /// w, x, y, z
    pub quaternion: Vec<f64>,
    /// System, gyro, accel, mag calibration levels (0-3)
    pub calibration: Vec<f64>,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            orientation: vec![0.0, 0.0, 0.0],
            quaternion: vec![1.0, 0.0, 0.0, 0.0],
            calibration: vec![0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Messages sent to the host.
///
/// Serialized as `{"type": "DATA_READ", ...}`. NaN components become `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerEvent {
    #[serde(rename_all = "camelCase")]
    Connected {
        port_name: String,
        baud_rate: u32,
        connected_at: DateTime<Utc>,
    },
    /// First calibration line of the connection has arrived
    ShowCalibration,
    DataRead(SensorSnapshot),
}

/// Per-session counters, logged when the session ends
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub bytes_read: u64,
    pub lines_read: u64,
    pub readings: u64,
    pub ignored_lines: u64,
    pub decode_errors: u64,
}
