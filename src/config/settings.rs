use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::serial::DEFAULT_BAUD_RATE;

pub const ENV_PORT: &str = "ORIENTATION_BRIDGE_PORT";
pub const ENV_BAUD_RATE: &str = "ORIENTATION_BRIDGE_BAUD";

const DEFAULT_READ_BUFFER_SIZE: usize = 512;
const DEFAULT_STOP_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Worker settings. Every field has a default so a config file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Port to open; `None` picks the first port the OS lists
    pub port_name: Option<String>,
    pub baud_rate: u32,
    /// Size of each raw read from the port
    pub read_buffer_size: usize,
    /// How long `stop` waits for the read loop to wind down
    pub stop_timeout_ms: u64,
    /// Connect at startup without waiting for a CONNECT command
    pub auto_connect: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            port_name: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
            auto_connect: false,
        }
    }
}

impl WorkerConfig {
    /// Load a JSON config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: WorkerConfig = serde_json::from_str(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override from process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT).filter(|p| !p.trim().is_empty()) {
            self.port_name = Some(port.trim().to_string());
        }
        if let Some(baud) = lookup(ENV_BAUD_RATE) {
            self.baud_rate = baud.trim().parse().map_err(|e| ConfigError::InvalidValue {
                field: ENV_BAUD_RATE,
                reason: format!("{} ({})", baud, e),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "baudRate",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.read_buffer_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "readBufferSize",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
