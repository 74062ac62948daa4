pub mod settings;

pub use settings::{ConfigError, WorkerConfig, ENV_BAUD_RATE, ENV_PORT};
