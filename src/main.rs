use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use orientation_bridge_lib::config::WorkerConfig;
use orientation_bridge_lib::serial::SerialInterface;

#[derive(Debug, Parser)]
#[command(name = "orientation-bridge", version, about = "Stream micro:bit orientation readings as JSON lines")]
struct Cli {
  /// JSON config file
  #[arg(long)]
  config: Option<PathBuf>,

  /// Serial port to open (default: first available)
  #[arg(long)]
  port: Option<String>,

  #[arg(long)]
  baud_rate: Option<u32>,

  /// Connect immediately instead of waiting for a CONNECT command
  #[arg(long)]
  connect: bool,

  /// Print available serial ports as JSON and exit
  #[arg(long)]
  list_ports: bool,

  #[arg(long, env = "ORIENTATION_BRIDGE_LOG", default_value = "info")]
  log_level: LevelFilter,
}

fn init_logging(level: LevelFilter) {
  // stdout carries host events, keep logs on stderr
  let _ = tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_max_level(level)
    .with_ansi(false)
    .with_target(false)
    .try_init();
}

fn load_config(cli: &Cli) -> anyhow::Result<WorkerConfig> {
  let mut config = match &cli.config {
    Some(path) => WorkerConfig::load_from_file(path)
      .with_context(|| format!("loading {}", path.display()))?,
    None => WorkerConfig::default(),
  };
  config.apply_env()?;

  if let Some(port) = &cli.port {
    config.port_name = Some(port.clone());
  }
  if let Some(baud_rate) = cli.baud_rate {
    config.baud_rate = baud_rate;
  }
  if cli.connect {
    config.auto_connect = true;
  }
  config.validate()?;
  Ok(config)
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_logging(cli.log_level);

  if cli.list_ports {
    let devices = SerialInterface::discover_devices()?;
    println!("{}", serde_json::to_string_pretty(&devices)?);
    return Ok(());
  }

  let config = load_config(&cli)?;
  log::debug!("Effective config: {:?}", config);

  let runtime = tokio::runtime::Runtime::new()?;
  let result = runtime.block_on(orientation_bridge_lib::run(config));
  // Blocking stdin reads would otherwise hold the runtime open
  runtime.shutdown_timeout(Duration::from_millis(200));
  result
}
