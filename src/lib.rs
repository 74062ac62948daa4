pub mod config;
pub mod host;
pub mod sensor;
pub mod serial;
pub mod stream;
pub mod worker;

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::mpsc;

use config::WorkerConfig;
use serial::SerialInterface;
use worker::{SensorWorker, WorkerCommand};

/// Run the bridge on stdin/stdout until input ends or Ctrl-C.
pub async fn run(config: WorkerConfig) -> anyhow::Result<()> {
  config.validate()?;

  let (event_tx, event_rx) = mpsc::unbounded_channel();
  let (command_tx, command_rx) = mpsc::channel(16);

  let connector = Arc::new(SerialInterface::new(config.port_name.clone()));
  let worker = Arc::new(SensorWorker::new(&config, connector, Arc::new(event_tx)));

  let writer = tokio::spawn(host::write_events(event_rx, tokio::io::stdout()));
  let worker_task = {
    let worker = worker.clone();
    tokio::spawn(async move { worker.run(command_rx).await })
  };

  if config.auto_connect {
    command_tx
      .send(WorkerCommand::Connect { baud_rate: Some(config.baud_rate) })
      .await?;
  }

  let mut reader = tokio::spawn(host::read_commands(
    BufReader::new(tokio::io::stdin()),
    command_tx.clone(),
  ));

  log::info!("Orientation bridge started");

  tokio::select! {
    _ = &mut reader => log::info!("Command input closed"),
    res = tokio::signal::ctrl_c() => {
      if let Err(e) = res {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
      }
      log::info!("Interrupted");
      reader.abort();
    }
  }

  // The worker disconnects once every command sender is gone
  drop(command_tx);
  if let Err(e) = worker_task.await {
    log::error!("Worker task failed: {}", e);
  }

  // Last sink reference goes with the worker, which ends the writer
  drop(worker);
  writer.await??;
  Ok(())
}
