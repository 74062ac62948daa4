//! JSON-lines bridge between the worker and the host process.
//!
//! Commands arrive one JSON object per line, events leave the same way.
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::sensor::WorkerEvent;
use crate::worker::WorkerCommand;

/// Forward commands read from `reader` until EOF or until the worker goes away.
/// Blank lines are skipped, malformed ones logged and skipped.
pub async fn read_commands<R>(reader: R, tx: mpsc::Sender<WorkerCommand>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<WorkerCommand>(line) {
                    Ok(command) => {
                        if tx.send(command).await.is_err() {
                            log::debug!("Worker gone, no longer reading commands");
                            break;
                        }
                    }
                    Err(e) => log::warn!("Ignoring malformed command {:?}: {}", line, e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read command input: {}", e);
                break;
            }
        }
    }
}

/// Write each event as one JSON line, flushing after every event
pub async fn write_events<W>(mut rx: mpsc::UnboundedReceiver<WorkerEvent>, mut writer: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = rx.recv().await {
        let mut json = serde_json::to_string(&event)?;
        json.push('\n');
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
