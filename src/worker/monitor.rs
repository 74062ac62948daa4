use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

use super::sink::{emit_event, EventSink};
use super::{Result, WorkerCommand, WorkerError};
use crate::config::WorkerConfig;
use crate::sensor::{ReadingClassifier, SessionStats, WorkerEvent};
use crate::serial::{PortConnector, SerialPortIO};
use crate::stream::{LineFramer, TextDecoder};

/// Owns the device connection and its read loop.
///
/// At most one session runs at a time. Sensor state lives inside the session,
/// so every connection starts from default readings.
pub struct SensorWorker {
    connector: Arc<dyn PortConnector>,
    sink: Arc<dyn EventSink>,
    default_baud_rate: u32,
    read_buffer_size: usize,
    stop_timeout: Duration,
    session: Mutex<Option<ReadSession>>,
}

/// One open connection
struct ReadSession {
    port_name: String,
    task_handle: JoinHandle<SessionStats>,
    stop_tx: mpsc::Sender<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Stopped,
    StreamClosed,
    ReadFailed,
}

impl SensorWorker {
    pub fn new(config: &WorkerConfig, connector: Arc<dyn PortConnector>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            connector,
            sink,
            default_baud_rate: config.baud_rate,
            read_buffer_size: config.read_buffer_size.max(1),
            stop_timeout: Duration::from_millis(config.stop_timeout_ms),
            session: Mutex::new(None),
        }
    }

    /// Open the device and start streaming readings to the sink
    pub async fn start(&self, baud_rate: u32) -> Result<()> {
        let mut session = self.session.lock().await;

        if let Some(existing) = session.as_ref() {
            if !existing.task_handle.is_finished() {
                log::warn!("Connect requested while {} is still open", existing.port_name);
                return Err(WorkerError::AlreadyConnected);
            }
            // Read loop already tore itself down after an error or stream end
            log::debug!("Clearing finished session on {}", existing.port_name);
            *session = None;
        }

        let opened = self.connector.open(baud_rate).await?;
        let port_name = opened.port_name;

        emit_event(
            self.sink.as_ref(),
            WorkerEvent::Connected {
                port_name: port_name.clone(),
                baud_rate,
                connected_at: chrono::Utc::now(),
            },
        );

        let (stop_tx, stop_rx) = mpsc::channel(1);
        let task_handle = tokio::spawn(read_loop(
            opened.io,
            self.sink.clone(),
            stop_rx,
            self.read_buffer_size,
            port_name.clone(),
        ));

        log::info!("Connected to sensor on {} at {} baud", port_name, baud_rate);
        *session = Some(ReadSession {
            port_name,
            task_handle,
            stop_tx,
        });
        Ok(())
    }

    /// Stop the read loop and release the port. Returns the session's stats,
    /// or `None` if nothing was running or the loop did not finish in time.
    pub async fn stop(&self) -> Option<SessionStats> {
        let session = {
            let mut session = self.session.lock().await;
            session.take()
        };

        let Some(session) = session else {
            log::debug!("Disconnect requested with no open session");
            return None;
        };

        // Fails only if the loop has already exited
        let _ = session.stop_tx.send(()).await;

        let abort_handle = session.task_handle.abort_handle();
        match timeout(self.stop_timeout, session.task_handle).await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(e)) => {
                log::error!("Read task for {} failed: {}", session.port_name, e);
                None
            }
            Err(_) => {
                log::warn!(
                    "Read task for {} did not stop within {:?}, aborting",
                    session.port_name,
                    self.stop_timeout
                );
                abort_handle.abort();
                None
            }
        }
    }

    /// True while a read loop is running
    pub async fn is_connected(&self) -> bool {
        let session = self.session.lock().await;
        session.as_ref().map_or(false, |s| !s.task_handle.is_finished())
    }

    pub async fn handle_command(&self, command: WorkerCommand) -> Result<()> {
        match command {
            WorkerCommand::Connect { baud_rate } => {
                self.start(baud_rate.unwrap_or(self.default_baud_rate)).await
            }
            WorkerCommand::Disconnect => {
                self.stop().await;
                Ok(())
            }
        }
    }

    /// Serve the control channel until every sender is gone, then disconnect.
    pub async fn run(&self, mut commands: mpsc::Receiver<WorkerCommand>) {
        while let Some(command) = commands.recv().await {
            log::debug!("Worker command: {:?}", command);
            if let Err(e) = self.handle_command(command).await {
                log::error!("Command failed: {}", e);
            }
        }
        log::info!("Control channel closed, shutting down worker");
        self.stop().await;
    }
}

async fn read_chunk(io: &mut dyn SerialPortIO, size: usize) -> crate::serial::Result<Vec<u8>> {
    let mut buf = vec![0u8; size];
    let n = io.read_data(&mut buf).await?;
    buf.truncate(n);
    Ok(buf)
}

/// Decode, frame and classify everything the port produces until stopped,
/// the stream ends, or a read fails. Always closes the port before returning.
pub(crate) async fn read_loop(
    mut io: Box<dyn SerialPortIO>,
    sink: Arc<dyn EventSink>,
    mut stop_rx: mpsc::Receiver<()>,
    read_buffer_size: usize,
    port_name: String,
) -> SessionStats {
    let start_time = Instant::now();
    let mut decoder = TextDecoder::new();
    let mut framer = LineFramer::new();
    let mut classifier = ReadingClassifier::new();
    let mut stats = SessionStats::default();

    log::info!("Starting sensor read loop on {}", port_name);

    let end = loop {
        tokio::select! {
            // A dropped sender counts as a stop request too
            _ = stop_rx.recv() => {
                break SessionEnd::Stopped;
            }

            read_res = read_chunk(io.as_mut(), read_buffer_size) => {
                match read_res {
                    Ok(bytes) if bytes.is_empty() => {
                        break SessionEnd::StreamClosed;
                    }
                    Ok(bytes) => {
                        stats.bytes_read += bytes.len() as u64;
                        let text = decoder.decode(&bytes);
                        for line in framer.push(&text) {
                            dispatch_line(&line, &mut classifier, sink.as_ref(), &mut stats);
                        }
                    }
                    Err(e) => {
                        log::error!("Error reading from {}: {}", port_name, e);
                        break SessionEnd::ReadFailed;
                    }
                }
            }
        }
    };

    if end == SessionEnd::StreamClosed {
        let tail = decoder.finish();
        for line in framer.push(&tail) {
            dispatch_line(&line, &mut classifier, sink.as_ref(), &mut stats);
        }
        let last = framer.finish();
        dispatch_line(&last, &mut classifier, sink.as_ref(), &mut stats);
    }

    // Best-effort teardown, errors here must not stop the rest of it
    if let Err(e) = io.close().await {
        log::warn!("Failed to close {}: {}", port_name, e);
    }
    drop(io);

    stats.decode_errors = decoder.decode_errors();
    log::info!(
        "Stopped reading {} ({:?}, ran for {:?}): {} lines, {} readings, {} ignored, {} decode errors",
        port_name,
        end,
        start_time.elapsed(),
        stats.lines_read,
        stats.readings,
        stats.ignored_lines,
        stats.decode_errors
    );
    stats
}

fn dispatch_line(
    line: &str,
    classifier: &mut ReadingClassifier,
    sink: &dyn EventSink,
    stats: &mut SessionStats,
) {
    stats.lines_read += 1;

    let events = classifier.process_line(line);
    if events.is_empty() {
        stats.ignored_lines += 1;
        log::trace!("Ignoring line: {:?}", line);
        return;
    }

    stats.readings += 1;
    for event in events {
        emit_event(sink, event);
    }
}
