#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;

use orientation_bridge_lib::sensor::WorkerEvent;
use orientation_bridge_lib::serial::{OpenedPort, PortConnector, SerialError, SerialPortIO, StreamPort};

pub const TEST_PORT: &str = "/dev/ttyTEST0";

/// Hands out prepared ports in order and records the baud rates asked for.
pub struct ScriptedConnector {
    ports: Mutex<VecDeque<Box<dyn SerialPortIO>>>,
    pub baud_rates: Mutex<Vec<u32>>,
}

impl ScriptedConnector {
    pub fn new(ports: Vec<Box<dyn SerialPortIO>>) -> Self {
        Self { ports: Mutex::new(ports.into()), baud_rates: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl PortConnector for ScriptedConnector {
    async fn open(&self, baud_rate: u32) -> Result<OpenedPort, SerialError> {
        self.baud_rates.lock().unwrap().push(baud_rate);
        let io = self.ports.lock().unwrap().pop_front().ok_or(SerialError::NoPortsAvailable)?;
        Ok(OpenedPort { port_name: TEST_PORT.to_string(), io })
    }
}

/// Wraps a port and records whether it was closed
pub struct TrackedPort<P> {
    inner: P,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl<P: SerialPortIO> SerialPortIO for TrackedPort<P> {
    async fn read_data(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        self.inner.read_data(buf).await
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.inner.send_data(data).await
    }

    async fn close(&mut self) -> Result<(), SerialError> {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.close().await
    }
}

/// Port whose reads and close both fail
pub struct FailingPort {
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl SerialPortIO for FailingPort {
    async fn read_data(&mut self, _buf: &mut [u8]) -> Result<usize, SerialError> {
        Err(SerialError::IoError(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "device unplugged")))
    }

    async fn send_data(&mut self, _data: &[u8]) -> Result<(), SerialError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SerialError> {
        self.closed.store(true, Ordering::SeqCst);
        Err(SerialError::ConnectionFailed("already gone".to_string()))
    }
}

/// A device end to write to, and the tracked port the worker will read from.
pub fn duplex_port() -> (DuplexStream, Box<dyn SerialPortIO>, Arc<AtomicBool>) {
    let (device, host) = tokio::io::duplex(256);
    let closed = Arc::new(AtomicBool::new(false));
    let port = TrackedPort { inner: StreamPort::new(host), closed: closed.clone() };
    (device, Box::new(port), closed)
}

pub fn failing_port() -> (Box<dyn SerialPortIO>, Arc<AtomicBool>) {
    let closed = Arc::new(AtomicBool::new(false));
    (Box::new(FailingPort { closed: closed.clone() }), closed)
}

pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<WorkerEvent>) -> WorkerEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

pub fn data_read(event: WorkerEvent) -> orientation_bridge_lib::sensor::SensorSnapshot {
    match event {
        WorkerEvent::DataRead(snapshot) => snapshot,
        other => panic!("expected DATA_READ, got {:?}", other),
    }
}
