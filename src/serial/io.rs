use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::Result;

/// Byte-level access to an open device port.
///
/// The read loop only ever talks to this trait, so a real serial port and an
/// in-memory stream are interchangeable.
#[async_trait]
pub trait SerialPortIO: Send {
    /// Read whatever is available into `buf`. `Ok(0)` means the stream ended.
    async fn read_data(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write and flush `data`.
    async fn send_data(&mut self, data: &[u8]) -> Result<()>;

    /// Close the write side and release the port.
    async fn close(&mut self) -> Result<()>;
}

/// Adapts any tokio byte stream (a `SerialStream`, a duplex pipe) to [`SerialPortIO`].
pub struct StreamPort<T> {
    inner: T,
}

impl<T> StreamPort<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T> SerialPortIO for StreamPort<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.inner.read(buf).await?)
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data).await?;
        self.inner.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.shutdown().await?;
        Ok(())
    }
}

/// A freshly opened port together with the name it was opened under.
pub struct OpenedPort {
    pub port_name: String,
    pub io: Box<dyn SerialPortIO>,
}

/// Opens a device port at a given baud rate.
#[async_trait]
pub trait PortConnector: Send + Sync {
    async fn open(&self, baud_rate: u32) -> Result<OpenedPort>;
}
