use async_trait::async_trait;
use serialport::{SerialPortInfo, SerialPortType};
use tokio_serial::SerialPortBuilderExt;

use super::io::{OpenedPort, PortConnector, StreamPort};
use super::{Result, SerialDeviceInfo, SerialError};

/// micro:bit orientation sketches print at this rate unless told otherwise.
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Serial port discovery and opening for the sensor device.
pub struct SerialInterface {
    port_name: Option<String>,
}

impl SerialInterface {
    /// Use `port_name` when given, otherwise the first enumerated port.
    pub fn new(port_name: Option<String>) -> Self {
        Self { port_name }
    }

    /// List every serial port the OS reports
    pub fn discover_devices() -> Result<Vec<SerialDeviceInfo>> {
        let ports = serialport::available_ports()?;
        Ok(ports.iter().map(device_info_from_port).collect())
    }

    /// Resolve the port this interface will open.
    pub fn select_port(&self) -> Result<SerialDeviceInfo> {
        let devices = Self::discover_devices()?;
        select_from(devices, self.port_name.as_deref())
    }
}

impl Default for SerialInterface {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl PortConnector for SerialInterface {
    async fn open(&self, baud_rate: u32) -> Result<OpenedPort> {
        let device = self.select_port()?;

        let stream = tokio_serial::new(device.port_name.as_str(), baud_rate)
            .open_native_async()
            .map_err(|e| SerialError::ConnectionFailed(format!("{}: {}", device.port_name, e)))?;

        log::info!(
            "Opened serial port {} at {} baud ({:04X}:{:04X})",
            device.port_name,
            baud_rate,
            device.vid,
            device.pid
        );

        Ok(OpenedPort {
            port_name: device.port_name,
            io: Box::new(StreamPort::new(stream)),
        })
    }
}

fn device_info_from_port(port: &SerialPortInfo) -> SerialDeviceInfo {
    match &port.port_type {
        SerialPortType::UsbPort(usb_info) => SerialDeviceInfo {
            port_name: port.port_name.clone(),
            vid: usb_info.vid,
            pid: usb_info.pid,
            serial_number: usb_info.serial_number.clone(),
            manufacturer: usb_info.manufacturer.clone(),
            product: usb_info.product.clone(),
        },
        _ => SerialDeviceInfo {
            port_name: port.port_name.clone(),
            vid: 0,
            pid: 0,
            serial_number: None,
            manufacturer: None,
            product: None,
        },
    }
}

/// Pick the requested port by name, or the first one when none is requested.
pub fn select_from(devices: Vec<SerialDeviceInfo>, requested: Option<&str>) -> Result<SerialDeviceInfo> {
    match requested {
        Some(name) => devices
            .into_iter()
            .find(|d| d.port_name == name)
            .ok_or_else(|| SerialError::PortNotFound(name.to_string())),
        None => devices.into_iter().next().ok_or(SerialError::NoPortsAvailable),
    }
}
