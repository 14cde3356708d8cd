// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! RS485 sensor client
//!
//! Owns the serial link and produces one [`SensorReading`] per successful
//! poll. Retry policy lives in the caller (the vibration poll loop); this
//! layer only reports connection, timeout, and decode errors.

use std::io::{Read, Write};
use std::time::Duration;

use tracing::{debug, info};

use super::frame::{
    build_ascii_request, build_rtu_request, decode_registers_f32, parse_ascii_response,
    parse_rtu_response, REG_ACCEL, REG_ACCEL_COUNT, REG_F32_COUNT, REG_FREQUENCY, REG_TEMPERATURE,
};
use super::{ProtocolKind, SensorReading, TransportError, VibrationSource};
use crate::config::SensorConfig;

/// Byte-level serial I/O with a bounded read timeout.
///
/// Production code wraps a [`serialport`] handle; tests use an in-memory
/// fake.
pub trait SerialLink: Send {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError>;

    /// Read exactly `buf.len()` bytes or fail with `Timeout`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Read up to and including a LF byte, bounded by `max_len`.
    fn read_line(&mut self, max_len: usize) -> Result<Vec<u8>, TransportError>;

    /// Discard any stale bytes in the input buffer.
    fn clear_input(&mut self) -> Result<(), TransportError>;
}

/// [`SerialLink`] backed by a real serial port.
pub struct SerialPortLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialPortLink {
    pub fn open(path: &str, baudrate: u32, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baudrate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(timeout)
            .open()
            .map_err(|e| TransportError::Connection(format!("{}: {}", path, e)))?;
        Ok(Self { port })
    }
}

fn map_io(err: std::io::Error) -> TransportError {
    if err.kind() == std::io::ErrorKind::TimedOut {
        TransportError::Timeout
    } else {
        TransportError::Connection(err.to_string())
    }
}

impl SerialLink for SerialPortLink {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(buf).map_err(map_io)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.port.read_exact(buf).map_err(map_io)
    }

    fn read_line(&mut self, max_len: usize) -> Result<Vec<u8>, TransportError> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        while line.len() < max_len {
            self.port.read_exact(&mut byte).map_err(map_io)?;
            line.push(byte[0]);
            if byte[0] == b'\n' {
                break;
            }
        }
        Ok(line)
    }

    fn clear_input(&mut self) -> Result<(), TransportError> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| TransportError::Connection(e.to_string()))
    }
}

/// Modbus client for an RS485 vibration sensor.
pub struct SensorClient {
    link: Option<Box<dyn SerialLink>>,
    protocol: ProtocolKind,
    slave: u8,
}

impl SensorClient {
    /// Open the serial link described by the sensor configuration.
    ///
    /// Fails with [`TransportError::Connection`] if the device path is
    /// absent or the link cannot be claimed.
    pub fn connect(cfg: &SensorConfig) -> Result<Self, TransportError> {
        let link = SerialPortLink::open(
            &cfg.port,
            cfg.baudrate,
            Duration::from_millis(cfg.timeout_ms),
        )?;
        info!(
            "Connected to RS485 sensor on {} @ {} baud ({:?})",
            cfg.port, cfg.baudrate, cfg.protocol
        );
        Ok(Self {
            link: Some(Box::new(link)),
            protocol: cfg.protocol,
            slave: cfg.slave_address,
        })
    }

    /// Build a client over an already-open link. Used by tests.
    pub fn with_link(link: Box<dyn SerialLink>, protocol: ProtocolKind, slave: u8) -> Self {
        Self {
            link: Some(link),
            protocol,
            slave,
        }
    }

    fn read_registers(&mut self, start: u16, count: u16) -> Result<Vec<u8>, TransportError> {
        let slave = self.slave;
        let protocol = self.protocol;
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| TransportError::Connection("link not open".into()))?;

        match protocol {
            ProtocolKind::Modbus => {
                link.clear_input()?;
                link.write_all(&build_rtu_request(slave, start, count))?;
                let mut response = vec![0u8; 5 + count as usize * 2];
                link.read_exact(&mut response)?;
                parse_rtu_response(slave, count, &response)
            }
            ProtocolKind::Ascii => {
                link.clear_input()?;
                link.write_all(&build_ascii_request(slave, start, count))?;
                let response = link.read_line(512)?;
                parse_ascii_response(slave, count, &response)
            }
        }
    }

    fn read_f32(&mut self, start: u16) -> Result<f64, TransportError> {
        let data = self.read_registers(start, REG_F32_COUNT)?;
        let values = decode_registers_f32(&data)?;
        Ok(values[0] as f64)
    }
}

impl VibrationSource for SensorClient {
    fn read(&mut self) -> Result<SensorReading, TransportError> {
        let data = self.read_registers(REG_ACCEL, REG_ACCEL_COUNT)?;
        let axes = decode_registers_f32(&data)?;
        if axes.len() < 3 {
            return Err(TransportError::Decode(format!(
                "expected 3 axis values, got {}",
                axes.len()
            )));
        }

        // Temperature and frequency registers are optional extras; a sensor
        // that does not implement them must not fail the whole poll.
        let temperature = self.read_f32(REG_TEMPERATURE).ok();
        let frequency = self.read_f32(REG_FREQUENCY).ok();
        if temperature.is_none() {
            debug!("temperature register unavailable");
        }

        Ok(
            SensorReading::new(axes[0] as f64, axes[1] as f64, axes[2] as f64)
                .with_extras(temperature, frequency),
        )
    }

    fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    fn disconnect(&mut self) {
        if self.link.take().is_some() {
            info!("RS485 sensor connection closed");
        }
    }
}
