// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Sensor transport - RS485 link handling and frame decoding

mod client;
mod frame;
mod simulator;

pub use client::{SensorClient, SerialLink, SerialPortLink};
pub use frame::{
    build_ascii_request, build_rtu_request, crc16, decode_registers_f32, lrc, parse_ascii_response,
    parse_rtu_response,
};
pub use simulator::SensorSimulator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire protocol spoken by the vibration sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    /// Modbus RTU: binary frames with CRC-16 check
    Modbus,
    /// Modbus ASCII: colon-framed hex with LRC checksum
    Ascii,
}

/// Transport-level errors.
///
/// Decode and timeout errors are absorbed by the polling loop (dropped
/// sample, bounded retry) and never propagate past the transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Device absent or the link could not be claimed
    #[error("connection error: {0}")]
    Connection(String),

    /// No response within the configured I/O timeout
    #[error("read timed out")]
    Timeout,

    /// Malformed frame (checksum mismatch, short read, bad framing)
    #[error("decode error: {0}")]
    Decode(String),
}

/// A single vibration sensor reading.
///
/// Immutable value produced by the transport; consumed by the analyzer and
/// discarded once it leaves the analysis window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    /// X-axis acceleration in m/s²
    pub x_axis: f64,
    /// Y-axis acceleration in m/s²
    pub y_axis: f64,
    /// Z-axis acceleration in m/s²
    pub z_axis: f64,
    /// Euclidean norm of the three axes
    pub magnitude: f64,
    /// Sensor temperature in °C, if the sensor reports it
    pub temperature: Option<f64>,
    /// Dominant vibration frequency in Hz, if the sensor reports it
    pub frequency: Option<f64>,
}

impl SensorReading {
    pub fn new(x_axis: f64, y_axis: f64, z_axis: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            x_axis,
            y_axis,
            z_axis,
            magnitude: (x_axis * x_axis + y_axis * y_axis + z_axis * z_axis).sqrt(),
            temperature: None,
            frequency: None,
        }
    }

    pub fn with_extras(mut self, temperature: Option<f64>, frequency: Option<f64>) -> Self {
        self.temperature = temperature;
        self.frequency = frequency;
        self
    }
}

/// A source of vibration readings.
///
/// Implemented by [`SensorClient`] for real RS485 hardware and by
/// [`SensorSimulator`] for demo mode and tests. The poll loop owns the
/// source; `read` blocks at most for the configured I/O timeout.
pub trait VibrationSource: Send {
    /// Produce one reading per successful poll.
    fn read(&mut self) -> Result<SensorReading, TransportError>;

    /// Whether the underlying link is currently open.
    fn is_connected(&self) -> bool;

    /// Release the underlying handle; idempotent.
    fn disconnect(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_is_euclidean_norm() {
        let reading = SensorReading::new(3.0, 4.0, 0.0);
        assert!((reading.magnitude - 5.0).abs() < 1e-12);

        let reading = SensorReading::new(1.0, 2.0, 2.0);
        assert!((reading.magnitude - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_extras_are_optional() {
        let reading = SensorReading::new(0.1, 0.1, 9.8);
        assert!(reading.temperature.is_none());
        assert!(reading.frequency.is_none());

        let reading = reading.with_extras(Some(41.5), Some(120.0));
        assert_eq!(reading.temperature, Some(41.5));
        assert_eq!(reading.frequency, Some(120.0));
    }
}
