// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyzer::AlertThresholds;
use crate::transport::ProtocolKind;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level
    pub log_level: String,

    /// Enable demo mode (simulated sensor)
    pub demo_mode: bool,

    /// Sensor transport configuration
    pub sensor: SensorConfig,

    /// Vibration analysis configuration
    pub analyzer: AnalyzerConfig,

    /// Work-hours schedule configuration
    pub schedule: ScheduleConfig,

    /// Collaborator service commands
    pub services: ServicesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo_mode: false,
            sensor: SensorConfig::default(),
            analyzer: AnalyzerConfig::default(),
            schedule: ScheduleConfig::default(),
            services: ServicesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("frymon"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// RS485 sensor transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Serial device path
    pub port: String,

    /// Baud rate (8N1 framing)
    pub baudrate: u32,

    /// Wire protocol
    pub protocol: ProtocolKind,

    /// Modbus slave address
    pub slave_address: u8,

    /// Serial read timeout in milliseconds
    pub timeout_ms: u64,

    /// Timeout retries per poll (other errors are not retried)
    pub read_retries: u32,

    /// Backoff between retries, multiplied by the attempt number
    pub retry_backoff_ms: u64,

    /// Consecutive failures before the link is declared lost
    pub max_consecutive_failures: u32,

    /// Whether dropped (undecodable) samples count toward the
    /// consecutive-failure threshold
    pub count_decode_failures: bool,

    /// Poll rate in Hz
    pub sample_rate_hz: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baudrate: 9600,
            protocol: ProtocolKind::Modbus,
            slave_address: 1,
            timeout_ms: 1000,
            read_retries: 3,
            retry_backoff_ms: 50,
            max_consecutive_failures: 10,
            count_decode_failures: true,
            sample_rate_hz: 10.0,
        }
    }
}

/// Vibration analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Rolling window capacity in samples
    pub window_size: usize,

    /// Severity thresholds in m/s²
    pub thresholds: AlertThresholds,

    /// Dead band for trend classification in m/s²
    pub trend_deadband: f64,

    /// Minimum samples before a trend is reported
    pub min_trend_samples: usize,

    /// Retained alert history length
    pub alert_history: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            thresholds: AlertThresholds::default(),
            trend_deadband: 0.5,
            min_trend_samples: 9,
            alert_history: 10,
        }
    }
}

/// Work-hours schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Window start, HH:MM
    pub start: String,

    /// Window end, HH:MM (must be after start on the same day)
    pub end: String,

    /// Enabled weekdays, 0 = Monday .. 6 = Sunday
    pub enabled_days: Vec<u8>,

    /// Seconds between scheduler ticks
    pub tick_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start: "08:30".to_string(),
            end: "19:00".to_string(),
            enabled_days: vec![0, 1, 2, 3, 4],
            tick_secs: 30,
        }
    }
}

/// Shell commands driving an external collaborator process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Command run on service start
    pub start: String,

    /// Command run on service stop; omit for a no-op stop
    pub stop: Option<String>,
}

/// Collaborator service commands; unset entries run as demo stubs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub camera: Option<CommandConfig>,
    pub frying: Option<CommandConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sensor.port, "/dev/ttyUSB0");
        assert_eq!(config.sensor.baudrate, 9600);
        assert_eq!(config.analyzer.window_size, 100);
        assert_eq!(config.schedule.start, "08:30");
        assert!(config.services.camera.is_none());
        assert!(!config.demo_mode);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.demo_mode = true;
        config.sensor.slave_address = 7;
        config.services.camera = Some(CommandConfig {
            start: "systemctl start camera".into(),
            stop: Some("systemctl stop camera".into()),
        });
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(loaded.demo_mode);
        assert_eq!(loaded.sensor.slave_address, 7);
        assert_eq!(
            loaded.services.camera.unwrap().start,
            "systemctl start camera"
        );
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.sensor.port, "/dev/ttyUSB0");

        // Second call loads the file it just wrote
        let again = Config::load_or_create(&path).unwrap();
        assert_eq!(again.schedule.tick_secs, 30);
    }

    #[test]
    fn test_partial_toml_is_rejected_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = 42").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
