// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! frymon - Frying-Rig Monitoring Core
//!
//! Headless monitoring daemon for a Jetson-based frying rig:
//! - RS485/Modbus vibration sensor transport (RTU and ASCII framing)
//! - Rolling-window vibration analysis with edge-triggered severity alerts
//! - Lifecycle management for the camera, vibration, and frying services
//! - Work-hours scheduler that starts and stops services level-triggered
//! - Aggregated status snapshots for downstream consumers
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      frymon Engine                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────┐   ┌───────────────────┐    │
//! │  │ Transport │ → │ Analyzer │   │  Work Scheduler   │    │
//! │  │  (RS485)  │   │ (window) │   │  (level ticks)    │    │
//! │  └───────────┘   └──────────┘   └───────────────────┘    │
//! │        ↓              ↓                  ↓               │
//! │  ┌──────────────────────────────────────────────────┐    │
//! │  │                Service Manager                   │    │
//! │  └──────────────────────────────────────────────────┘    │
//! │                         ↓                                │
//! │  ┌──────────────────────────────────────────────────┐    │
//! │  │               Status Aggregator                  │    │
//! │  └──────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod analyzer;
pub mod config;
pub mod core;
pub mod scheduler;
pub mod services;
pub mod status;
pub mod transport;

// Re-exports for convenience
pub use analyzer::{Alert, Severity, Statistics, Trend, VibrationAnalyzer, VibrationView};
pub use config::Config;
pub use core::Engine;
pub use scheduler::{WorkSchedule, WorkScheduler};
pub use services::{ServiceId, ServiceManager, ServicePhase, ServiceState};
pub use status::{StatusAggregator, SystemStatusSnapshot};
pub use transport::{SensorClient, SensorReading, SensorSimulator, VibrationSource};

/// frymon version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// frymon name
pub const NAME: &str = "frymon";
