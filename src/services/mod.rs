// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Service descriptors, lifecycle state, and collaborators

mod command;
mod demo;
mod manager;
mod vibration;

pub use command::CommandService;
pub use demo::DemoService;
pub use manager::ServiceManager;
pub use vibration::{SourceFactory, VibrationMonitor};

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a controllable monitoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    Camera,
    Vibration,
    Frying,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Camera => "camera",
            ServiceId::Vibration => "vibration",
            ServiceId::Frying => "frying",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of a controllable service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceDescriptor {
    pub id: ServiceId,
    pub name: &'static str,
}

/// The declared service set, in display order.
pub const SERVICES: [ServiceDescriptor; 3] = [
    ServiceDescriptor {
        id: ServiceId::Camera,
        name: "Camera Monitoring",
    },
    ServiceDescriptor {
        id: ServiceId::Vibration,
        name: "Vibration Monitoring",
    },
    ServiceDescriptor {
        id: ServiceId::Frying,
        name: "Frying AI Monitoring",
    },
];

/// Lifecycle phase of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicePhase {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

/// Snapshot of one service's lifecycle state.
///
/// Exactly one exists per declared service for the process lifetime,
/// mutated only by the [`ServiceManager`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceState {
    pub id: ServiceId,
    pub name: String,
    pub phase: ServicePhase,
    pub error_message: Option<String>,
    pub last_transition: DateTime<Utc>,
}

/// A collaborator's start or stop action failed.
#[derive(Debug, Clone, Error)]
#[error("service {service} action failed: {message}")]
pub struct ServiceActionError {
    pub service: ServiceId,
    pub message: String,
}

/// Contract implemented by the external collaborators the manager drives
/// (camera monitor, vibration poller, frying collector).
#[async_trait]
pub trait ServiceAction: Send + Sync {
    async fn start(&self) -> anyhow::Result<()>;
    async fn stop(&self) -> anyhow::Result<()>;
}
