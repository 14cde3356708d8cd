// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Service lifecycle manager
//!
//! Owns one [`ServiceState`] per declared service and drives collaborator
//! start/stop actions. Action failures are captured as the `Error` phase
//! with a message, never raised past this boundary, so the scheduler and
//! the status aggregator only ever observe ordinary state values.
//!
//! The state table lock is never held across an action await: a service
//! in `Starting`/`Stopping` marks the in-flight action, and a request for
//! the opposite transition arriving mid-flight is queued and executed once
//! the in-flight action completes, so start and stop never overlap on one
//! collaborator.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{error, info, warn};

use super::{
    ServiceAction, ServiceActionError, ServiceId, ServicePhase, ServiceState, SERVICES,
};

struct Entry {
    state: ServiceState,
    action: Arc<dyn ServiceAction>,
    pending_stop: bool,
    pending_start: bool,
}

/// Centralized service lifecycle management.
pub struct ServiceManager {
    entries: RwLock<BTreeMap<ServiceId, Entry>>,
}

impl ServiceManager {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register the collaborator for a declared service. The service
    /// starts out `Stopped`.
    pub fn register(&self, id: ServiceId, action: Arc<dyn ServiceAction>) {
        let name = SERVICES
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.to_string())
            .unwrap_or_else(|| id.to_string());

        self.entries.write().insert(
            id,
            Entry {
                state: ServiceState {
                    id,
                    name,
                    phase: ServicePhase::Stopped,
                    error_message: None,
                    last_transition: Utc::now(),
                },
                action,
                pending_stop: false,
                pending_start: false,
            },
        );
        info!("Service registered: {}", id);
    }

    fn transition(&self, id: ServiceId, phase: ServicePhase, error_message: Option<String>) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(&id) {
            entry.state.phase = phase;
            entry.state.error_message = error_message;
            entry.state.last_transition = Utc::now();
            if phase == ServicePhase::Error {
                // Error is a settled state; queued intents are discarded
                entry.pending_stop = false;
                entry.pending_start = false;
            }
        }
    }

    fn not_registered(id: ServiceId) -> ServiceActionError {
        ServiceActionError {
            service: id,
            message: "service not registered".into(),
        }
    }

    /// Start a service. No-op success if already `Running` or `Starting`;
    /// a start during `Stopping` is queued until the stop completes;
    /// retry from `Error` is allowed.
    pub async fn start(&self, id: ServiceId) -> Result<(), ServiceActionError> {
        let action = {
            let mut entries = self.entries.write();
            let entry = entries.get_mut(&id).ok_or_else(|| Self::not_registered(id))?;
            match entry.state.phase {
                ServicePhase::Running | ServicePhase::Starting => return Ok(()),
                ServicePhase::Stopping => {
                    entry.pending_start = true;
                    info!("Start queued for {} until stop completes", id);
                    return Ok(());
                }
                ServicePhase::Stopped | ServicePhase::Error => {}
            }
            entry.pending_stop = false;
            entry.state.phase = ServicePhase::Starting;
            entry.state.error_message = None;
            entry.state.last_transition = Utc::now();
            entry.action.clone()
        };

        info!("Starting service: {}", id);
        match action.start().await {
            Ok(()) => {
                let stop_queued = {
                    let mut entries = self.entries.write();
                    match entries.get_mut(&id) {
                        Some(entry) => {
                            entry.state.phase = ServicePhase::Running;
                            entry.state.last_transition = Utc::now();
                            std::mem::take(&mut entry.pending_stop)
                        }
                        None => false,
                    }
                };
                info!("Service started: {}", id);

                if stop_queued {
                    info!("Running queued stop for {}", id);
                    Box::pin(self.stop(id)).await?;
                }
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                error!("Failed to start service {}: {}", id, message);
                self.transition(id, ServicePhase::Error, Some(message.clone()));
                Err(ServiceActionError {
                    service: id,
                    message,
                })
            }
        }
    }

    /// Stop a service. No-op success if already `Stopped` or `Stopping`;
    /// a stop during `Starting` is queued until the start completes.
    pub async fn stop(&self, id: ServiceId) -> Result<(), ServiceActionError> {
        let action = {
            let mut entries = self.entries.write();
            let entry = entries.get_mut(&id).ok_or_else(|| Self::not_registered(id))?;
            match entry.state.phase {
                ServicePhase::Stopped | ServicePhase::Stopping => {
                    // A stop cancels any start queued behind the in-flight stop
                    entry.pending_start = false;
                    return Ok(());
                }
                ServicePhase::Starting => {
                    entry.pending_stop = true;
                    info!("Stop queued for {} until start completes", id);
                    return Ok(());
                }
                ServicePhase::Running | ServicePhase::Error => {}
            }
            entry.state.phase = ServicePhase::Stopping;
            entry.state.last_transition = Utc::now();
            entry.action.clone()
        };

        info!("Stopping service: {}", id);
        match action.stop().await {
            Ok(()) => {
                let start_queued = {
                    let mut entries = self.entries.write();
                    match entries.get_mut(&id) {
                        Some(entry) => {
                            entry.state.phase = ServicePhase::Stopped;
                            entry.state.error_message = None;
                            entry.state.last_transition = Utc::now();
                            std::mem::take(&mut entry.pending_start)
                        }
                        None => false,
                    }
                };
                info!("Service stopped: {}", id);

                if start_queued {
                    info!("Running queued start for {}", id);
                    Box::pin(self.start(id)).await?;
                }
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                error!("Failed to stop service {}: {}", id, message);
                self.transition(id, ServicePhase::Error, Some(message.clone()));
                Err(ServiceActionError {
                    service: id,
                    message,
                })
            }
        }
    }

    /// Record a runtime fault reported by a running collaborator.
    pub fn report_fault(&self, id: ServiceId, message: &str) {
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get_mut(&id) {
            if entry.state.phase == ServicePhase::Running {
                warn!("Runtime fault in {}: {}", id, message);
                entry.state.phase = ServicePhase::Error;
                entry.state.error_message = Some(message.to_string());
                entry.state.last_transition = Utc::now();
            }
        }
    }

    /// Start every registered service; a failure on one does not prevent
    /// attempting the others.
    pub async fn start_all(&self) -> Vec<(ServiceId, Result<(), ServiceActionError>)> {
        info!("Starting all services...");
        let ids: Vec<ServiceId> = self.entries.read().keys().copied().collect();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.start(id).await;
            results.push((id, result));
        }
        results
    }

    /// Stop every registered service, collecting individual results.
    pub async fn stop_all(&self) -> Vec<(ServiceId, Result<(), ServiceActionError>)> {
        info!("Stopping all services...");
        let ids: Vec<ServiceId> = self.entries.read().keys().copied().collect();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.stop(id).await;
            results.push((id, result));
        }
        results
    }

    pub fn state(&self, id: ServiceId) -> Option<ServiceState> {
        self.entries.read().get(&id).map(|e| e.state.clone())
    }

    /// Copies of every service state, in declaration order.
    pub fn all_states(&self) -> Vec<ServiceState> {
        self.entries
            .read()
            .values()
            .map(|e| e.state.clone())
            .collect()
    }

    pub fn any_running(&self) -> bool {
        self.entries
            .read()
            .values()
            .any(|e| e.state.phase == ServicePhase::Running)
    }

    pub fn all_running(&self) -> bool {
        let entries = self.entries.read();
        !entries.is_empty()
            && entries
                .values()
                .all(|e| e.state.phase == ServicePhase::Running)
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}
