// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Main monitoring engine
//!
//! Owns subsystem construction and lifetime: builds the analyzer, registers
//! the three services with the manager, forwards sensor runtime faults into
//! the service manager, and runs the work-hours scheduler until shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::analyzer::VibrationAnalyzer;
use crate::config::Config;
use crate::scheduler::{WorkSchedule, WorkScheduler};
use crate::services::{
    CommandService, DemoService, ServiceId, ServiceManager, SourceFactory, VibrationMonitor,
    SERVICES,
};
use crate::status::StatusAggregator;
use crate::transport::{SensorClient, SensorSimulator, VibrationSource};

pub struct Engine {
    pub config: Arc<Config>,
    analyzer: Arc<VibrationAnalyzer>,
    manager: Arc<ServiceManager>,
    scheduler: Arc<WorkScheduler>,
    status: Arc<StatusAggregator>,
    shutdown_tx: broadcast::Sender<()>,
    fault_rx: Option<mpsc::UnboundedReceiver<String>>,
    tasks: Vec<JoinHandle<()>>,
}

fn source_factory(config: &Config) -> SourceFactory {
    if config.demo_mode {
        Box::new(|| {
            let source: Box<dyn VibrationSource> = Box::new(SensorSimulator::new());
            Ok(source)
        })
    } else {
        let cfg = config.sensor.clone();
        Box::new(move || {
            let source: Box<dyn VibrationSource> = Box::new(SensorClient::connect(&cfg)?);
            Ok(source)
        })
    }
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        let schedule = WorkSchedule::new(
            &config.schedule.start,
            &config.schedule.end,
            &config.schedule.enabled_days,
        )
        .context("invalid work schedule in configuration")?;

        let analyzer = Arc::new(VibrationAnalyzer::new(config.analyzer.clone()));
        let manager = Arc::new(ServiceManager::new());
        let (fault_tx, fault_rx) = mpsc::unbounded_channel();

        for descriptor in SERVICES {
            match descriptor.id {
                ServiceId::Vibration => {
                    manager.register(
                        descriptor.id,
                        Arc::new(VibrationMonitor::new(
                            config.sensor.clone(),
                            analyzer.clone(),
                            source_factory(&config),
                            fault_tx.clone(),
                        )),
                    );
                }
                ServiceId::Camera => {
                    manager.register(descriptor.id, command_or_demo(descriptor.name, config.services.camera.as_ref()));
                }
                ServiceId::Frying => {
                    manager.register(descriptor.id, command_or_demo(descriptor.name, config.services.frying.as_ref()));
                }
            }
        }

        let scheduler = Arc::new(WorkScheduler::new(
            schedule,
            manager.clone(),
            config.schedule.tick_secs,
        ));
        let status = Arc::new(StatusAggregator::new(
            manager.clone(),
            scheduler.clone(),
            analyzer.clone(),
        ));
        let (shutdown_tx, _) = broadcast::channel(4);

        Ok(Self {
            config: Arc::new(config),
            analyzer,
            manager,
            scheduler,
            status,
            shutdown_tx,
            fault_rx: Some(fault_rx),
            tasks: Vec::new(),
        })
    }

    /// Start background loops. Services themselves remain stopped until
    /// the scheduler or a manual call starts them.
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting monitoring engine");

        let mut fault_rx = self
            .fault_rx
            .take()
            .context("engine already started")?;
        let manager = self.manager.clone();
        let mut shutdown = self.shutdown_tx.subscribe();
        self.tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.recv() => break,
                    fault = fault_rx.recv() => {
                        let Some(message) = fault else { break };
                        warn!("vibration service fault: {}", message);
                        manager.report_fault(ServiceId::Vibration, &message);
                    }
                }
            }
        }));

        self.tasks.push(tokio::spawn(
            self.scheduler.clone().run(self.shutdown_tx.subscribe()),
        ));

        self.status.mark_initialized();
        info!("Monitoring engine started");
        Ok(())
    }

    /// Stop background loops and all services.
    pub async fn shutdown(&mut self) {
        info!("Shutting down monitoring engine");
        let _ = self.shutdown_tx.send(());

        for (id, result) in self.manager.stop_all().await {
            if let Err(e) = result {
                warn!("shutdown stop of {} failed: {}", id, e);
            }
        }

        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!("Monitoring engine stopped");
    }

    pub fn analyzer(&self) -> Arc<VibrationAnalyzer> {
        self.analyzer.clone()
    }

    pub fn manager(&self) -> Arc<ServiceManager> {
        self.manager.clone()
    }

    pub fn scheduler(&self) -> Arc<WorkScheduler> {
        self.scheduler.clone()
    }

    pub fn status(&self) -> Arc<StatusAggregator> {
        self.status.clone()
    }
}

fn command_or_demo(
    name: &str,
    cfg: Option<&crate::config::CommandConfig>,
) -> Arc<dyn crate::services::ServiceAction> {
    match cfg {
        Some(command) => Arc::new(CommandService::new(name, command)),
        None => Arc::new(DemoService::new(name)),
    }
}
