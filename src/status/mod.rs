// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! System status aggregation
//!
//! Pulls one snapshot from each subsystem and composes them into a single
//! serializable view. Each subsystem snapshot is internally consistent;
//! the composition makes no atomicity claim across subsystems.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;

use crate::analyzer::{VibrationAnalyzer, VibrationView};
use crate::scheduler::{SchedulerStatus, WorkScheduler};
use crate::services::{ServiceManager, ServiceState};

/// One full snapshot of the rig, safe to serialize for any consumer.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatusSnapshot {
    /// Whether the engine finished wiring all subsystems
    pub initialized: bool,
    pub timestamp: DateTime<Utc>,
    pub services: Vec<ServiceState>,
    pub scheduler: SchedulerStatus,
    pub vibration: VibrationView,
}

impl SystemStatusSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct StatusAggregator {
    manager: Arc<ServiceManager>,
    scheduler: Arc<WorkScheduler>,
    analyzer: Arc<VibrationAnalyzer>,
    initialized: AtomicBool,
}

impl StatusAggregator {
    pub fn new(
        manager: Arc<ServiceManager>,
        scheduler: Arc<WorkScheduler>,
        analyzer: Arc<VibrationAnalyzer>,
    ) -> Self {
        Self {
            manager,
            scheduler,
            analyzer,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Relaxed);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Snapshot at an explicit local time, for deterministic callers.
    pub fn snapshot_at(&self, now: NaiveDateTime) -> SystemStatusSnapshot {
        SystemStatusSnapshot {
            initialized: self.is_initialized(),
            timestamp: Utc::now(),
            services: self.manager.all_states(),
            scheduler: self.scheduler.status(now),
            vibration: self.analyzer.view(),
        }
    }

    pub fn snapshot(&self) -> SystemStatusSnapshot {
        self.snapshot_at(Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::scheduler::WorkSchedule;
    use crate::services::{ServiceAction, ServiceId, ServicePhase, SERVICES};
    use crate::transport::SensorReading;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct NoopAction;

    #[async_trait]
    impl ServiceAction for NoopAction {
        async fn start(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn aggregator() -> (StatusAggregator, Arc<ServiceManager>, Arc<VibrationAnalyzer>) {
        let manager = Arc::new(ServiceManager::new());
        for descriptor in SERVICES {
            manager.register(descriptor.id, Arc::new(NoopAction));
        }
        let analyzer = Arc::new(VibrationAnalyzer::new(AnalyzerConfig::default()));
        let scheduler = Arc::new(WorkScheduler::new(
            WorkSchedule::default(),
            manager.clone(),
            30,
        ));
        (
            StatusAggregator::new(manager.clone(), scheduler, analyzer.clone()),
            manager,
            analyzer,
        )
    }

    #[tokio::test]
    async fn test_snapshot_reflects_subsystems() {
        let (aggregator, manager, analyzer) = aggregator();
        let monday_noon = NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let before = aggregator.snapshot_at(monday_noon);
        assert!(!before.initialized);
        assert_eq!(before.services.len(), 3);
        assert!(before
            .services
            .iter()
            .all(|s| s.phase == ServicePhase::Stopped));
        assert!(before.scheduler.is_work_time);
        assert!(before.vibration.latest_reading.is_none());

        aggregator.mark_initialized();
        manager.start(ServiceId::Vibration).await.unwrap();
        analyzer.ingest(SensorReading::new(1.0, 2.0, 2.0));

        let after = aggregator.snapshot_at(monday_noon);
        assert!(after.initialized);
        assert!(after
            .services
            .iter()
            .any(|s| s.phase == ServicePhase::Running));
        assert_eq!(
            after.vibration.latest_reading.unwrap().magnitude,
            3.0
        );
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let (aggregator, _manager, _analyzer) = aggregator();
        let json = aggregator.snapshot().to_json().unwrap();
        assert!(json.contains("\"initialized\""));
        assert!(json.contains("\"scheduler\""));
        assert!(json.contains("\"vibration\""));
    }
}
