// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Work-hours scheduler
//!
//! Level-triggered: every tick compares wall-clock time against the work
//! window and drives the service manager toward the matching state. Missed
//! ticks need no catch-up; the next tick observes the current time and
//! converges. A manual override makes ticks inert until released.

pub mod schedule;

pub use schedule::{ScheduleError, ScheduleView, WorkSchedule};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::services::ServiceManager;

/// Serializable scheduler state for status snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub is_work_time: bool,
    pub manual_override: bool,
    pub schedule: ScheduleView,
    pub minutes_until_next_event: Option<i64>,
}

pub struct WorkScheduler {
    schedule: RwLock<WorkSchedule>,
    manager: Arc<ServiceManager>,
    manual_override: AtomicBool,
    running: AtomicBool,
    // Serializes tick bodies; an overlapping tick is skipped, not queued.
    tick_gate: Mutex<()>,
    tick_secs: u64,
}

impl WorkScheduler {
    pub fn new(schedule: WorkSchedule, manager: Arc<ServiceManager>, tick_secs: u64) -> Self {
        Self {
            schedule: RwLock::new(schedule),
            manager,
            manual_override: AtomicBool::new(false),
            running: AtomicBool::new(false),
            tick_gate: Mutex::new(()),
            tick_secs: tick_secs.max(1),
        }
    }

    /// Replace the work window atomically. A rejected update leaves the
    /// previous window in force.
    pub fn update_schedule(
        &self,
        start: &str,
        end: &str,
        enabled_days: &[u8],
    ) -> Result<(), ScheduleError> {
        let next = WorkSchedule::new(start, end, enabled_days)?;
        *self.schedule.write() = next;
        info!("Work schedule updated: {} - {}", start, end);
        Ok(())
    }

    /// When set, ticks observe the time but take no action.
    pub fn set_override(&self, enabled: bool) {
        self.manual_override.store(enabled, Ordering::Relaxed);
        info!(
            "Manual override {}",
            if enabled { "engaged" } else { "released" }
        );
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override.load(Ordering::Relaxed)
    }

    pub fn is_work_time(&self, now: NaiveDateTime) -> bool {
        self.schedule.read().is_work_time(now)
    }

    pub fn status(&self, now: NaiveDateTime) -> SchedulerStatus {
        let schedule = self.schedule.read();
        SchedulerStatus {
            running: self.running.load(Ordering::Relaxed),
            is_work_time: schedule.is_work_time(now),
            manual_override: self.manual_override(),
            schedule: schedule.view(),
            minutes_until_next_event: schedule.minutes_until_next_event(now),
        }
    }

    /// One scheduling decision at `now`. Safe to call concurrently; a tick
    /// arriving while another runs is dropped.
    pub async fn tick(&self, now: NaiveDateTime) {
        let Ok(_gate) = self.tick_gate.try_lock() else {
            debug!("tick still in progress, skipping");
            return;
        };

        if self.manual_override() {
            return;
        }

        let work = self.is_work_time(now);
        if work && !self.manager.all_running() {
            info!("Inside work hours, starting services");
            for (id, result) in self.manager.start_all().await {
                if let Err(e) = result {
                    warn!("scheduled start of {} failed: {}", id, e);
                }
            }
        } else if !work && self.manager.any_running() {
            info!("Outside work hours, stopping services");
            for (id, result) in self.manager.stop_all().await {
                if let Err(e) = result {
                    warn!("scheduled stop of {} failed: {}", id, e);
                }
            }
        }
    }

    /// Tick at the configured interval until shutdown is signalled.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        self.running.store(true, Ordering::Relaxed);
        info!("Scheduler loop running every {}s", self.tick_secs);

        let mut ticker = interval(Duration::from_secs(self.tick_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {
                    self.tick(Local::now().naive_local()).await;
                }
            }
        }

        self.running.store(false, Ordering::Relaxed);
        info!("Scheduler loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ServiceAction, ServiceId, ServicePhase, SERVICES};
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

    fn manager() -> Arc<ServiceManager> {
        let manager = Arc::new(ServiceManager::new());
        for descriptor in SERVICES {
            manager.register(descriptor.id, Arc::new(NoopAction));
        }
        manager
    }

    fn scheduler(manager: Arc<ServiceManager>) -> WorkScheduler {
        WorkScheduler::new(
            WorkSchedule::new("08:30", "19:00", &[0]).unwrap(),
            manager,
            30,
        )
    }

    fn monday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 31)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_tick_starts_inside_window_and_stops_outside() {
        let manager = manager();
        let scheduler = scheduler(manager.clone());

        scheduler.tick(monday(8, 29)).await;
        assert!(!manager.any_running());

        scheduler.tick(monday(8, 30)).await;
        assert!(manager.all_running());

        // Level-triggered: a repeated in-window tick is a no-op
        scheduler.tick(monday(12, 0)).await;
        assert!(manager.all_running());

        scheduler.tick(monday(19, 0)).await;
        assert!(!manager.any_running());
    }

    #[tokio::test]
    async fn test_override_makes_ticks_inert() {
        let manager = manager();
        let scheduler = scheduler(manager.clone());

        scheduler.set_override(true);
        scheduler.tick(monday(12, 0)).await;
        assert!(!manager.any_running());

        // Manual control still works while the override is engaged
        manager.start(ServiceId::Camera).await.unwrap();
        scheduler.tick(monday(20, 0)).await;
        assert_eq!(
            manager.state(ServiceId::Camera).unwrap().phase,
            ServicePhase::Running
        );

        scheduler.set_override(false);
        scheduler.tick(monday(20, 0)).await;
        assert!(!manager.any_running());
    }

    #[tokio::test]
    async fn test_update_schedule_rejection_keeps_previous_window() {
        let manager = manager();
        let scheduler = scheduler(manager.clone());

        assert!(scheduler.update_schedule("22:00", "06:00", &[0]).is_err());
        assert!(scheduler.is_work_time(monday(12, 0)));

        scheduler.update_schedule("09:00", "10:00", &[0]).unwrap();
        assert!(!scheduler.is_work_time(monday(12, 0)));
        assert!(scheduler.is_work_time(monday(9, 30)));
    }

    #[tokio::test]
    async fn test_status_snapshot() {
        let scheduler = scheduler(manager());
        let status = scheduler.status(monday(18, 0));
        assert!(!status.running);
        assert!(status.is_work_time);
        assert!(!status.manual_override);
        assert_eq!(status.minutes_until_next_event, Some(60));
        assert_eq!(status.schedule.start, "08:30");
    }
}
