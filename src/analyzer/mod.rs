// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Vibration analyzer - rolling-window statistics and alerting

mod alerts;
mod stats;
mod window;

pub use alerts::{Alert, AlertThresholds, AlertTracker, Severity};
pub use stats::{classify_trend, Statistics, Trend};
pub use window::AnalysisWindow;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::warn;

use crate::config::AnalyzerConfig;
use crate::transport::SensorReading;

/// One consistent view of the analyzer, captured under a single lock.
///
/// The statistics always describe the same window the latest reading and
/// alert list were taken from.
#[derive(Debug, Clone, Serialize)]
pub struct VibrationView {
    pub latest_reading: Option<SensorReading>,
    pub statistics: Option<Statistics>,
    pub active_severity: Option<Severity>,
    pub recent_alerts: Vec<Alert>,
    pub total_samples: u64,
}

struct Inner {
    window: AnalysisWindow,
    statistics: Option<Statistics>,
    tracker: AlertTracker,
    latest: Option<SensorReading>,
    total_samples: u64,
}

/// Turns a stream of readings into statistics and alerts.
///
/// Single writer (the sensor poll loop), many readers; every accessor is
/// safe to call concurrently with [`ingest`](VibrationAnalyzer::ingest).
pub struct VibrationAnalyzer {
    cfg: AnalyzerConfig,
    inner: RwLock<Inner>,
}

impl VibrationAnalyzer {
    pub fn new(cfg: AnalyzerConfig) -> Self {
        let inner = Inner {
            window: AnalysisWindow::new(cfg.window_size),
            statistics: None,
            tracker: AlertTracker::new(cfg.thresholds.clone(), cfg.alert_history),
            latest: None,
            total_samples: 0,
        };
        Self {
            cfg,
            inner: RwLock::new(inner),
        }
    }

    /// Append a reading, recompute statistics, and evaluate alert
    /// thresholds. Returns the alert emitted by this sample, if any.
    pub fn ingest(&self, reading: SensorReading) -> Option<Alert> {
        let mut inner = self.inner.write();

        let magnitude = reading.magnitude;
        let timestamp = reading.timestamp;
        inner.latest = Some(reading.clone());
        inner.window.push(reading);
        inner.total_samples += 1;
        inner.statistics = Statistics::compute(
            &inner.window,
            self.cfg.trend_deadband,
            self.cfg.min_trend_samples,
        );

        let alert = inner.tracker.observe(magnitude, timestamp);
        if let Some(ref alert) = alert {
            warn!("{}", alert.message);
        }
        alert
    }

    pub fn latest(&self) -> Option<SensorReading> {
        self.inner.read().latest.clone()
    }

    pub fn statistics(&self) -> Option<Statistics> {
        self.inner.read().statistics.clone()
    }

    /// Most recent alerts first, at most `limit`.
    pub fn alerts(&self, limit: usize) -> Vec<Alert> {
        self.inner.read().tracker.recent(limit)
    }

    pub fn active_severity(&self) -> Option<Severity> {
        self.inner.read().tracker.active()
    }

    /// Capture latest reading, statistics, and alerts in one lock
    /// acquisition for the status aggregator.
    pub fn view(&self) -> VibrationView {
        let inner = self.inner.read();
        VibrationView {
            latest_reading: inner.latest.clone(),
            statistics: inner.statistics.clone(),
            active_severity: inner.tracker.active(),
            recent_alerts: inner.tracker.recent(self.cfg.alert_history),
            total_samples: inner.total_samples,
        }
    }

    /// Forget the most recent reading; window statistics and alert
    /// history are retained. Used when the sensor link is lost.
    pub fn clear_latest(&self) {
        self.inner.write().latest = None;
    }

    /// Drop all buffered data and alert state.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.window.clear();
        inner.statistics = None;
        inner.latest = None;
        inner.total_samples = 0;
        inner.tracker.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> VibrationAnalyzer {
        VibrationAnalyzer::new(AnalyzerConfig {
            window_size: 10,
            ..AnalyzerConfig::default()
        })
    }

    fn reading(magnitude: f64) -> SensorReading {
        SensorReading::new(magnitude, 0.0, 0.0)
    }

    #[test]
    fn test_empty_analyzer_reports_nothing() {
        let analyzer = analyzer();
        assert!(analyzer.latest().is_none());
        assert!(analyzer.statistics().is_none());
        assert!(analyzer.alerts(10).is_empty());
    }

    #[test]
    fn test_ingest_updates_latest_and_statistics() {
        let analyzer = analyzer();
        for m in [1.0, 2.0, 3.0] {
            analyzer.ingest(reading(m));
        }

        assert_eq!(analyzer.latest().unwrap().magnitude, 3.0);
        let stats = analyzer.statistics().unwrap();
        assert_eq!(stats.sample_count, 3);
        assert!((stats.mean_magnitude - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_capacity_bounds_statistics() {
        let analyzer = analyzer();
        for m in 0..25 {
            analyzer.ingest(reading(m as f64));
        }
        let stats = analyzer.statistics().unwrap();
        assert_eq!(stats.sample_count, 10);
        // Only 15..24 remain
        assert_eq!(stats.min_magnitude, 15.0);
        assert_eq!(stats.max_magnitude, 24.0);
    }

    #[test]
    fn test_sustained_high_level_emits_single_alert() {
        let analyzer = analyzer();
        for _ in 0..30 {
            analyzer.ingest(reading(12.0));
        }
        let alerts = analyzer.alerts(usize::MAX);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Some(Severity::High));
        assert_eq!(analyzer.active_severity(), Some(Severity::High));
    }

    #[test]
    fn test_view_is_internally_consistent() {
        let analyzer = analyzer();
        for m in [1.0, 2.0, 3.0, 4.0, 5.0] {
            analyzer.ingest(reading(m));
        }
        let view = analyzer.view();
        let stats = view.statistics.unwrap();
        assert_eq!(stats.sample_count, 5);
        assert_eq!(view.latest_reading.unwrap().magnitude, 5.0);
        assert_eq!(view.total_samples, 5);
    }

    #[test]
    fn test_clear_latest_keeps_statistics_and_alerts() {
        let analyzer = analyzer();
        for m in [12.0, 12.0, 12.0] {
            analyzer.ingest(reading(m));
        }
        analyzer.clear_latest();

        assert!(analyzer.latest().is_none());
        assert!(analyzer.view().latest_reading.is_none());
        assert_eq!(analyzer.statistics().unwrap().sample_count, 3);
        assert_eq!(analyzer.alerts(10).len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let analyzer = analyzer();
        analyzer.ingest(reading(25.0));
        analyzer.reset();
        assert!(analyzer.latest().is_none());
        assert!(analyzer.statistics().is_none());
        assert!(analyzer.alerts(10).is_empty());
        assert_eq!(analyzer.active_severity(), None);
    }

    #[test]
    fn test_failed_read_leaves_window_untouched() {
        // A decode failure never reaches ingest; statistics are identical
        // before and after the dropped sample.
        let analyzer = analyzer();
        for m in [1.0, 2.0, 3.0] {
            analyzer.ingest(reading(m));
        }
        let before = analyzer.statistics().unwrap();
        // dropped sample: no ingest call
        let after = analyzer.statistics().unwrap();
        assert_eq!(before.sample_count, after.sample_count);
        assert_eq!(before.mean_magnitude, after.mean_magnitude);
    }
}
