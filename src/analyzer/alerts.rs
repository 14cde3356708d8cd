// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Threshold alerting
//!
//! A small state machine over severity tiers. Alerts are edge-triggered:
//! a record is emitted only when the active tier changes, including the
//! transition back to none, so a sustained level never floods the history.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity, ordered by ascending magnitude threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Magnitude thresholds per severity tier, in m/s².
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low: 2.0,
            medium: 5.0,
            high: 10.0,
            critical: 20.0,
        }
    }
}

impl AlertThresholds {
    /// Highest tier whose threshold the magnitude meets or exceeds.
    pub fn classify(&self, magnitude: f64) -> Option<Severity> {
        if magnitude >= self.critical {
            Some(Severity::Critical)
        } else if magnitude >= self.high {
            Some(Severity::High)
        } else if magnitude >= self.medium {
            Some(Severity::Medium)
        } else if magnitude >= self.low {
            Some(Severity::Low)
        } else {
            None
        }
    }

    pub fn threshold(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

/// A severity-tier transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: DateTime<Utc>,
    /// Tier entered by this transition; `None` when the level cleared.
    pub severity: Option<Severity>,
    /// Tier active before this transition.
    pub previous: Option<Severity>,
    pub magnitude: f64,
    pub message: String,
}

fn tier_name(tier: Option<Severity>) -> String {
    tier.map(|s| s.to_string()).unwrap_or_else(|| "none".into())
}

/// Edge-triggered alert state machine with bounded history.
#[derive(Debug)]
pub struct AlertTracker {
    thresholds: AlertThresholds,
    active: Option<Severity>,
    history: VecDeque<Alert>,
    history_capacity: usize,
}

impl AlertTracker {
    pub fn new(thresholds: AlertThresholds, history_capacity: usize) -> Self {
        Self {
            thresholds,
            active: None,
            history: VecDeque::with_capacity(history_capacity.max(1)),
            history_capacity: history_capacity.max(1),
        }
    }

    /// Evaluate one magnitude sample. Returns the emitted alert when the
    /// active tier changed, `None` otherwise.
    pub fn observe(&mut self, magnitude: f64, timestamp: DateTime<Utc>) -> Option<Alert> {
        let tier = self.thresholds.classify(magnitude);
        if tier == self.active {
            return None;
        }

        let message = match tier {
            Some(severity) => format!(
                "vibration {} -> {}: {:.2} m/s² (threshold {:.2})",
                tier_name(self.active),
                severity,
                magnitude,
                self.thresholds.threshold(severity)
            ),
            None => format!(
                "vibration {} -> none: {:.2} m/s²",
                tier_name(self.active),
                magnitude
            ),
        };

        let alert = Alert {
            timestamp,
            severity: tier,
            previous: self.active,
            magnitude,
            message,
        };

        self.active = tier;
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(alert.clone());
        Some(alert)
    }

    /// Currently active tier, if any.
    pub fn active(&self) -> Option<Severity> {
        self.active
    }

    /// Most recent alerts first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Vec<Alert> {
        self.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> AlertTracker {
        AlertTracker::new(AlertThresholds::default(), 10)
    }

    #[test]
    fn test_classification_tiers() {
        let t = AlertThresholds::default();
        assert_eq!(t.classify(0.5), None);
        assert_eq!(t.classify(2.0), Some(Severity::Low));
        assert_eq!(t.classify(7.3), Some(Severity::Medium));
        assert_eq!(t.classify(10.0), Some(Severity::High));
        assert_eq!(t.classify(50.0), Some(Severity::Critical));
    }

    #[test]
    fn test_edge_trigger_single_alert_for_sustained_level() {
        let mut tracker = tracker();
        let mut emitted = 0;
        for _ in 0..20 {
            if tracker.observe(12.0, Utc::now()).is_some() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 1);
        assert_eq!(tracker.active(), Some(Severity::High));

        let recent = tracker.recent(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].severity, Some(Severity::High));
        assert_eq!(recent[0].previous, None);
    }

    #[test]
    fn test_deescalation_emits_alert() {
        let mut tracker = tracker();
        tracker.observe(25.0, Utc::now()).unwrap();
        let alert = tracker.observe(0.3, Utc::now()).unwrap();

        assert_eq!(alert.severity, None);
        assert_eq!(alert.previous, Some(Severity::Critical));
        assert!(alert.message.contains("critical -> none"));
        assert_eq!(tracker.active(), None);
    }

    #[test]
    fn test_tier_change_without_clearing() {
        let mut tracker = tracker();
        tracker.observe(3.0, Utc::now()).unwrap();
        let alert = tracker.observe(6.0, Utc::now()).unwrap();
        assert_eq!(alert.previous, Some(Severity::Low));
        assert_eq!(alert.severity, Some(Severity::Medium));
        assert!(tracker.observe(6.5, Utc::now()).is_none());
    }

    #[test]
    fn test_history_is_bounded_and_newest_first() {
        let mut tracker = AlertTracker::new(AlertThresholds::default(), 3);
        // Alternate between none and medium to force a transition each time
        for i in 0..10 {
            let magnitude = if i % 2 == 0 { 6.0 } else { 0.1 };
            tracker.observe(magnitude, Utc::now());
        }
        let recent = tracker.recent(10);
        assert_eq!(recent.len(), 3);
        // 10th observation was magnitude 0.1 -> cleared
        assert_eq!(recent[0].severity, None);
        assert_eq!(recent[1].severity, Some(Severity::Medium));
    }
}
