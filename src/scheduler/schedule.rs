// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Work window definition and time math

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected schedule update; the prior configuration is retained.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid time {0:?}: expected HH:MM")]
    InvalidTime(String),

    /// The work window may not wrap midnight.
    #[error("end {end} must be after start {start} on the same day")]
    WrappingWindow { start: String, end: String },

    #[error("enabled day {0} out of range (0 = Monday .. 6 = Sunday)")]
    InvalidDay(u8),

    #[error("at least one weekday must be enabled")]
    NoDaysEnabled,
}

/// Serializable view of the work window, times as `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleView {
    pub start: String,
    pub end: String,
    pub enabled_days: Vec<u8>,
}

/// A validated work window: start/end time-of-day plus enabled weekdays
/// (0 = Monday .. 6 = Sunday, matching the sensor rig's wire format).
#[derive(Debug, Clone)]
pub struct WorkSchedule {
    start: NaiveTime,
    end: NaiveTime,
    enabled_days: Vec<u8>,
}

fn parse_hhmm(text: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .map_err(|_| ScheduleError::InvalidTime(text.to_string()))
}

impl WorkSchedule {
    pub fn new(start: &str, end: &str, enabled_days: &[u8]) -> Result<Self, ScheduleError> {
        let start_time = parse_hhmm(start)?;
        let end_time = parse_hhmm(end)?;
        if end_time <= start_time {
            return Err(ScheduleError::WrappingWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        if enabled_days.is_empty() {
            return Err(ScheduleError::NoDaysEnabled);
        }
        let mut days = enabled_days.to_vec();
        days.sort_unstable();
        days.dedup();
        if let Some(&bad) = days.iter().find(|&&d| d > 6) {
            return Err(ScheduleError::InvalidDay(bad));
        }

        Ok(Self {
            start: start_time,
            end: end_time,
            enabled_days: days,
        })
    }

    pub fn day_enabled(&self, weekday: Weekday) -> bool {
        self.enabled_days
            .contains(&(weekday.num_days_from_monday() as u8))
    }

    /// Whether `now` falls inside the window: enabled day and
    /// `start <= time-of-day < end`.
    pub fn is_work_time(&self, now: NaiveDateTime) -> bool {
        self.day_enabled(now.weekday()) && now.time() >= self.start && now.time() < self.end
    }

    /// Minutes until the window closes (if inside it) or until the next
    /// enabled start, scanning forward up to seven days. Display only.
    pub fn minutes_until_next_event(&self, now: NaiveDateTime) -> Option<i64> {
        if self.is_work_time(now) {
            let end = now.date().and_time(self.end);
            return Some((end - now).num_minutes());
        }

        for offset in 0..=7 {
            let date = now.date() + Duration::days(offset);
            if !self.day_enabled(date.weekday()) {
                continue;
            }
            let candidate = date.and_time(self.start);
            if candidate > now {
                return Some((candidate - now).num_minutes());
            }
        }
        None
    }

    pub fn view(&self) -> ScheduleView {
        ScheduleView {
            start: format!("{:02}:{:02}", self.start.hour(), self.start.minute()),
            end: format!("{:02}:{:02}", self.end.hour(), self.end.minute()),
            enabled_days: self.enabled_days.clone(),
        }
    }
}

impl Default for WorkSchedule {
    fn default() -> Self {
        // Weekday shift hours; matches the deployed rig configuration.
        Self {
            start: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            enabled_days: vec![0, 1, 2, 3, 4],
        }
    }
}
