// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Window statistics and trend classification

use serde::{Deserialize, Serialize};

use super::window::AnalysisWindow;

/// Trend of vibration magnitude across the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Statistical summary of the current analysis window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub mean_magnitude: f64,
    pub max_magnitude: f64,
    pub min_magnitude: f64,
    pub std_deviation: f64,
    pub rms_magnitude: f64,
    pub peak_to_peak: f64,
    pub sample_count: usize,
    pub duration_seconds: f64,
    pub trend: Trend,
}

impl Statistics {
    /// Recompute statistics for the window. Returns `None` with fewer than
    /// two samples.
    pub fn compute(window: &AnalysisWindow, deadband: f64, min_trend_samples: usize) -> Option<Self> {
        if window.len() < 2 {
            return None;
        }

        let magnitudes = window.magnitudes();
        let count = magnitudes.len();
        let mean = magnitudes.iter().sum::<f64>() / count as f64;
        let max = magnitudes.iter().cloned().fold(f64::MIN, f64::max);
        let min = magnitudes.iter().cloned().fold(f64::MAX, f64::min);
        let variance = magnitudes.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / count as f64;
        let rms = (magnitudes.iter().map(|m| m * m).sum::<f64>() / count as f64).sqrt();

        let duration = match (window.front(), window.back()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp)
                .to_std()
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
            _ => 0.0,
        };

        Some(Self {
            mean_magnitude: mean,
            max_magnitude: max,
            min_magnitude: min,
            std_deviation: variance.sqrt(),
            rms_magnitude: rms,
            peak_to_peak: max - min,
            sample_count: count,
            duration_seconds: duration,
            trend: classify_trend(&magnitudes, deadband, min_trend_samples),
        })
    }
}

/// Compare the newest third of the window against the oldest third.
///
/// A dead-band around zero keeps sensor noise from flipping the label.
pub fn classify_trend(magnitudes: &[f64], deadband: f64, min_samples: usize) -> Trend {
    let third = magnitudes.len() / 3;
    if magnitudes.len() < min_samples.max(3) || third == 0 {
        return Trend::InsufficientData;
    }

    let oldest: f64 = magnitudes[..third].iter().sum::<f64>() / third as f64;
    let newest: f64 =
        magnitudes[magnitudes.len() - third..].iter().sum::<f64>() / third as f64;
    let delta = newest - oldest;

    if delta > deadband {
        Trend::Increasing
    } else if delta < -deadband {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SensorReading;

    fn window_of(magnitudes: &[f64]) -> AnalysisWindow {
        let mut window = AnalysisWindow::new(magnitudes.len().max(2));
        for &m in magnitudes {
            window.push(SensorReading::new(m, 0.0, 0.0));
        }
        window
    }

    #[test]
    fn test_single_sample_has_no_statistics() {
        let window = window_of(&[1.0]);
        assert!(Statistics::compute(&window, 0.1, 9).is_none());
    }

    #[test]
    fn test_basic_statistics() {
        let window = window_of(&[1.0, 2.0, 3.0, 4.0]);
        let stats = Statistics::compute(&window, 0.1, 9).unwrap();

        assert!((stats.mean_magnitude - 2.5).abs() < 1e-12);
        assert_eq!(stats.max_magnitude, 4.0);
        assert_eq!(stats.min_magnitude, 1.0);
        assert_eq!(stats.peak_to_peak, 3.0);
        assert_eq!(stats.sample_count, 4);
        // RMS of 1..4 = sqrt(30/4)
        assert!((stats.rms_magnitude - (30.0f64 / 4.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.trend, Trend::InsufficientData);
    }

    #[test]
    fn test_trend_increasing() {
        let magnitudes = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 4.0, 4.0, 4.0];
        assert_eq!(classify_trend(&magnitudes, 0.5, 9), Trend::Increasing);
    }

    #[test]
    fn test_trend_decreasing() {
        let magnitudes = [4.0, 4.0, 4.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0];
        assert_eq!(classify_trend(&magnitudes, 0.5, 9), Trend::Decreasing);
    }

    #[test]
    fn test_trend_deadband_reports_stable() {
        // newest-third mean minus oldest-third mean = 0.3, inside the band
        let magnitudes = [1.0, 1.0, 1.0, 1.1, 1.1, 1.1, 1.3, 1.3, 1.3];
        assert_eq!(classify_trend(&magnitudes, 0.5, 9), Trend::Stable);
    }

    #[test]
    fn test_trend_boundary_is_stable() {
        // delta exactly equal to the dead-band stays stable
        let magnitudes = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.5, 1.5, 1.5];
        assert_eq!(classify_trend(&magnitudes, 0.5, 9), Trend::Stable);
    }

    #[test]
    fn test_trend_insufficient_below_minimum() {
        let magnitudes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(classify_trend(&magnitudes, 0.1, 9), Trend::InsufficientData);
    }
}
