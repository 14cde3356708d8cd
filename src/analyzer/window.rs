// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Bounded analysis window

use std::collections::VecDeque;

use crate::transport::SensorReading;

/// Fixed-capacity, arrival-ordered window of the most recent readings.
///
/// Insertion is append-with-eviction: once the window is full, each push
/// drops the oldest reading. Capacity is never exceeded.
#[derive(Debug, Clone)]
pub struct AnalysisWindow {
    readings: VecDeque<SensorReading>,
    capacity: usize,
}

impl AnalysisWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, reading: SensorReading) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Oldest reading first.
    pub fn iter(&self) -> impl Iterator<Item = &SensorReading> {
        self.readings.iter()
    }

    pub fn front(&self) -> Option<&SensorReading> {
        self.readings.front()
    }

    pub fn back(&self) -> Option<&SensorReading> {
        self.readings.back()
    }

    /// Magnitudes in arrival order.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.magnitude).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(magnitude: f64) -> SensorReading {
        SensorReading::new(magnitude, 0.0, 0.0)
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut window = AnalysisWindow::new(5);
        for i in 0..50 {
            window.push(reading(i as f64));
            assert!(window.len() <= 5);
        }
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_fifo_eviction_order() {
        let mut window = AnalysisWindow::new(3);
        for i in 0..5 {
            window.push(reading(i as f64));
        }
        // 0 and 1 evicted, 2..4 retained in arrival order
        assert_eq!(window.magnitudes(), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.front().unwrap().magnitude, 2.0);
        assert_eq!(window.back().unwrap().magnitude, 4.0);
    }

    #[test]
    fn test_clear_empties_window() {
        let mut window = AnalysisWindow::new(4);
        window.push(reading(1.0));
        window.push(reading(2.0));
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 4);
    }
}
