// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Simulated vibration source for demo mode and tests

use rand::prelude::*;
use rand_distr::Normal;

use super::{SensorReading, TransportError, VibrationSource};

/// Simulates a rig-mounted accelerometer: gravity on the Z axis, Gaussian
/// noise on all three, and occasional vibration bursts.
pub struct SensorSimulator {
    rng: rand::rngs::StdRng,
    connected: bool,
    noise_sigma: f64,
    burst_probability: f64,
    burst_amplitude: f64,
    drift: f64,
}

impl SensorSimulator {
    pub fn new() -> Self {
        Self {
            rng: rand::rngs::StdRng::from_entropy(),
            connected: true,
            noise_sigma: 0.15,
            burst_probability: 0.02,
            burst_amplitude: 8.0,
            drift: 0.0,
        }
    }

    /// Simulator with fixed parameters, deterministic enough for tests.
    pub fn with_params(noise_sigma: f64, burst_probability: f64, burst_amplitude: f64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(0x4652594d),
            connected: true,
            noise_sigma,
            burst_probability,
            burst_amplitude,
            drift: 0.0,
        }
    }
}

impl Default for SensorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl VibrationSource for SensorSimulator {
    fn read(&mut self) -> Result<SensorReading, TransportError> {
        if !self.connected {
            return Err(TransportError::Connection("simulator disconnected".into()));
        }

        self.drift += self.rng.gen_range(-0.001..0.001);
        let noise = Normal::new(0.0, self.noise_sigma.max(1e-9)).unwrap();

        let mut x = self.rng.sample(noise);
        let mut y = self.rng.sample(noise);
        let z = 9.81 + self.drift + self.rng.sample(noise);

        if self.rng.gen::<f64>() < self.burst_probability {
            let amplitude = self.rng.gen_range(0.5..self.burst_amplitude);
            if self.rng.gen::<bool>() {
                x += amplitude;
            } else {
                y += amplitude;
            }
        }

        let temperature = 35.0 + self.drift * 5.0 + self.rng.sample(noise);
        Ok(SensorReading::new(x, y, z).with_extras(Some(temperature), Some(120.0)))
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_simulator_stays_near_gravity() {
        let mut sim = SensorSimulator::with_params(0.01, 0.0, 0.0);
        for _ in 0..100 {
            let reading = sim.read().unwrap();
            assert!((reading.magnitude - 9.81).abs() < 0.5);
            assert!(reading.temperature.is_some());
        }
    }

    #[test]
    fn test_disconnected_simulator_errors() {
        let mut sim = SensorSimulator::new();
        sim.disconnect();
        assert!(!sim.is_connected());
        assert!(matches!(
            sim.read().unwrap_err(),
            TransportError::Connection(_)
        ));
    }
}
