//! Humidity trigger for RE1.
//!
//! No low-side hysteresis: a humid reading only starts (or extends) RE1,
//! which then stops through its own run timer.

use log::{debug, warn};

use crate::app::ports::HumidityPort;
use crate::error::SensorError;
use crate::scheduler::{Millis, PeriodicTimer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HumidityOutcome {
    Sample { percent: f32, above_threshold: bool },
    /// Sensor did not answer; this evaluation is skipped.
    Unavailable(SensorError),
}

pub struct HumidityEvaluator {
    timer: PeriodicTimer,
    threshold_pct: f32,
    enabled: bool,
}

impl HumidityEvaluator {
    pub fn new(period_ms: Millis, threshold_pct: f32, enabled: bool) -> Self {
        Self {
            timer: PeriodicTimer::new(period_ms),
            threshold_pct,
            enabled,
        }
    }

    /// Returns `None` when disabled or not due.
    pub fn poll(&mut self, now: Millis, sensor: &mut impl HumidityPort) -> Option<HumidityOutcome> {
        if !self.enabled || !self.timer.poll(now) {
            return None;
        }
        match sensor.read_humidity() {
            Ok(percent) => {
                debug!("Humidity: {:.1} %", percent);
                Some(HumidityOutcome::Sample {
                    percent,
                    above_threshold: percent > self.threshold_pct,
                })
            }
            Err(e) => {
                warn!("Humidity unavailable: {}", e);
                Some(HumidityOutcome::Unavailable(e))
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
