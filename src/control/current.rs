//! Motor-current trigger for RE3.
//!
//! RE3 follows the hood motor: it is started by the first sample above
//! the threshold and held while the motor keeps drawing current.  Single
//! samples are unreliable on AC (a sample can land on a zero crossing),
//! so release is decided on the peak over a whole window:
//!
//! ```text
//!   sample > threshold, RE3 idle   → Trigger, window opens at this sample
//!   RE3 active                     → window_max = max(window_max, sample)
//!   window elapsed, max > thresh   → Hold, next window opens
//!   window elapsed, max <= thresh  → Release
//! ```
//!
//! A failed conversion skips the evaluation: no trigger, and the window
//! neither takes the sample nor closes on it.

use log::{debug, warn};

use crate::app::ports::AnalogPort;
use crate::scheduler::{Millis, PeriodicTimer, elapsed};
use crate::sensors::current::CurrentSensor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrentAction {
    /// RE3 is idle and the motor is running.
    Trigger { milliamps: f32 },
    /// Window closed with the motor still running.
    Hold { peak_ma: f32 },
    /// Window closed without a single sample above the threshold.
    Release { peak_ma: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    pub start: Millis,
    pub max_ma: f32,
}

pub struct CurrentEvaluator {
    sensor: CurrentSensor,
    timer: PeriodicTimer,
    window_ms: Millis,
    threshold_ma: f32,
    window: Option<SampleWindow>,
}

impl CurrentEvaluator {
    pub fn new(sensor: CurrentSensor, period_ms: Millis, window_ms: Millis, threshold_ma: f32) -> Self {
        Self {
            sensor,
            timer: PeriodicTimer::new(period_ms),
            window_ms,
            threshold_ma,
            window: None,
        }
    }

    /// Sample if due.  `relay_active` is RE3's state before this call.
    pub fn poll(
        &mut self,
        now: Millis,
        adc: &mut impl AnalogPort,
        relay_active: bool,
    ) -> Option<CurrentAction> {
        if !self.timer.poll(now) {
            return None;
        }
        let reading = match self.sensor.read(adc) {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Current sample skipped: {}", e);
                return None;
            }
        };
        let ma = reading.milliamps;
        debug!("Current: {:.0} mA (raw {})", ma, reading.raw);

        if !relay_active {
            self.window = None;
            if ma > self.threshold_ma {
                self.window = Some(SampleWindow { start: now, max_ma: ma });
                return Some(CurrentAction::Trigger { milliamps: ma });
            }
            return None;
        }

        let window = self.window.get_or_insert(SampleWindow { start: now, max_ma: 0.0 });
        window.max_ma = window.max_ma.max(ma);
        if elapsed(now, window.start) < self.window_ms {
            return None;
        }

        let peak_ma = window.max_ma;
        *window = SampleWindow { start: now, max_ma: 0.0 };
        if peak_ma > self.threshold_ma {
            Some(CurrentAction::Hold { peak_ma })
        } else {
            self.window = None;
            Some(CurrentAction::Release { peak_ma })
        }
    }

    pub fn window(&self) -> Option<SampleWindow> {
        self.window
    }
}
