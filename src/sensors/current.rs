//! ACS712 hall-effect current sensor.
//!
//! The sensor outputs `zero_volts` at no load and moves by
//! `volts_per_amp` per ampere in either direction.  On an AC supply the
//! sign depends on where in the mains cycle the sample lands, so only the
//! magnitude is reported.

use crate::app::ports::AnalogPort;
use crate::config::CurrentCalibration;
use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentReading {
    pub raw: u16,
    pub milliamps: f32,
}

pub struct CurrentSensor {
    pin: u8,
    cal: CurrentCalibration,
}

impl CurrentSensor {
    pub fn new(pin: u8, cal: CurrentCalibration) -> Self {
        Self { pin, cal }
    }

    pub fn read(&self, adc: &mut impl AnalogPort) -> Result<CurrentReading, SensorError> {
        let raw = adc.read_analog(self.pin)?;
        Ok(CurrentReading {
            raw,
            milliamps: self.to_milliamps(raw),
        })
    }

    /// Raw ADC count → absolute current in mA.
    pub fn to_milliamps(&self, raw: u16) -> f32 {
        let adc_max = f32::from(self.cal.adc_max.max(1));
        let volts = f32::from(raw) * self.cal.vref_volts / adc_max;
        (volts - self.cal.zero_volts).abs() / self.cal.volts_per_amp * 1000.0
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}
