//! Sensor drivers: ACS712 motor current and BME280 humidity.

pub mod bme280;
pub mod current;

use crate::app::ports::HumidityPort;
use crate::error::SensorError;

/// Stand-in for boards built without a humidity sensor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHumiditySensor;

impl HumidityPort for NoHumiditySensor {
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Err(SensorError::NotPresent)
    }
}
