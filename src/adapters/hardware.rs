//! Hardware adapter: bridges board peripherals to the domain port traits.
//!
//! Pin numbers from [`crate::pins`] are mapped onto `embedded-hal`
//! digital drivers, so the same adapter runs over ESP-IDF `PinDriver`s on
//! target and over mock pins on the host.  Analog and humidity reads are
//! delegated to the wrapped sensor ports.
//!
//! Pin faults never reach the control core: a failed write is logged, a
//! failed read counts as HIGH (switch released, the safe reading).

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{AnalogPort, GpioPort, HumidityPort, PinState};
use crate::error::SensorError;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<O, I, A, H, const NO: usize, const NI: usize> {
    outputs: [(u8, O); NO],
    inputs: [(u8, I); NI],
    analog: A,
    humidity: H,
}

impl<O, I, A, H, const NO: usize, const NI: usize> HardwareAdapter<O, I, A, H, NO, NI>
where
    O: OutputPin,
    I: InputPin,
    A: AnalogPort,
    H: HumidityPort,
{
    pub fn new(outputs: [(u8, O); NO], inputs: [(u8, I); NI], analog: A, humidity: H) -> Self {
        Self {
            outputs,
            inputs,
            analog,
            humidity,
        }
    }
}

// ── GpioPort implementation ───────────────────────────────────

impl<O, I, A, H, const NO: usize, const NI: usize> GpioPort for HardwareAdapter<O, I, A, H, NO, NI>
where
    O: OutputPin,
    I: InputPin,
{
    fn read_input(&mut self, pin: u8) -> PinState {
        let Some((_, input)) = self.inputs.iter_mut().find(|(p, _)| *p == pin) else {
            warn!("read_input: pin {} not mapped", pin);
            return PinState::High;
        };
        match input.is_low() {
            Ok(true) => PinState::Low,
            Ok(false) => PinState::High,
            Err(_) => {
                warn!("read_input: pin {} read failed", pin);
                PinState::High
            }
        }
    }

    fn write_output(&mut self, pin: u8, level: PinState) {
        let Some((_, output)) = self.outputs.iter_mut().find(|(p, _)| *p == pin) else {
            warn!("write_output: pin {} not mapped", pin);
            return;
        };
        if output.set_state(level).is_err() {
            warn!("write_output: pin {} write failed", pin);
        }
    }
}

// ── Sensor port implementations ───────────────────────────────

impl<O, I, A, H, const NO: usize, const NI: usize> AnalogPort for HardwareAdapter<O, I, A, H, NO, NI>
where
    A: AnalogPort,
{
    fn read_analog(&mut self, pin: u8) -> Result<u16, SensorError> {
        self.analog.read_analog(pin)
    }
}

impl<O, I, A, H, const NO: usize, const NI: usize> HumidityPort
    for HardwareAdapter<O, I, A, H, NO, NI>
where
    H: HumidityPort,
{
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.humidity.read_humidity()
    }
}
