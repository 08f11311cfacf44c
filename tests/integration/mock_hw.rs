//! Mock hardware and event sink for integration tests.
//!
//! Records every output write so tests can assert on the full pin
//! history without touching real GPIO registers.  Switches, the current
//! sensor and the humidity sensor are plain fields the test sets between
//! ticks.

use std::collections::HashMap;

use hoodvent::VentController;
use hoodvent::app::events::AppEvent;
use hoodvent::app::ports::{AnalogPort, EventSink, GpioPort, HumidityPort, PinState};
use hoodvent::error::SensorError;
use hoodvent::scheduler::Millis;

/// Raw ACS712 counts: motor off (~13 mA) and running (~460 mA).
pub const CURRENT_IDLE: u16 = 512;
pub const CURRENT_RUNNING: u16 = 530;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub writes: Vec<(u8, PinState)>,
    levels: HashMap<u8, PinState>,
    inputs: HashMap<u8, PinState>,
    pub adc: u16,
    /// ADC conversions fail while set.
    pub adc_fault: bool,
    pub humidity: Result<f32, SensorError>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            levels: HashMap::new(),
            inputs: HashMap::new(),
            adc: CURRENT_IDLE,
            adc_fault: false,
            humidity: Ok(40.0),
        }
    }

    /// Last level driven on `pin`.
    pub fn level(&self, pin: u8) -> Option<PinState> {
        self.levels.get(&pin).copied()
    }

    pub fn press(&mut self, pin: u8) {
        self.inputs.insert(pin, PinState::Low);
    }

    pub fn release(&mut self, pin: u8) {
        self.inputs.insert(pin, PinState::High);
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for MockHardware {
    fn read_input(&mut self, pin: u8) -> PinState {
        self.inputs.get(&pin).copied().unwrap_or(PinState::High)
    }

    fn write_output(&mut self, pin: u8, level: PinState) {
        self.writes.push((pin, level));
        self.levels.insert(pin, level);
    }
}

impl AnalogPort for MockHardware {
    fn read_analog(&mut self, _pin: u8) -> Result<u16, SensorError> {
        if self.adc_fault {
            return Err(SensorError::Bus);
        }
        Ok(self.adc)
    }
}

impl HumidityPort for MockHardware {
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.humidity
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Stamps every event with the tick time set by the harness.
#[derive(Default)]
pub struct RecordingSink {
    pub now: Millis,
    pub events: Vec<(Millis, AppEvent)>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn times_of(&self, pred: impl Fn(&AppEvent) -> bool) -> Vec<Millis> {
        self.events
            .iter()
            .filter(|(_, e)| pred(e))
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.iter().any(|(_, e)| e == event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push((self.now, event.clone()));
    }
}

// ── Harness ───────────────────────────────────────────────────

pub struct Rig {
    pub ctl: VentController,
    pub hw: MockHardware,
    pub sink: RecordingSink,
    pub now: Millis,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: hoodvent::config::VentConfig) -> Self {
        let mut rig = Self {
            ctl: VentController::new(config),
            hw: MockHardware::new(),
            sink: RecordingSink::default(),
            now: 0,
        };
        rig.ctl.init(&mut rig.hw, &mut rig.sink);
        rig
    }

    pub fn tick(&mut self) {
        self.sink.now = self.now;
        self.ctl.tick(self.now, &mut self.hw, &mut self.sink);
    }

    /// Tick every `step` ms from the current time up to and including
    /// `to`.  Leaves `now` at the first untouched step.
    pub fn run_until(&mut self, to: Millis, step: Millis) {
        while self.now <= to {
            self.tick();
            self.now += step;
        }
    }
}
