//! Fuzz target: `VentController::tick` under arbitrary inputs
//!
//! Each input byte is one tick: bits 0-1 drive SW1/SW2, bit 2 the motor
//! current, bit 3 the humidity, bits 4-7 the time step.  Bit 3 set with
//! bit 2 clear is an ADC conversion failure.
//!
//! Invariants checked:
//! - No panics, including across the `u32` clock wrap
//! - Idle relays never carry pending or scheduled pulses
//! - Relay outputs are energised exactly while the relay is active
//!
//! cargo fuzz run fuzz_controller_inputs

#![no_main]

use hoodvent::VentController;
use hoodvent::app::events::AppEvent;
use hoodvent::app::ports::{AnalogPort, EventSink, GpioPort, HumidityPort, PinState};
use hoodvent::config::VentConfig;
use hoodvent::error::SensorError;
use hoodvent::fsm::RelayId;
use hoodvent::pins;
use libfuzzer_sys::fuzz_target;

struct Hw {
    outputs: [PinState; 8],
    byte: u8,
}

impl GpioPort for Hw {
    fn read_input(&mut self, pin: u8) -> PinState {
        let bit = match pin {
            pins::SW1_PIN => 0,
            pins::SW2_PIN => 1,
            _ => return PinState::High,
        };
        if self.byte & (1 << bit) != 0 {
            PinState::Low
        } else {
            PinState::High
        }
    }

    fn write_output(&mut self, pin: u8, level: PinState) {
        self.outputs[usize::from(pin)] = level;
    }
}

impl AnalogPort for Hw {
    fn read_analog(&mut self, _pin: u8) -> Result<u16, SensorError> {
        match self.byte & 0x0c {
            0x08 => Err(SensorError::Bus),
            0x04 | 0x0c => Ok(530),
            _ => Ok(512),
        }
    }
}

impl HumidityPort for Hw {
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        if self.byte & 0x08 != 0 { Ok(90.0) } else { Err(SensorError::Bus) }
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (epoch, script) = data.split_at(4);
    let mut now = u32::from_le_bytes([epoch[0], epoch[1], epoch[2], epoch[3]]);

    let config = VentConfig {
        flap_opening_ms: 50,
        run_time_ms: 600,
        wait_time_ms: 80,
        pulse_duration_ms: 30,
        humidity_readout_period_ms: 40,
        current_readout_period_ms: 5,
        current_window_ms: 60,
        button_debounce_ms: 10,
        hold_threshold_ms: 200,
        ..VentConfig::default()
    };
    let mut ctl = VentController::new(config);
    let mut hw = Hw {
        outputs: [PinState::High; 8],
        byte: 0,
    };
    ctl.init(&mut hw, &mut NullSink);

    for &byte in script {
        hw.byte = byte;
        now = now.wrapping_add(u32::from(byte >> 4) * 5);
        ctl.tick(now, &mut hw, &mut NullSink);

        for id in RelayId::ALL {
            let s = ctl.relay_status(id);
            if !s.active {
                assert_eq!(s.pending_pulses, 0);
                assert_eq!(s.next_pulse_at, None);
            }
            let pin = match id {
                RelayId::Re1 => pins::RE1_PIN,
                RelayId::Re2 => pins::RE2_PIN,
                RelayId::Re3 => pins::RE3_PIN,
            };
            assert_eq!(hw.outputs[usize::from(pin)] == PinState::Low, s.active);
        }
    }
});
