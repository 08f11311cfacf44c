//! Shared flap / vent actuator (RE4).
//!
//! One physical output shared by every relay task.  Access is arbitrated
//! by [`VentActuator::request_pulse`]: the first caller while the actuator
//! is closed wins, everybody else gets `false` and retries on a later tick.
//! There is no queue and no owner field; the boolean is the lock.
//!
//! ## Pulse contract
//!
//! A pulse drives the output LOW and is closed by [`VentActuator::advance`]
//! exactly `pulse_ms` after it started.  Nothing cancels it except the
//! emergency path ([`VentActuator::abort_pulse`]).

use log::{info, warn};

use crate::app::ports::{GpioPort, PinState};
use crate::scheduler::{Millis, elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentState {
    Closed,
    Pulsing { since: Millis },
}

pub struct VentActuator {
    pin: u8,
    pulse_ms: Millis,
    state: VentState,
}

impl VentActuator {
    pub fn new(pin: u8, pulse_ms: Millis) -> Self {
        Self {
            pin,
            pulse_ms,
            state: VentState::Closed,
        }
    }

    /// Drive the output to its de-energised level and forget any pulse.
    pub fn init(&mut self, io: &mut impl GpioPort) {
        io.write_output(self.pin, PinState::High);
        self.state = VentState::Closed;
    }

    /// Start a pulse unless one is already in flight.
    /// Returns `true` if the pulse was started.
    pub fn request_pulse(&mut self, now: Millis, io: &mut impl GpioPort) -> bool {
        if self.is_pulsing() {
            return false;
        }
        io.write_output(self.pin, PinState::Low);
        self.state = VentState::Pulsing { since: now };
        info!("Vent pulse started");
        true
    }

    /// Close an expired pulse.  Returns `true` on the tick the pulse ends.
    pub fn advance(&mut self, now: Millis, io: &mut impl GpioPort) -> bool {
        match self.state {
            VentState::Pulsing { since } if elapsed(now, since) >= self.pulse_ms => {
                io.write_output(self.pin, PinState::High);
                self.state = VentState::Closed;
                info!("Vent pulse completed");
                true
            }
            _ => false,
        }
    }

    /// Force the output closed.  An in-flight pulse keeps its timer and
    /// still blocks new requests until it expires.
    pub fn ensure_idle(&mut self, io: &mut impl GpioPort) {
        io.write_output(self.pin, PinState::High);
    }

    /// Force the output closed and drop the in-flight pulse, if any.
    /// Returns `true` if a pulse was cut short.
    pub fn abort_pulse(&mut self, io: &mut impl GpioPort) -> bool {
        io.write_output(self.pin, PinState::High);
        let was_pulsing = self.is_pulsing();
        if was_pulsing {
            warn!("Vent pulse aborted");
        }
        self.state = VentState::Closed;
        was_pulsing
    }

    pub fn is_pulsing(&self) -> bool {
        matches!(self.state, VentState::Pulsing { .. })
    }

    pub fn state(&self) -> VentState {
        self.state
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }
}
