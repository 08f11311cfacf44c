//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ VentController (domain)
//! ```
//!
//! Driven adapters (GPIO, ADC, humidity sensor, event sinks) implement
//! these traits.  The [`VentController`](super::service::VentController)
//! consumes them via generics, so the domain core never touches hardware
//! directly and runs unchanged against mocks on the host.

pub use embedded_hal::digital::PinState;

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Digital I/O port
// ───────────────────────────────────────────────────────────────

/// Pin-level digital I/O addressed by board pin number.
pub trait GpioPort {
    /// Current level of an input pin.
    fn read_input(&mut self, pin: u8) -> PinState;

    /// Drive an output pin.  Implementations log failures; the control
    /// core has no recovery path for a stuck output.
    fn write_output(&mut self, pin: u8, level: PinState);
}

// ───────────────────────────────────────────────────────────────
// Sensor ports
// ───────────────────────────────────────────────────────────────

/// Raw ADC access.
pub trait AnalogPort {
    /// Raw conversion result.  An error means "no sample this time"; it
    /// must never be reported as a count, since any count maps to a current.
    fn read_analog(&mut self, pin: u8) -> Result<u16, SensorError>;
}

/// Relative humidity source.
pub trait HumidityPort {
    /// Relative humidity in percent.  An error means "no reading this
    /// time"; the caller skips the evaluation.
    fn read_humidity(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// In-memory pins for unit tests
// ───────────────────────────────────────────────────────────────
