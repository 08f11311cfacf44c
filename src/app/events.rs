//! Outbound application events.
//!
//! The [`VentController`](super::service::VentController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (log to serial, count in a
//! test, etc.).

use crate::fsm::RelayId;
use crate::scheduler::Millis;

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Outputs initialised; all relays idle.
    Started,

    /// A relay went from idle to active.
    RelayActivated { relay: RelayId, cause: ActivationCause },

    /// A start request hit an already active relay and queued a pulse.
    PulseQueued { relay: RelayId, pending: u8 },

    /// A relay went from active to idle.
    RelayDeactivated { relay: RelayId, reason: OffReason },

    /// The vent actuator accepted a pulse on behalf of `relay`.
    VentPulseStarted { relay: RelayId },

    /// The vent actuator closed at the end of its pulse.
    VentPulseCompleted,

    /// Emergency all-off executed.
    AllOff { aborted_pulse: bool },

    HumiditySample { percent: f32 },

    HumidityUnavailable,

    /// The RE3 sampling window closed.
    CurrentWindowClosed { peak_ma: f32, released: bool },
}

/// What started a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationCause {
    Switch,
    Humidity,
    Current,
    Command,
}

/// Why a relay stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffReason {
    /// Run time over with no pulse owed.
    RunTimeElapsed,
    /// Motor current stayed below threshold for a whole window.
    CurrentDropped,
    /// Emergency all-off (long switch hold or command).
    AllOff,
    /// Explicit release command.
    Command,
}

/// Snapshot of one relay for status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayStatus {
    pub relay: RelayId,
    pub active: bool,
    pub started_at: Option<Millis>,
    pub pending_pulses: u8,
    pub next_pulse_at: Option<Millis>,
}
