//! Relay task state machine.
//!
//! Each exhaust relay is a two-state machine:
//!
//! ```text
//!            activate(now)
//!   ┌──────┐ ───────────────▶ ┌────────────────────────────────────┐
//!   │ Idle │                  │ Active { since, pending, next }    │
//!   └──────┘ ◀─────────────── └────────────────────────────────────┘
//!            deactivate()          advance(now, vent) every tick
//! ```
//!
//! The pulse bookkeeping lives inside the `Active` variant, so an idle
//! relay cannot carry pending pulses or a scheduled pulse.
//!
//! While active, `advance` first dispatches a due vent pulse (retrying
//! every tick while the shared actuator is busy), then evaluates the
//! run timer.  An auto-off relay whose run time is over stays on as long
//! as it still owes the actuator a pulse.

pub mod relay_task;

use core::fmt;

use crate::config::VentConfig;
use crate::scheduler::Millis;

pub use relay_task::RelayTask;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The three controlled exhaust relays, in per-tick processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RelayId {
    Re1 = 0,
    Re2 = 1,
    Re3 = 2,
}

impl RelayId {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; Self::COUNT] = [Self::Re1, Self::Re2, Self::Re3];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Re1 => "RE1",
            Self::Re2 => "RE2",
            Self::Re3 => "RE3",
        }
    }
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

/// How a relay leaves the `Active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    /// Switches itself off once the run time is over and no vent pulse
    /// is owed.
    AutoOff,
    /// Stays on until its owner calls `deactivate()`; pulses the vent
    /// periodically meanwhile.
    HoldUntilReleased,
}

/// Timing parameters copied out of [`VentConfig`] at construction.
#[derive(Debug, Clone, Copy)]
pub struct RelayTiming {
    pub flap_opening_ms: Millis,
    pub run_time_ms: Millis,
    pub wait_time_ms: Millis,
}

impl RelayTiming {
    /// Interval between the run timer expiring and a follow-up pulse.
    pub fn follow_up_ms(&self) -> Millis {
        self.run_time_ms.saturating_add(self.wait_time_ms)
    }
}

impl From<&VentConfig> for RelayTiming {
    fn from(c: &VentConfig) -> Self {
        Self {
            flap_opening_ms: c.flap_opening_ms,
            run_time_ms: c.run_time_ms,
            wait_time_ms: c.wait_time_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Why a pulse is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseKind {
    /// First pulse after activation, opens the flap once the fan runs.
    /// Not counted in `pending_pulses`.
    Opening,
    /// Serves one queued request (or the periodic pulse of a held relay).
    Queued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledPulse {
    pub due: Millis,
    pub kind: PulseKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Active {
        /// Activation time; the run timer counts from here and is never
        /// restarted by later requests.
        since: Millis,
        pending_pulses: u8,
        next_pulse: Option<ScheduledPulse>,
    },
}

// ---------------------------------------------------------------------------
// Tick outcomes
// ---------------------------------------------------------------------------

/// Result of a start request against a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The relay was idle and is now active with its opening pulse armed.
    Activated,
    /// The relay was already active; one more pulse was queued.
    Queued { pending: u8 },
}

/// What happened to the scheduled pulse during `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseDispatch {
    #[default]
    NotDue,
    /// The actuator accepted the pulse.
    Started,
    /// The pulse was due but the actuator was busy; retried next tick.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advance {
    pub pulse: PulseDispatch,
    /// The run timer switched the relay off this tick.
    pub deactivated: bool,
}
