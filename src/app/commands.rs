//! Inbound commands to the controller.
//!
//! These represent requests from outside the polling loop (a console, a
//! test harness) that the [`VentController`](super::service::VentController)
//! applies exactly as it would the equivalent switch or sensor input.

use crate::fsm::RelayId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start the relay, or queue a vent pulse if it is already running.
    Trigger(RelayId),

    /// Switch the relay off now, dropping any owed pulses.
    Release(RelayId),

    /// Same as a long switch hold.
    AllOff,
}
