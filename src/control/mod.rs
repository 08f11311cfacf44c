//! Environmental trigger evaluators.
//!
//! Evaluators sample a sensor on their own period and tell the controller
//! what to do with the relay they drive.  They never touch relays or the
//! vent actuator themselves.

pub mod current;
pub mod humidity;

pub use current::{CurrentAction, CurrentEvaluator};
pub use humidity::{HumidityEvaluator, HumidityOutcome};
