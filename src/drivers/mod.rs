//! Actuator and input drivers.

pub mod switch;
pub mod vent;
