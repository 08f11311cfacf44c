//! Hood ventilation controller library.
//!
//! Exposes the pure-logic control core for integration testing together
//! with the hardware adapters the firmware binary wires up.  ESP-IDF
//! specific code is guarded by the `espidf` feature within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;

pub use app::service::VentController;
pub use error::{Error, Result};
