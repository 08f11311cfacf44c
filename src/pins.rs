//! GPIO / peripheral pin assignments for the hood controller board.
//!
//! Single source of truth: the controller and the hardware adapter both
//! reference this module rather than hard-coding pin numbers.
//!
//! Relay module inputs are active-low: LOW energises the coil.

// ---------------------------------------------------------------------------
// Wall switches (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// SW1: manual start for the RE1 exhaust circuit.
pub const SW1_PIN: u8 = 2;
/// SW2: manual start for the RE2 exhaust circuit.
pub const SW2_PIN: u8 = 3;

// ---------------------------------------------------------------------------
// Relay outputs
// ---------------------------------------------------------------------------

/// RE1: central fan, switch- and humidity-triggered.
pub const RE1_PIN: u8 = 4;
/// RE2: central fan second circuit, switch-triggered.
pub const RE2_PIN: u8 = 5;
/// RE3: follows the hood motor current.
pub const RE3_PIN: u8 = 6;
/// RE4: shared flap / vent actuator, pulsed only.
pub const RE4_PIN: u8 = 7;

/// Every output driven at start-up.
pub const OUTPUT_PINS: [u8; 4] = [RE1_PIN, RE2_PIN, RE3_PIN, RE4_PIN];

// ---------------------------------------------------------------------------
// Analog
// ---------------------------------------------------------------------------

/// ACS712 5 A current sensor on the hood motor supply.
pub const ACS712_PIN: u8 = 14;

// ---------------------------------------------------------------------------
// I²C bus (BME280 humidity sensor, SDA GPIO8 / SCL GPIO9)
// ---------------------------------------------------------------------------

/// BME280 with SDO tied to GND.
pub const BME280_ADDR: u8 = 0x76;
