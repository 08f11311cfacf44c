//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                  | Connects to                 |
//! |------------|-----------------------------|-----------------------------|
//! | `hardware` | GpioPort                    | embedded-hal digital pins   |
//! |            | AnalogPort, HumidityPort    | ADC / BME280 (delegated)    |
//! | `log_sink` | EventSink                   | Serial log output           |
//! | `time`     | (clock)                     | ESP32 system timer / host   |

pub mod hardware;
pub mod log_sink;
pub mod time;
