//! Monotonic millisecond clock.
//!
//! - **`espidf` feature**: wraps `esp_timer_get_time()` from the ESP-IDF
//!   high-resolution timer (microsecond precision, monotonic).
//! - **host**: uses `std::time::Instant` for tests and simulation.
//!
//! The controller works on wrapping `u32` milliseconds, so the clock
//! simply truncates; the wrap every ~49.7 days is harmless.

use crate::scheduler::Millis;

pub struct MonotonicClock {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, wrapping at `u32::MAX`.
    #[cfg(feature = "espidf")]
    pub fn now_ms(&self) -> Millis {
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        (us / 1_000) as Millis
    }

    /// Milliseconds since construction, wrapping at `u32::MAX`.
    #[cfg(not(feature = "espidf"))]
    pub fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}
