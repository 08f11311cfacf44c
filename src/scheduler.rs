//! Polling-based timing primitives.
//!
//! Every timing decision in the controller is a pure function of the
//! monotonic millisecond clock handed to `tick()`.  Timestamps are `u32`
//! and wrap after ~49.7 days, so nothing here ever compares two absolute
//! timestamps directly:
//!
//! ```text
//!   elapsed  = now - since            (wrapping)
//!   due      = (now - deadline) < 2^31 (wrapping, "deadline is not ahead")
//! ```
//!
//! A [`PeriodicTimer`] replaces the timer callbacks of an RTOS: the owner
//! polls it each tick and acts when it reports a fire.

/// Monotonic timestamp / duration in milliseconds.
pub type Millis = u32;

/// Half the `u32` range.  Deadlines further ahead than this are
/// indistinguishable from deadlines in the past.
const HALF_RANGE: Millis = 1 << 31;

/// Milliseconds elapsed from `since` to `now`, tolerant of wraparound.
#[inline]
pub fn elapsed(now: Millis, since: Millis) -> Millis {
    now.wrapping_sub(since)
}

/// Timestamp `delay` milliseconds after `from` (wrapping).
#[inline]
pub fn deadline_after(from: Millis, delay: Millis) -> Millis {
    from.wrapping_add(delay)
}

/// True once `now` has reached or passed `deadline`.
#[inline]
pub fn is_due(now: Millis, deadline: Millis) -> bool {
    now.wrapping_sub(deadline) < HALF_RANGE
}

/// Fires whenever at least `period_ms` elapsed since the previous fire.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTimer {
    period_ms: Millis,
    last_fire: Millis,
}

impl PeriodicTimer {
    /// New timer whose reference point is the clock origin (t = 0).
    pub fn new(period_ms: Millis) -> Self {
        Self {
            period_ms,
            last_fire: 0,
        }
    }

    /// Poll the timer.  Returns `true` (and restarts the period at `now`)
    /// when the period has elapsed.
    pub fn poll(&mut self, now: Millis) -> bool {
        if elapsed(now, self.last_fire) >= self.period_ms {
            self.last_fire = now;
            true
        } else {
            false
        }
    }
}
