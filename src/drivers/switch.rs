//! Wall switch debouncer with hold detection.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  The controller polls
//! both inputs from the main loop; there is no ISR.
//!
//! ## Gestures
//!
//! | Gesture | Condition                            | Event                  |
//! |---------|--------------------------------------|------------------------|
//! | Press   | HIGH → LOW edge between evaluations  | `SwitchEvent::Pressed` |
//! | Hold    | LOW continuously > `hold_ms`         | `SwitchEvent::Held`    |
//!
//! A hold fires once and is re-armed only after the switch is released.
//! All switches are evaluated together at most once per `debounce_ms`.

use core::fmt;

use heapless::Vec;
use log::{debug, info};

use crate::app::ports::{GpioPort, PinState};
use crate::fsm::RelayId;
use crate::scheduler::{Millis, elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchId {
    Sw1,
    Sw2,
}

impl SwitchId {
    pub const COUNT: usize = 2;
    pub const ALL: [Self; Self::COUNT] = [Self::Sw1, Self::Sw2];

    /// Relay started by a press on this switch.
    pub fn relay(self) -> RelayId {
        match self {
            Self::Sw1 => RelayId::Re1,
            Self::Sw2 => RelayId::Re2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sw1 => "SW1",
            Self::Sw2 => "SW2",
        }
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchEvent {
    Pressed(SwitchId),
    /// Held past the threshold: emergency all-off.
    Held(SwitchId),
}

/// Events from one evaluation.  Each switch adds at most one press and
/// one hold per evaluation, so a push can never exceed this capacity.
pub type SwitchEvents = Vec<SwitchEvent, { SwitchId::COUNT * 2 }>;

fn record(events: &mut SwitchEvents, event: SwitchEvent) {
    if events.push(event).is_err() {
        unreachable!("switch event capacity exceeded");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Released,
    Down { since: Millis },
    /// Hold already reported; waits for release.
    Latched,
}

struct Channel {
    id: SwitchId,
    pin: u8,
    last_level: PinState,
    hold: HoldState,
}

pub struct SwitchDebouncer {
    channels: [Channel; SwitchId::COUNT],
    debounce_ms: Millis,
    hold_ms: Millis,
    last_eval: Option<Millis>,
}

impl SwitchDebouncer {
    pub fn new(sw1_pin: u8, sw2_pin: u8, debounce_ms: Millis, hold_ms: Millis) -> Self {
        let channel = |id, pin| Channel {
            id,
            pin,
            last_level: PinState::High,
            hold: HoldState::Released,
        };
        Self {
            channels: [channel(SwitchId::Sw1, sw1_pin), channel(SwitchId::Sw2, sw2_pin)],
            debounce_ms,
            hold_ms,
            last_eval: None,
        }
    }

    /// Sample both switches unless the debounce interval since the last
    /// evaluation has not passed yet.
    pub fn poll(&mut self, now: Millis, io: &mut impl GpioPort) -> SwitchEvents {
        let mut events = SwitchEvents::new();
        if let Some(last) = self.last_eval {
            if elapsed(now, last) < self.debounce_ms {
                return events;
            }
        }
        self.last_eval = Some(now);

        for ch in &mut self.channels {
            let level = io.read_input(ch.pin);

            if ch.last_level == PinState::High && level == PinState::Low {
                info!("Switch pressed: {}", ch.id);
                record(&mut events, SwitchEvent::Pressed(ch.id));
            }

            ch.hold = match (level, ch.hold) {
                (PinState::High, _) => HoldState::Released,
                (PinState::Low, HoldState::Released) => HoldState::Down { since: now },
                (PinState::Low, HoldState::Down { since })
                    if elapsed(now, since) > self.hold_ms =>
                {
                    info!("Switch held: {} ({} ms)", ch.id, elapsed(now, since));
                    record(&mut events, SwitchEvent::Held(ch.id));
                    HoldState::Latched
                }
                (PinState::Low, held) => held,
            };

            ch.last_level = level;
        }

        if !events.is_empty() {
            debug!("Switch events: {:?}", events);
        }
        events
    }

    /// Whether `id` is currently seen as pressed.
    pub fn is_down(&self, id: SwitchId) -> bool {
        self.channels
            .iter()
            .any(|ch| ch.id == id && ch.last_level == PinState::Low)
    }
}
