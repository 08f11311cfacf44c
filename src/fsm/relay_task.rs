//! One exhaust relay and its vent pulse schedule.

use log::{debug, info};

use super::{
    Advance, PulseDispatch, PulseKind, RelayId, RelayMode, RelayState, RelayTiming,
    ScheduledPulse, TriggerOutcome,
};
use crate::app::ports::{GpioPort, PinState};
use crate::drivers::vent::VentActuator;
use crate::scheduler::{Millis, deadline_after, elapsed, is_due};

pub struct RelayTask {
    id: RelayId,
    pin: u8,
    mode: RelayMode,
    timing: RelayTiming,
    state: RelayState,
}

impl RelayTask {
    pub fn new(id: RelayId, pin: u8, mode: RelayMode, timing: RelayTiming) -> Self {
        Self {
            id,
            pin,
            mode,
            timing,
            state: RelayState::Idle,
        }
    }

    /// Drive the output de-energised and reset to `Idle`.
    pub fn init(&mut self, io: &mut impl GpioPort) {
        io.write_output(self.pin, PinState::High);
        self.state = RelayState::Idle;
    }

    // ── Transitions ───────────────────────────────────────────

    /// Idle → Active.  Energises the relay (output LOW) and starts the run
    /// timer with empty pulse bookkeeping.  Returns `false` without any
    /// change if the relay is already active.
    pub fn activate(&mut self, now: Millis, io: &mut impl GpioPort) -> bool {
        if self.is_active() {
            return false;
        }
        io.write_output(self.pin, PinState::Low);
        self.state = RelayState::Active {
            since: now,
            pending_pulses: 0,
            next_pulse: None,
        };
        info!("Relay ON: {}", self.id);
        true
    }

    /// Active → Idle.  De-energises the relay and drops all pulse
    /// bookkeeping.  No-op on an idle relay.
    pub fn deactivate(&mut self, io: &mut impl GpioPort) -> bool {
        if !self.is_active() {
            return false;
        }
        io.write_output(self.pin, PinState::High);
        self.state = RelayState::Idle;
        info!("Relay OFF: {}", self.id);
        true
    }

    // ── Requests ──────────────────────────────────────────────

    /// Start request from a switch or trigger evaluator.
    ///
    /// An idle relay is activated with its opening pulse armed
    /// `flap_opening_ms` from now.  An active relay queues one more pulse
    /// instead; its run timer keeps counting from the first activation.
    pub fn trigger(&mut self, now: Millis, io: &mut impl GpioPort) -> TriggerOutcome {
        if !self.activate(now, io) {
            return TriggerOutcome::Queued {
                pending: self.queue_pulse(),
            };
        }
        let opening = ScheduledPulse {
            due: deadline_after(now, self.timing.flap_opening_ms),
            kind: PulseKind::Opening,
        };
        if let RelayState::Active { next_pulse, .. } = &mut self.state {
            *next_pulse = Some(opening);
        }
        TriggerOutcome::Activated
    }

    /// Queue one extra vent pulse on an active relay.  If nothing is
    /// scheduled yet, the pulse is deferred until just after the nominal
    /// run window.  Returns the pending count (0 for an idle relay, which
    /// is left untouched).
    pub fn queue_pulse(&mut self) -> u8 {
        let follow_up_ms = self.timing.follow_up_ms();
        match &mut self.state {
            RelayState::Idle => 0,
            RelayState::Active {
                since,
                pending_pulses,
                next_pulse,
            } => {
                *pending_pulses = pending_pulses.saturating_add(1);
                if next_pulse.is_none() {
                    *next_pulse = Some(ScheduledPulse {
                        due: deadline_after(*since, follow_up_ms),
                        kind: PulseKind::Queued,
                    });
                }
                debug!("Queued vent pulse for {} (pending={})", self.id, pending_pulses);
                *pending_pulses
            }
        }
    }

    // ── Per-tick processing ───────────────────────────────────

    /// Advance this relay by one tick: dispatch a due vent pulse, then
    /// evaluate the run timer.
    pub fn advance(
        &mut self,
        now: Millis,
        vent: &mut VentActuator,
        io: &mut impl GpioPort,
    ) -> Advance {
        let timing = self.timing;
        let mode = self.mode;
        let RelayState::Active {
            since,
            pending_pulses,
            next_pulse,
        } = &mut self.state
        else {
            return Advance::default();
        };
        let mut out = Advance::default();

        // 1. Scheduled pulse dispatch.
        if let Some(pulse) = *next_pulse {
            if is_due(now, pulse.due) {
                if vent.request_pulse(now, io) {
                    out.pulse = PulseDispatch::Started;
                    let periodic = Some(ScheduledPulse {
                        due: deadline_after(now, timing.follow_up_ms()),
                        kind: PulseKind::Queued,
                    });
                    *next_pulse = match (mode, pulse.kind) {
                        (RelayMode::HoldUntilReleased, _) => {
                            *pending_pulses = pending_pulses.saturating_sub(1);
                            periodic
                        }
                        (RelayMode::AutoOff, PulseKind::Opening) => {
                            (*pending_pulses > 0).then_some(ScheduledPulse {
                                due: deadline_after(*since, timing.follow_up_ms()),
                                kind: PulseKind::Queued,
                            })
                        }
                        (RelayMode::AutoOff, PulseKind::Queued) => {
                            *pending_pulses = pending_pulses.saturating_sub(1);
                            if *pending_pulses > 0 { periodic } else { None }
                        }
                    };
                    info!("{}: vent pulse dispatched (pending={})", self.id, pending_pulses);
                } else {
                    out.pulse = PulseDispatch::Busy;
                    debug!("{}: vent busy, retrying next tick", self.id);
                }
            }
        }

        // 2. Auto-off, unless the relay still owes the actuator a pulse.
        if mode == RelayMode::AutoOff && elapsed(now, *since) >= timing.run_time_ms {
            if *pending_pulses == 0 && next_pulse.is_none() {
                out.deactivated = true;
            } else if next_pulse.is_none() {
                *next_pulse = Some(ScheduledPulse {
                    due: deadline_after(now, timing.wait_time_ms),
                    kind: PulseKind::Queued,
                });
            }
        }

        if out.deactivated {
            self.deactivate(io);
        }
        out
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn id(&self) -> RelayId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn mode(&self) -> RelayMode {
        self.mode
    }

    pub fn auto_off(&self) -> bool {
        self.mode == RelayMode::AutoOff
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RelayState::Active { .. })
    }

    /// Activation time, if active.
    pub fn started_at(&self) -> Option<Millis> {
        match self.state {
            RelayState::Active { since, .. } => Some(since),
            RelayState::Idle => None,
        }
    }

    pub fn pending_pulses(&self) -> u8 {
        match self.state {
            RelayState::Active { pending_pulses, .. } => pending_pulses,
            RelayState::Idle => 0,
        }
    }

    pub fn next_pulse(&self) -> Option<ScheduledPulse> {
        match self.state {
            RelayState::Active { next_pulse, .. } => next_pulse,
            RelayState::Idle => None,
        }
    }

    pub fn next_pulse_at(&self) -> Option<Millis> {
        self.next_pulse().map(|p| p.due)
    }
}
