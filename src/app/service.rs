//! Controller service: the hexagonal core.
//!
//! [`VentController`] owns the vent actuator, the three relay tasks, the
//! switch debouncer and both trigger evaluators.  All I/O flows through
//! port traits injected at call sites, so the whole controller runs
//! against mock adapters on the host.
//!
//! ```text
//!   GpioPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//! AnalogPort ──▶ │        VentController         │
//! HumidityPort ─▶│ switches · triggers · relays  │ ──▶ GpioPort (outputs)
//!                └──────────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! 1. vent actuator closes a finished pulse
//! 2. switches (presses start relays, a long hold is the all-off)
//! 3. humidity evaluator (RE1)
//! 4. current evaluator (RE3)
//! 5. relay tasks RE1, RE2, RE3: the first one in this order wins the
//!    vent actuator when several pulses fall due on the same tick

use log::{debug, info, warn};

use crate::config::VentConfig;
use crate::control::{CurrentAction, CurrentEvaluator, HumidityEvaluator, HumidityOutcome};
use crate::drivers::switch::{SwitchDebouncer, SwitchEvent};
use crate::drivers::vent::VentActuator;
use crate::fsm::{PulseDispatch, RelayId, RelayMode, RelayTask, RelayTiming, TriggerOutcome};
use crate::pins;
use crate::scheduler::Millis;
use crate::sensors::current::CurrentSensor;

use super::commands::AppCommand;
use super::events::{ActivationCause, AppEvent, OffReason, RelayStatus};
use super::ports::{AnalogPort, EventSink, GpioPort, HumidityPort};

// ───────────────────────────────────────────────────────────────
// VentController
// ───────────────────────────────────────────────────────────────

pub struct VentController {
    config: VentConfig,
    vent: VentActuator,
    relays: [RelayTask; RelayId::COUNT],
    switches: SwitchDebouncer,
    humidity: HumidityEvaluator,
    current: CurrentEvaluator,
}

impl VentController {
    /// Build the controller from configuration.  Outputs are not touched
    /// until [`init`](Self::init).
    pub fn new(config: VentConfig) -> Self {
        let timing = RelayTiming::from(&config);
        let relay = |id, pin, mode| RelayTask::new(id, pin, mode, timing);

        Self {
            vent: VentActuator::new(pins::RE4_PIN, config.pulse_duration_ms),
            relays: [
                relay(RelayId::Re1, pins::RE1_PIN, RelayMode::AutoOff),
                relay(RelayId::Re2, pins::RE2_PIN, RelayMode::AutoOff),
                // RE3 follows the motor current, never its own timer.
                relay(RelayId::Re3, pins::RE3_PIN, RelayMode::HoldUntilReleased),
            ],
            switches: SwitchDebouncer::new(
                pins::SW1_PIN,
                pins::SW2_PIN,
                config.button_debounce_ms,
                config.hold_threshold_ms,
            ),
            humidity: HumidityEvaluator::new(
                config.humidity_readout_period_ms,
                config.humidity_threshold_pct,
                config.humidity_sensor_enabled,
            ),
            current: CurrentEvaluator::new(
                CurrentSensor::new(pins::ACS712_PIN, config.current_calibration),
                config.current_readout_period_ms,
                config.current_window_ms,
                config.current_threshold_ma,
            ),
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output de-energised and reset all state to idle.
    pub fn init(&mut self, io: &mut impl GpioPort, sink: &mut impl EventSink) {
        for relay in &mut self.relays {
            relay.init(io);
        }
        self.vent.init(io);
        sink.emit(&AppEvent::Started);
        info!("Controller started: RE1..RE4 off");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle at `now`.
    ///
    /// `hw` satisfies every input port **and** drives the outputs, which
    /// avoids a double mutable borrow while keeping the boundary explicit.
    pub fn tick(
        &mut self,
        now: Millis,
        hw: &mut (impl GpioPort + AnalogPort + HumidityPort),
        sink: &mut impl EventSink,
    ) {
        // 1. Vent pulse completion
        if self.vent.advance(now, hw) {
            sink.emit(&AppEvent::VentPulseCompleted);
        }

        // 2. Switches
        for event in self.switches.poll(now, hw) {
            match event {
                SwitchEvent::Pressed(sw) => {
                    self.request_start(sw.relay(), ActivationCause::Switch, now, hw, sink);
                }
                SwitchEvent::Held(sw) => {
                    info!("{} held: all relays off", sw);
                    self.all_off(hw, sink);
                }
            }
        }

        // 3. Humidity → RE1
        match self.humidity.poll(now, hw) {
            Some(HumidityOutcome::Sample {
                percent,
                above_threshold,
            }) => {
                sink.emit(&AppEvent::HumiditySample { percent });
                if above_threshold {
                    info!("Humidity {:.1} % above threshold", percent);
                    self.request_start(RelayId::Re1, ActivationCause::Humidity, now, hw, sink);
                }
            }
            Some(HumidityOutcome::Unavailable(_)) => sink.emit(&AppEvent::HumidityUnavailable),
            None => {}
        }

        // 4. Current → RE3
        let re3_active = self.relays[RelayId::Re3.index()].is_active();
        match self.current.poll(now, hw, re3_active) {
            Some(CurrentAction::Trigger { milliamps }) => {
                info!("Current {:.0} mA above threshold", milliamps);
                self.request_start(RelayId::Re3, ActivationCause::Current, now, hw, sink);
            }
            Some(CurrentAction::Hold { peak_ma }) => {
                debug!("RE3 window closed, peak {:.0} mA: holding", peak_ma);
                sink.emit(&AppEvent::CurrentWindowClosed {
                    peak_ma,
                    released: false,
                });
            }
            Some(CurrentAction::Release { peak_ma }) => {
                sink.emit(&AppEvent::CurrentWindowClosed {
                    peak_ma,
                    released: true,
                });
                info!("Relay OFF due to current drop: RE3 (peak {:.0} mA)", peak_ma);
                self.stop(RelayId::Re3, OffReason::CurrentDropped, hw, sink);
            }
            None => {}
        }

        // 5. Relay schedules, fixed order
        for relay in &mut self.relays {
            let out = relay.advance(now, &mut self.vent, hw);
            if out.pulse == PulseDispatch::Started {
                sink.emit(&AppEvent::VentPulseStarted { relay: relay.id() });
            }
            if out.deactivated {
                sink.emit(&AppEvent::RelayDeactivated {
                    relay: relay.id(),
                    reason: OffReason::RunTimeElapsed,
                });
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an external command at `now`.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: Millis,
        io: &mut impl GpioPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Trigger(id) => {
                self.request_start(id, ActivationCause::Command, now, io, sink);
            }
            AppCommand::Release(id) => {
                if !self.stop(id, OffReason::Command, io, sink) {
                    debug!("Release {}: already idle", id);
                }
            }
            AppCommand::AllOff => self.all_off(io, sink),
        }
    }

    /// Emergency stop: every relay off, vent actuator closed.
    ///
    /// With `all_off_aborts_pulse` the in-flight pulse is dropped as well;
    /// otherwise only the output is forced closed and the pulse timer
    /// still blocks new pulses until it expires.
    pub fn all_off(&mut self, io: &mut impl GpioPort, sink: &mut impl EventSink) {
        for id in RelayId::ALL {
            self.stop(id, OffReason::AllOff, io, sink);
        }
        let aborted_pulse = if self.config.all_off_aborts_pulse {
            self.vent.abort_pulse(io)
        } else {
            self.vent.ensure_idle(io);
            false
        };
        if aborted_pulse {
            warn!("All-off cut a vent pulse short");
        }
        sink.emit(&AppEvent::AllOff { aborted_pulse });
        info!("All relays turned OFF");
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn relay(&self, id: RelayId) -> &RelayTask {
        &self.relays[id.index()]
    }

    pub fn relay_status(&self, id: RelayId) -> RelayStatus {
        let relay = self.relay(id);
        RelayStatus {
            relay: id,
            active: relay.is_active(),
            started_at: relay.started_at(),
            pending_pulses: relay.pending_pulses(),
            next_pulse_at: relay.next_pulse_at(),
        }
    }

    pub fn vent(&self) -> &VentActuator {
        &self.vent
    }

    pub fn config(&self) -> &VentConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn request_start(
        &mut self,
        id: RelayId,
        cause: ActivationCause,
        now: Millis,
        io: &mut impl GpioPort,
        sink: &mut impl EventSink,
    ) {
        match self.relays[id.index()].trigger(now, io) {
            TriggerOutcome::Activated => {
                sink.emit(&AppEvent::RelayActivated { relay: id, cause });
            }
            TriggerOutcome::Queued { pending } => {
                sink.emit(&AppEvent::PulseQueued { relay: id, pending });
            }
        }
    }

    fn stop(
        &mut self,
        id: RelayId,
        reason: OffReason,
        io: &mut impl GpioPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let stopped = self.relays[id.index()].deactivate(io);
        if stopped {
            sink.emit(&AppEvent::RelayDeactivated { relay: id, reason });
        }
        stopped
    }
}
