//! End-to-end controller scenarios against mock hardware.

use hoodvent::app::commands::AppCommand;
use hoodvent::app::events::{ActivationCause, AppEvent, OffReason};
use hoodvent::app::ports::PinState;
use hoodvent::config::VentConfig;
use hoodvent::error::SensorError;
use hoodvent::fsm::RelayId;
use hoodvent::pins::{RE1_PIN, RE2_PIN, RE3_PIN, RE4_PIN, SW1_PIN, SW2_PIN};

use crate::mock_hw::{CURRENT_IDLE, CURRENT_RUNNING, Rig};

const STEP: u32 = 5;

fn rig() -> Rig {
    Rig::new(VentConfig::default())
}

fn pulse_starts(rig: &Rig) -> Vec<(u32, RelayId)> {
    rig.sink
        .events
        .iter()
        .filter_map(|(t, e)| match e {
            AppEvent::VentPulseStarted { relay } => Some((*t, *relay)),
            _ => None,
        })
        .collect()
}

fn tap(rig: &mut Rig, pin: u8, hold_until: u32) {
    rig.hw.press(pin);
    rig.run_until(hold_until, STEP);
    rig.hw.release(pin);
}

// ── Switch-driven relays ──────────────────────────────────────

#[test]
fn switch_press_runs_full_cycle() {
    let mut rig = rig();
    tap(&mut rig, SW1_PIN, 100);
    assert_eq!(rig.hw.level(RE1_PIN), Some(PinState::Low));

    rig.run_until(130_000, STEP);

    assert_eq!(
        rig.sink.times_of(|e| matches!(
            e,
            AppEvent::RelayActivated {
                relay: RelayId::Re1,
                cause: ActivationCause::Switch
            }
        )),
        vec![0]
    );
    assert_eq!(pulse_starts(&rig), vec![(5_000, RelayId::Re1)]);
    assert_eq!(
        rig.sink.times_of(|e| *e == AppEvent::VentPulseCompleted),
        vec![6_000]
    );
    assert_eq!(
        rig.sink.times_of(|e| *e
            == AppEvent::RelayDeactivated {
                relay: RelayId::Re1,
                reason: OffReason::RunTimeElapsed
            }),
        vec![120_000]
    );
    assert_eq!(rig.hw.level(RE1_PIN), Some(PinState::High));
    assert_eq!(rig.hw.level(RE4_PIN), Some(PinState::High));
}

#[test]
fn second_press_queues_a_deferred_pulse() {
    let mut rig = rig();
    tap(&mut rig, SW1_PIN, 100);
    rig.run_until(995, STEP);
    tap(&mut rig, SW1_PIN, 1_100);

    assert!(rig.sink.contains(&AppEvent::PulseQueued {
        relay: RelayId::Re1,
        pending: 1
    }));
    let status = rig.ctl.relay_status(RelayId::Re1);
    assert_eq!(status.started_at, Some(0));
    assert_eq!(status.pending_pulses, 1);
    assert!(!rig.ctl.vent().is_pulsing());

    rig.run_until(140_000, STEP);
    assert_eq!(
        pulse_starts(&rig),
        vec![(5_000, RelayId::Re1), (130_000, RelayId::Re1)]
    );
    assert_eq!(
        rig.sink
            .times_of(|e| matches!(e, AppEvent::RelayDeactivated { relay: RelayId::Re1, .. })),
        vec![130_000]
    );
}

#[test]
fn simultaneous_pulses_are_serialised_in_relay_order() {
    let mut rig = rig();
    rig.hw.press(SW1_PIN);
    rig.hw.press(SW2_PIN);
    rig.run_until(100, STEP);
    rig.hw.release(SW1_PIN);
    rig.hw.release(SW2_PIN);

    rig.run_until(121_000, STEP);
    assert_eq!(
        pulse_starts(&rig),
        vec![(5_000, RelayId::Re1), (6_000, RelayId::Re2)]
    );
    assert_eq!(
        rig.sink.times_of(|e| *e == AppEvent::VentPulseCompleted),
        vec![6_000, 7_000]
    );
    assert!(!rig.ctl.relay(RelayId::Re1).is_active());
    assert!(!rig.ctl.relay(RelayId::Re2).is_active());
}

// ── Emergency all-off ─────────────────────────────────────────

#[test]
fn long_hold_turns_everything_off_once() {
    let mut rig = rig();
    rig.ctl
        .handle_command(AppCommand::Trigger(RelayId::Re1), 0, &mut rig.hw, &mut rig.sink);
    rig.hw.press(SW2_PIN);
    rig.run_until(8_000, STEP);

    assert_eq!(
        rig.sink
            .times_of(|e| matches!(e, AppEvent::AllOff { .. })),
        vec![3_050]
    );
    assert!(rig.sink.contains(&AppEvent::RelayDeactivated {
        relay: RelayId::Re1,
        reason: OffReason::AllOff
    }));
    assert!(rig.sink.contains(&AppEvent::RelayDeactivated {
        relay: RelayId::Re2,
        reason: OffReason::AllOff
    }));
    assert_eq!(rig.hw.level(RE1_PIN), Some(PinState::High));
    assert_eq!(rig.hw.level(RE2_PIN), Some(PinState::High));
    assert!(pulse_starts(&rig).is_empty());

    // Release and press again: a normal start, hold re-armed.
    rig.hw.release(SW2_PIN);
    rig.run_until(8_100, STEP);
    tap(&mut rig, SW2_PIN, 8_300);
    assert!(rig.ctl.relay(RelayId::Re2).is_active());
}

#[test]
fn hold_during_pulse_aborts_it() {
    let mut rig = rig();
    tap(&mut rig, SW1_PIN, 100);
    rig.run_until(1_995, STEP);
    rig.hw.press(SW2_PIN);
    rig.run_until(5_500, STEP);

    assert_eq!(pulse_starts(&rig), vec![(5_000, RelayId::Re1)]);
    assert!(rig.sink.contains(&AppEvent::AllOff { aborted_pulse: true }));
    assert!(!rig.ctl.vent().is_pulsing());
    assert_eq!(rig.hw.level(RE4_PIN), Some(PinState::High));

    // RE2's opening pulse (due 7000) died with the relay.
    rig.run_until(20_000, STEP);
    assert_eq!(pulse_starts(&rig).len(), 1);
    assert!(
        rig.sink
            .times_of(|e| *e == AppEvent::VentPulseCompleted)
            .is_empty()
    );
}

// ── Humidity trigger ──────────────────────────────────────────

#[test]
fn humid_air_starts_and_extends_re1() {
    let mut rig = rig();
    rig.hw.humidity = Ok(85.0);
    rig.run_until(20_000, STEP);

    assert_eq!(
        rig.sink.times_of(|e| matches!(
            e,
            AppEvent::RelayActivated {
                relay: RelayId::Re1,
                cause: ActivationCause::Humidity
            }
        )),
        vec![10_000]
    );
    assert_eq!(
        rig.sink.times_of(|e| matches!(
            e,
            AppEvent::PulseQueued {
                relay: RelayId::Re1,
                pending: 1
            }
        )),
        vec![20_000]
    );

    rig.hw.humidity = Ok(40.0);
    rig.run_until(150_000, STEP);
    assert_eq!(
        pulse_starts(&rig),
        vec![(15_000, RelayId::Re1), (140_000, RelayId::Re1)]
    );
    assert!(!rig.ctl.relay(RelayId::Re1).is_active());
}

#[test]
fn missing_humidity_sensor_only_skips_samples() {
    let mut rig = rig();
    rig.hw.humidity = Err(SensorError::NotPresent);
    rig.run_until(30_000, STEP);
    assert_eq!(
        rig.sink
            .times_of(|e| *e == AppEvent::HumidityUnavailable),
        vec![10_000, 20_000, 30_000]
    );
    assert!(!rig.ctl.relay(RelayId::Re1).is_active());
}

#[test]
fn disabled_humidity_sensor_is_never_polled() {
    let mut rig = Rig::new(VentConfig {
        humidity_sensor_enabled: false,
        ..VentConfig::default()
    });
    rig.hw.humidity = Ok(99.0);
    rig.run_until(30_000, STEP);
    assert!(!rig.sink.events.iter().any(|(_, e)| matches!(
        e,
        AppEvent::HumiditySample { .. } | AppEvent::HumidityUnavailable
    )));
    assert!(!rig.ctl.relay(RelayId::Re1).is_active());
}

// ── Current trigger ───────────────────────────────────────────

#[test]
fn re3_follows_motor_current() {
    let mut rig = rig();
    rig.hw.adc = CURRENT_RUNNING;
    rig.run_until(299_995, STEP);

    assert_eq!(
        rig.sink.times_of(|e| matches!(
            e,
            AppEvent::RelayActivated {
                relay: RelayId::Re3,
                cause: ActivationCause::Current
            }
        )),
        vec![25]
    );
    assert_eq!(
        pulse_starts(&rig),
        vec![
            (5_025, RelayId::Re3),
            (135_025, RelayId::Re3),
            (265_025, RelayId::Re3)
        ]
    );
    assert_eq!(rig.hw.level(RE3_PIN), Some(PinState::Low));

    rig.hw.adc = CURRENT_IDLE;
    rig.run_until(320_000, STEP);

    let windows: Vec<(u32, bool)> = rig
        .sink
        .events
        .iter()
        .filter_map(|(t, e)| match e {
            AppEvent::CurrentWindowClosed { released, .. } => Some((*t, *released)),
            _ => None,
        })
        .collect();
    assert_eq!(windows.len(), 31);
    assert!(windows[..30].iter().all(|(_, released)| !released));
    assert_eq!(windows[30], (310_025, true));
    assert_eq!(
        rig.sink.times_of(|e| *e
            == AppEvent::RelayDeactivated {
                relay: RelayId::Re3,
                reason: OffReason::CurrentDropped
            }),
        vec![310_025]
    );
    assert_eq!(rig.hw.level(RE3_PIN), Some(PinState::High));
}

#[test]
fn failing_adc_leaves_re3_off() {
    let mut rig = rig();
    rig.hw.adc_fault = true;
    rig.run_until(30_000, STEP);

    assert!(!rig.ctl.relay(RelayId::Re3).is_active());
    assert_eq!(rig.hw.level(RE3_PIN), Some(PinState::High));
    assert!(pulse_starts(&rig).is_empty());

    // Readings resume: the motor is picked up on the next good sample.
    rig.hw.adc_fault = false;
    rig.hw.adc = CURRENT_RUNNING;
    rig.run_until(30_100, STEP);
    assert_eq!(rig.ctl.relay_status(RelayId::Re3).started_at, Some(30_025));
}

#[test]
fn all_off_with_motor_running_retriggers_re3() {
    let mut rig = rig();
    rig.hw.adc = CURRENT_RUNNING;
    rig.run_until(1_000, STEP);
    assert!(rig.ctl.relay(RelayId::Re3).is_active());

    rig.ctl
        .handle_command(AppCommand::AllOff, 1_005, &mut rig.hw, &mut rig.sink);
    assert!(!rig.ctl.relay(RelayId::Re3).is_active());

    rig.run_until(1_100, STEP);
    assert!(rig.ctl.relay(RelayId::Re3).is_active());
    assert_eq!(rig.ctl.relay_status(RelayId::Re3).started_at, Some(1_025));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn release_command_drops_owed_pulses() {
    let mut rig = rig();
    let (hw, sink) = (&mut rig.hw, &mut rig.sink);
    rig.ctl.handle_command(AppCommand::Trigger(RelayId::Re2), 0, hw, sink);
    rig.ctl.handle_command(AppCommand::Trigger(RelayId::Re2), 10, hw, sink);
    rig.ctl.handle_command(AppCommand::Release(RelayId::Re2), 20, hw, sink);

    let status = rig.ctl.relay_status(RelayId::Re2);
    assert!(!status.active);
    assert_eq!(status.pending_pulses, 0);
    assert_eq!(status.next_pulse_at, None);
    assert!(rig.sink.contains(&AppEvent::RelayDeactivated {
        relay: RelayId::Re2,
        reason: OffReason::Command
    }));

    rig.now = 20;
    rig.run_until(10_000, STEP);
    assert!(pulse_starts(&rig).is_empty());
}
