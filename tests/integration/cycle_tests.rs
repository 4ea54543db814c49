//! Integration tests for the CycleController → ports pipeline.
//!
//! Each test drives whole cycles against the recording mocks and checks
//! the resulting command history and sleep decisions.

use std::time::Duration;

use crate::mock_hw::{mock_device, take_calls, Call, RecordingSink};

use co2monitor::app::controller::{CycleController, CycleOutcome};
use co2monitor::app::events::AppEvent;
use co2monitor::config::MonitorConfig;
use co2monitor::cycle::state::CycleState;
use co2monitor::cycle::{Co2Level, SleepDirective, SleepReason};
use co2monitor::error::{Error, SensorError};

const SEC: Duration = Duration::from_secs(1);

fn slept(outcome: CycleOutcome) -> (Co2Level, SleepDirective, SleepReason) {
    match outcome {
        CycleOutcome::Slept {
            level,
            directive,
            reason,
            ..
        } => (level, directive, reason),
        other => panic!("expected a sleep, got {:?}", other),
    }
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn cold_boot_setup_restarts_sensor_measurement() {
    let (mut dev, log) = mock_device();
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());

    ctl.setup(&mut dev, &mut sink).unwrap();

    assert_eq!(
        take_calls(&log),
        vec![
            Call::LedOff,
            Call::LedOn,
            Call::Silence,
            Call::Wait(SEC),
            Call::SensorInit,
            Call::Wait(SEC),
            Call::SensorStop,
            Call::Wait(SEC),
            Call::SensorStart,
            Call::LedOff,
        ]
    );
    assert!(matches!(sink.events[..], [AppEvent::Started { resumed: false }]));
    assert!(!ctl.state().stopped);
}

#[test]
fn resumed_boot_defers_start_to_first_cycle() {
    let (mut dev, log) = mock_device();
    let mut sink = RecordingSink::default();
    let state = CycleState {
        loop_count: 4,
        successful_measurement_count: 4,
        co2_high_count: 0,
        stopped: true,
        first_measure_pending: false,
    };
    let mut ctl = CycleController::resume(MonitorConfig::default(), state);

    ctl.setup(&mut dev, &mut sink).unwrap();
    let setup_calls = take_calls(&log);
    assert!(!setup_calls.contains(&Call::SensorStart));
    assert!(!setup_calls.contains(&Call::SensorStop));

    ctl.iterate(&mut dev, &mut sink).unwrap();
    let calls = take_calls(&log);
    assert_eq!(calls.first(), Some(&Call::SensorStart));
    assert_eq!(ctl.state().loop_count, 5);
    assert_eq!(ctl.state().successful_measurement_count, 5);
}

// ── Scenario A: escalation and sleep depth ────────────────────

#[test]
fn escalation_sequence_picks_sleep_depths() {
    let (mut dev, log) = mock_device();
    dev.sensor = dev.sensor.with_co2(&[800, 2600, 1900, 1000]);
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());
    ctl.setup(&mut dev, &mut sink).unwrap();
    take_calls(&log);

    let mut levels = Vec::new();
    let mut directives = Vec::new();
    let mut counters = Vec::new();
    for _ in 0..4 {
        let (level, directive, _) = slept(ctl.iterate(&mut dev, &mut sink).unwrap());
        levels.push(level);
        directives.push(directive);
        counters.push(ctl.state().co2_high_count);
    }

    assert_eq!(
        levels,
        vec![Co2Level::Normal, Co2Level::Danger, Co2Level::High, Co2Level::Normal]
    );
    assert_eq!(
        directives,
        vec![
            SleepDirective::deep(300),
            SleepDirective::light(60),
            SleepDirective::light(60),
            SleepDirective::deep(300),
        ]
    );
    assert_eq!(counters, vec![0, 0, 0, 0]);

    let calls = take_calls(&log);
    let signals: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, Call::Signal { .. }))
        .cloned()
        .collect();
    assert_eq!(
        signals,
        vec![
            Call::Signal { intensity: 30, sustained: true },
            Call::Signal { intensity: 5, sustained: false },
        ]
    );
    let sleeps: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, Call::LightSleep(_) | Call::DeepSleep(_)))
        .cloned()
        .collect();
    assert_eq!(
        sleeps,
        vec![
            Call::DeepSleep(Duration::from_secs(300)),
            Call::LightSleep(Duration::from_secs(60)),
            Call::LightSleep(Duration::from_secs(60)),
            Call::DeepSleep(Duration::from_secs(300)),
        ]
    );
}

#[test]
fn sensor_is_stopped_before_every_sleep_and_restarted_after() {
    let (mut dev, log) = mock_device();
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());
    ctl.setup(&mut dev, &mut sink).unwrap();
    take_calls(&log);

    ctl.iterate(&mut dev, &mut sink).unwrap();
    let first = take_calls(&log);
    assert_eq!(first.first(), Some(&Call::SensorReady(true)));
    let stop = first.iter().position(|c| *c == Call::SensorStop).unwrap();
    let sleep = first
        .iter()
        .position(|c| matches!(c, Call::DeepSleep(_)))
        .unwrap();
    assert!(stop < sleep);
    assert!(ctl.state().stopped);

    ctl.iterate(&mut dev, &mut sink).unwrap();
    let second = take_calls(&log);
    assert_eq!(second.first(), Some(&Call::SensorStart));
}

#[test]
fn deep_sleep_retains_state_first() {
    let (mut dev, log) = mock_device();
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());
    ctl.setup(&mut dev, &mut sink).unwrap();
    take_calls(&log);

    ctl.iterate(&mut dev, &mut sink).unwrap();
    let calls = take_calls(&log);
    let n = calls.len();
    assert_eq!(calls[n - 1], Call::DeepSleep(Duration::from_secs(300)));
    match &calls[n - 2] {
        Call::Retain(state) => {
            assert_eq!(state.loop_count, 1);
            assert_eq!(state.successful_measurement_count, 1);
            assert!(state.stopped);
        }
        other => panic!("expected retain before deep sleep, got {:?}", other),
    }
}

// ── First-measurement recheck ─────────────────────────────────

#[test]
fn untrusted_first_measurement_rechecks_once() {
    let (mut dev, _log) = mock_device();
    dev.sensor = dev.sensor.with_co2(&[800, 800]);
    let mut sink = RecordingSink::default();
    let config = MonitorConfig {
        first_measure_untrusted: true,
        ..MonitorConfig::default()
    };
    let mut ctl = CycleController::new(config);
    ctl.setup(&mut dev, &mut sink).unwrap();

    let (_, d1, r1) = slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    assert_eq!((d1, r1), (SleepDirective::light(60), SleepReason::FirstMeasure));
    let (_, d2, r2) = slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    assert_eq!((d2, r2), (SleepDirective::deep(300), SleepReason::Clear));
}

#[test]
fn escalated_first_measurement_uses_up_recheck() {
    let (mut dev, _log) = mock_device();
    dev.sensor = dev.sensor.with_co2(&[2000, 800]);
    let mut sink = RecordingSink::default();
    let config = MonitorConfig {
        first_measure_untrusted: true,
        ..MonitorConfig::default()
    };
    let mut ctl = CycleController::new(config);
    ctl.setup(&mut dev, &mut sink).unwrap();

    let (_, _, r1) = slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    assert_eq!(r1, SleepReason::Escalated);
    assert!(!ctl.state().first_measure_pending);
    let (_, d2, r2) = slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    assert_eq!((d2, r2), (SleepDirective::deep(300), SleepReason::Clear));
}

// ── Scenario B: low battery ───────────────────────────────────

#[test]
fn empty_battery_beeps_twice_with_pause() {
    let (mut dev, log) = mock_device();
    // 18_535 counts × 3·3.3/65535 ≈ 2.80 V
    dev.battery.raw = 18_535;
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());
    ctl.setup(&mut dev, &mut sink).unwrap();
    take_calls(&log);

    ctl.iterate(&mut dev, &mut sink).unwrap();
    let calls = take_calls(&log);
    assert_eq!(
        calls[..4],
        [
            Call::Signal { intensity: 2, sustained: false },
            Call::Wait(Duration::from_secs(2)),
            Call::Signal { intensity: 2, sustained: false },
            Call::SensorReady(true),
        ]
    );
    let low = sink.events.iter().find_map(|e| match e {
        AppEvent::BatteryLow(b) => Some(*b),
        _ => None,
    });
    let low = low.expect("low-battery event");
    assert_eq!(low.percent, 0.0);
}

#[test]
fn charging_battery_never_warns() {
    let (mut dev, log) = mock_device();
    dev.battery.raw = 18_535;
    dev.battery.charging = true;
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());
    ctl.setup(&mut dev, &mut sink).unwrap();
    take_calls(&log);

    ctl.iterate(&mut dev, &mut sink).unwrap();
    assert!(!take_calls(&log)
        .iter()
        .any(|c| matches!(c, Call::Signal { .. })));
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::BatteryLow(_))));
}

// ── Scenario C: sensor warm-up ────────────────────────────────

#[test]
fn not_ready_cycles_wait_without_sleeping() {
    let (mut dev, log) = mock_device();
    dev.sensor = dev.sensor.with_ready(&[false, false]);
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());
    ctl.setup(&mut dev, &mut sink).unwrap();
    take_calls(&log);

    for expected_loops in 1..=2 {
        let outcome = ctl.iterate(&mut dev, &mut sink).unwrap();
        assert_eq!(outcome, CycleOutcome::NotReady);
        assert_eq!(
            take_calls(&log),
            vec![Call::SensorReady(false), Call::Blink(2), Call::Wait(SEC)]
        );
        assert_eq!(ctl.state().loop_count, expected_loops);
        assert_eq!(ctl.state().successful_measurement_count, 0);
    }

    slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    assert_eq!(ctl.state().loop_count, 3);
    assert_eq!(ctl.state().successful_measurement_count, 1);
    let calls = take_calls(&log);
    assert_eq!(calls[..3], [Call::SensorReady(true), Call::Blink(1), Call::SensorMeasure]);
}

// ── Scheduled restart ─────────────────────────────────────────

#[test]
fn restart_fires_at_measurement_ceiling() {
    let (mut dev, log) = mock_device();
    let mut sink = RecordingSink::default();
    let config = MonitorConfig {
        restart_after_measurements: 2,
        ..MonitorConfig::default()
    };
    let mut ctl = CycleController::new(config);
    ctl.setup(&mut dev, &mut sink).unwrap();

    slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    take_calls(&log);

    assert_eq!(ctl.iterate(&mut dev, &mut sink).unwrap(), CycleOutcome::Restarted);
    assert_eq!(take_calls(&log), vec![Call::ClearRetained, Call::Restart]);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::RestartScheduled {
            successful_measurements: 2
        }
    )));
}

#[test]
fn zero_ceiling_never_restarts() {
    let (mut dev, log) = mock_device();
    let mut sink = RecordingSink::default();
    let config = MonitorConfig {
        restart_after_measurements: 0,
        ..MonitorConfig::default()
    };
    let state = CycleState {
        loop_count: 90_000,
        successful_measurement_count: 90_000,
        co2_high_count: 0,
        stopped: true,
        first_measure_pending: false,
    };
    let mut ctl = CycleController::resume(config, state);

    for _ in 0..3 {
        slept(ctl.iterate(&mut dev, &mut sink).unwrap());
    }
    assert!(!take_calls(&log).contains(&Call::Restart));
}

// ── Fault propagation ─────────────────────────────────────────

#[test]
fn sensor_fault_aborts_cycle_before_sleep() {
    let (mut dev, log) = mock_device();
    dev.sensor.fail_measure = Some(SensorError::Crc);
    let mut sink = RecordingSink::default();
    let mut ctl = CycleController::new(MonitorConfig::default());
    ctl.setup(&mut dev, &mut sink).unwrap();
    take_calls(&log);

    let err = ctl.iterate(&mut dev, &mut sink).unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::Crc));
    let calls = take_calls(&log);
    assert!(!calls
        .iter()
        .any(|c| matches!(c, Call::LightSleep(_) | Call::DeepSleep(_))));
    assert_eq!(ctl.state().successful_measurement_count, 0);
}

#[test]
fn failed_resume_start_propagates() {
    let (mut dev, _log) = mock_device();
    dev.sensor.fail_start = Some(SensorError::Bus);
    let mut sink = RecordingSink::default();
    let state = CycleState {
        stopped: true,
        ..CycleState::default()
    };
    let mut ctl = CycleController::resume(MonitorConfig::default(), state);

    assert_eq!(
        ctl.iterate(&mut dev, &mut sink),
        Err(Error::Sensor(SensorError::Bus))
    );
    assert!(ctl.state().stopped);
}
