//! Integration tests for pendulab-measure.

use std::f64::consts::PI;

use pendulab_math::DVec2;
use pendulab_measure::automaton::{
    next_state, MeasurementRun, MeasurementState, Progress, SwingPhase, Trigger,
};
use pendulab_measure::clock::{Clock, SimulatedClock, TimingSource, WallClock};
use pendulab_measure::config::{MeasurementConfig, ReferencePoint};
use pendulab_measure::dataset::{DataPoint, Dataset};
use pendulab_physics::{
    BodySnapshot, BodyStore, DistanceConstraint, PendulumConfig, SemiImplicitEuler, StepStrategy,
};
use pendulab_types::constants::{DEFAULT_DT, DEFAULT_PROXIMITY_BAND, GRAVITY};
use pendulab_types::{PendulabError, RunId};

/// Snapshot of a unit pendulum (anchor at origin) with the bob placed by hand.
fn snap(step: u64, x: f64, y: f64, vx: f64) -> BodySnapshot {
    let store = BodyStore::from_config(&PendulumConfig::new(1.0, 1.0, 0.0)).unwrap();
    let mut s = store.snapshot(1.0);
    s.step = step;
    s.sim_time = step as f64 * DEFAULT_DT;
    s.bob.position = DVec2::new(x, y);
    s.bob.velocity = DVec2::new(vx, 0.0);
    s
}

// Band is 0.1 around y = 1.0.
fn inside_right_moving_left(step: u64) -> BodySnapshot {
    snap(step, 0.3, 0.95, -1.0)
}

fn inside_left_moving_right(step: u64) -> BodySnapshot {
    snap(step, -0.3, 0.95, 1.0)
}

fn outside(step: u64) -> BodySnapshot {
    snap(step, 0.5, 0.8, 0.0)
}

fn run_with_target(target: u32) -> MeasurementRun {
    MeasurementRun::new(MeasurementConfig {
        oscillations_target: target,
        ..Default::default()
    })
}

/// Starts a run and brings it into Counting with phase (left-moving, right side).
fn counting_run(target: u32) -> MeasurementRun {
    let mut run = run_with_target(target);
    run.start(&outside(0)).unwrap();
    let progress = run.observe(&inside_right_moving_left(1), 1.0);
    assert!(matches!(progress, Progress::CountingStarted { .. }));
    run
}

// ─── Transition Table Tests ───────────────────────────────────

#[test]
fn transition_table() {
    use MeasurementState::*;

    let cases = [
        (Idle, Trigger::Start, Some(Armed)),
        (Idle, Trigger::BandContact, Some(Idle)),
        (Idle, Trigger::TargetReached, Some(Idle)),
        (Idle, Trigger::Recorded, Some(Idle)),
        (Idle, Trigger::Cancel, Some(Idle)),
        (Armed, Trigger::Start, None),
        (Armed, Trigger::BandContact, Some(Counting)),
        (Armed, Trigger::TargetReached, Some(Armed)),
        (Armed, Trigger::Cancel, Some(Idle)),
        (Counting, Trigger::Start, None),
        (Counting, Trigger::BandContact, Some(Counting)),
        (Counting, Trigger::TargetReached, Some(Complete)),
        (Counting, Trigger::Cancel, Some(Idle)),
        (Complete, Trigger::Start, None),
        (Complete, Trigger::Recorded, Some(Idle)),
        (Complete, Trigger::Cancel, Some(Idle)),
    ];
    for (state, trigger, expected) in cases {
        assert_eq!(
            next_state(state, trigger),
            expected,
            "{:?} + {:?}",
            state,
            trigger
        );
    }
}

#[test]
fn active_states() {
    assert!(!MeasurementState::Idle.is_active());
    assert!(MeasurementState::Armed.is_active());
    assert!(MeasurementState::Counting.is_active());
    assert!(!MeasurementState::Complete.is_active());
}

#[test]
fn swing_phase_from_snapshot() {
    let phase = SwingPhase::of(&inside_left_moving_right(0));
    assert!(phase.moving_right);
    assert!(!phase.right_of_anchor);
}

// ─── Arming Tests ─────────────────────────────────────────────

#[test]
fn new_run_is_idle() {
    let run = MeasurementRun::default();
    assert_eq!(run.state(), MeasurementState::Idle);
    assert_eq!(run.oscillations_target(), 20);
    assert_eq!(run.run_id(), RunId(0));
    assert!(run.reference_y().is_none());
}

#[test]
fn start_arms_at_equilibrium() {
    let mut run = MeasurementRun::default();
    let id = run.start(&outside(0)).unwrap();
    assert_eq!(id, RunId(1));
    assert_eq!(run.state(), MeasurementState::Armed);
    assert!((run.reference_y().unwrap() - 1.0).abs() < 1e-12);
    assert!(run.start_timestamp().is_none());
}

#[test]
fn start_arms_at_bob_height() {
    let mut run = MeasurementRun::new(MeasurementConfig {
        reference: ReferencePoint::ArmingPosition,
        ..Default::default()
    });
    run.start(&outside(0)).unwrap();
    assert!((run.reference_y().unwrap() - 0.8).abs() < 1e-12);
}

#[test]
fn start_while_running_is_busy() {
    let mut run = MeasurementRun::default();
    run.start(&outside(0)).unwrap();
    let err = run.start(&outside(1)).unwrap_err();
    assert!(matches!(err, PendulabError::MeasurementBusy(_)));
    assert_eq!(run.state(), MeasurementState::Armed);
    assert_eq!(run.run_id(), RunId(1));
}

#[test]
fn armed_waits_outside_band() {
    let mut run = MeasurementRun::default();
    run.start(&outside(0)).unwrap();
    assert_eq!(run.observe(&outside(1), 0.1), Progress::Unchanged);
    assert_eq!(run.state(), MeasurementState::Armed);
}

#[test]
fn first_contact_starts_counting() {
    let mut run = MeasurementRun::default();
    run.start(&outside(0)).unwrap();
    let progress = run.observe(&inside_right_moving_left(5), 0.5);

    assert_eq!(progress, Progress::CountingStarted { reference_y: 1.0 });
    assert_eq!(run.state(), MeasurementState::Counting);
    assert_eq!(run.start_timestamp(), Some(0.5));
    assert_eq!(run.oscillations_observed(), 0);
}

#[test]
fn idle_ignores_observations() {
    let mut run = MeasurementRun::default();
    for step in 0..10 {
        assert_eq!(run.observe(&inside_right_moving_left(step), 0.0), Progress::Unchanged);
    }
    assert_eq!(run.steps_since_progress(), 0);
    assert_eq!(run.state(), MeasurementState::Idle);
}

// ─── Counting Tests ───────────────────────────────────────────

#[test]
fn dwell_inside_band_counts_once() {
    let mut run = counting_run(20);
    run.observe(&outside(2), 2.0);

    let first = run.observe(&inside_right_moving_left(3), 3.0);
    assert_eq!(first, Progress::Counted { observed: 1 });
    for step in 4..40 {
        assert_eq!(run.observe(&inside_right_moving_left(step), step as f64), Progress::Unchanged);
    }
    assert_eq!(run.oscillations_observed(), 1);
}

#[test]
fn dwell_from_first_contact_is_not_an_edge() {
    let mut run = counting_run(20);
    for step in 2..30 {
        run.observe(&inside_right_moving_left(step), step as f64);
    }
    assert_eq!(run.oscillations_observed(), 0);
}

/// A bob kicked from rest: at equilibrium, moving right.
fn at_rest_moving_right(step: u64) -> BodySnapshot {
    snap(step, 0.0, 1.0, 1.0)
}

#[test]
fn inside_at_arming_defers_timing_origin() {
    let mut run = run_with_target(1);
    run.start(&at_rest_moving_right(0)).unwrap();

    let progress = run.observe(&at_rest_moving_right(1), 1.0);
    assert_eq!(progress, Progress::CountingStarted { reference_y: 1.0 });
    assert_eq!(run.state(), MeasurementState::Counting);
    assert!(run.start_timestamp().is_none());

    // First real entry sets the origin and is not credited.
    run.observe(&outside(2), 2.0);
    assert_eq!(
        run.observe(&inside_right_moving_left(3), 3.0),
        Progress::TimingStarted { start_time: 3.0 }
    );
    assert_eq!(run.start_timestamp(), Some(3.0));
    assert_eq!(run.oscillations_observed(), 0);
    assert_eq!(run.steps_since_progress(), 0);

    run.observe(&outside(4), 4.0);
    assert_eq!(run.observe(&inside_left_moving_right(5), 5.0), Progress::Unchanged);
    run.observe(&outside(6), 6.0);
    let summary = match run.observe(&inside_right_moving_left(7), 7.0) {
        Progress::Completed(summary) => summary,
        other => panic!("expected completion, got {other:?}"),
    };
    assert!((summary.elapsed - 4.0).abs() < 1e-12);
    assert!((summary.period - 4.0).abs() < 1e-12);
}

#[test]
fn entry_from_outside_at_arming_starts_timing_at_once() {
    let mut run = run_with_target(20);
    run.start(&outside(0)).unwrap();
    run.observe(&inside_right_moving_left(1), 1.0);
    assert_eq!(run.start_timestamp(), Some(1.0));
}

#[test]
fn opposite_phase_entry_is_not_counted() {
    let mut run = counting_run(20);
    run.observe(&outside(2), 2.0);
    assert_eq!(run.observe(&inside_left_moving_right(3), 3.0), Progress::Unchanged);
    assert_eq!(run.oscillations_observed(), 0);

    run.observe(&outside(4), 4.0);
    assert_eq!(
        run.observe(&inside_right_moving_left(5), 5.0),
        Progress::Counted { observed: 1 }
    );
}

#[test]
fn reaching_target_completes_and_resets() {
    let mut run = counting_run(3);
    let mut last = Progress::Unchanged;
    for cycle in 1..=3u64 {
        let t = 1.0 + 2.0 * cycle as f64;
        run.observe(&outside(cycle * 10), t - 1.0);
        last = run.observe(&inside_right_moving_left(cycle * 10 + 1), t);
    }

    let summary = match last {
        Progress::Completed(summary) => summary,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(summary.run, RunId(1));
    assert_eq!(summary.oscillations, 3);
    assert!((summary.elapsed - 6.0).abs() < 1e-12);
    assert!((summary.period - 2.0).abs() < 1e-12);
    assert_eq!(summary.completed_at_step, 31);

    let point = summary.data_point();
    assert!((point.length - 1.0).abs() < 1e-12);
    assert!((point.period_squared - 4.0).abs() < 1e-12);

    assert_eq!(run.state(), MeasurementState::Idle);
    assert_eq!(run.oscillations_observed(), 0);
    assert!(run.start_timestamp().is_none());
}

#[test]
fn restart_after_completion() {
    let mut run = counting_run(1);
    run.observe(&outside(2), 2.0);
    assert!(matches!(
        run.observe(&inside_right_moving_left(3), 3.0),
        Progress::Completed(_)
    ));
    assert_eq!(run.start(&outside(4)).unwrap(), RunId(2));
}

// ─── Cancel / Reconfigure Tests ───────────────────────────────

#[test]
fn cancel_mid_counting_discards_progress() {
    let mut run = counting_run(5);
    run.observe(&outside(2), 2.0);
    run.observe(&inside_right_moving_left(3), 3.0);
    assert_eq!(run.oscillations_observed(), 1);

    let previous = run.cancel();
    assert_eq!(previous, MeasurementState::Counting);
    assert_eq!(run.state(), MeasurementState::Idle);
    assert_eq!(run.oscillations_observed(), 0);
    assert!(run.start_timestamp().is_none());

    run.observe(&outside(4), 4.0);
    assert_eq!(run.observe(&inside_right_moving_left(5), 5.0), Progress::Unchanged);
}

#[test]
fn reset_swaps_config() {
    let mut run = counting_run(20);
    let config = MeasurementConfig {
        oscillations_target: 5,
        proximity_band: 0.02,
        reference: ReferencePoint::ArmingPosition,
    };
    assert_eq!(run.reset(config.clone()), MeasurementState::Counting);
    assert_eq!(run.state(), MeasurementState::Idle);
    assert_eq!(run.config(), &config);
}

// ─── Stall Tests ──────────────────────────────────────────────

#[test]
fn stall_is_observable_but_not_acted_on() {
    let mut run = MeasurementRun::default();
    run.start(&outside(0)).unwrap();
    for step in 1..=50 {
        run.observe(&outside(step), step as f64);
    }
    assert_eq!(run.steps_since_progress(), 50);
    assert!(run.is_stalled(50));
    assert!(!run.is_stalled(51));
    assert_eq!(run.state(), MeasurementState::Armed);
}

#[test]
fn settled_bob_stalls_counting() {
    let mut run = counting_run(20);
    for step in 2..200 {
        run.observe(&inside_right_moving_left(step), step as f64);
    }
    assert!(run.is_stalled(100));
    assert_eq!(run.state(), MeasurementState::Counting);
}

#[test]
fn credited_edge_resets_stall_counter() {
    let mut run = counting_run(20);
    for step in 2..20 {
        run.observe(&outside(step), step as f64);
    }
    run.observe(&inside_right_moving_left(20), 20.0);
    assert_eq!(run.steps_since_progress(), 0);
    assert!(!MeasurementRun::default().is_stalled(0));
}

// ─── Simulated Run Tests ──────────────────────────────────────

fn measure_period(length: f64, angle: f64) -> f64 {
    let config = PendulumConfig::new(length, 1.0, angle);
    let mut store = BodyStore::from_config(&config).unwrap();
    let constraint = DistanceConstraint::rigid(length);
    let mut stepper = SemiImplicitEuler::new();
    let clock = SimulatedClock;

    let mut run = MeasurementRun::new(MeasurementConfig::scaled_to(&config));
    run.start(&store.snapshot(length)).unwrap();

    for _ in 0..10_000 {
        stepper
            .step(&mut store, &constraint, config.gravity, DEFAULT_DT)
            .unwrap();
        let snapshot = store.snapshot(length);
        if let Progress::Completed(summary) = run.observe(&snapshot, clock.now(snapshot.sim_time)) {
            assert_eq!(summary.oscillations, 20);
            return summary.period;
        }
    }
    panic!("run did not complete");
}

#[test]
fn measured_period_matches_small_angle_theory() {
    let period = measure_period(1.0, 0.08);
    let expected = 2.0 * PI * (1.0 / GRAVITY).sqrt();
    assert!(
        (period - expected).abs() / expected < 0.02,
        "period {period}, expected {expected}"
    );
}

#[test]
fn arming_position_reference_measures_period() {
    let length = 1.0;
    let config = PendulumConfig::new(length, 1.0, 0.08);
    let mut store = BodyStore::from_config(&config).unwrap();
    let constraint = DistanceConstraint::rigid(length);
    let mut stepper = SemiImplicitEuler::new();

    let mut run = MeasurementRun::new(MeasurementConfig {
        reference: ReferencePoint::ArmingPosition,
        ..MeasurementConfig::scaled_to(&config)
    });
    run.start(&store.snapshot(length)).unwrap();

    let expected = 2.0 * PI * (length / GRAVITY).sqrt();
    for _ in 0..10_000 {
        stepper
            .step(&mut store, &constraint, config.gravity, DEFAULT_DT)
            .unwrap();
        let snapshot = store.snapshot(length);
        if let Progress::Completed(summary) = run.observe(&snapshot, snapshot.sim_time) {
            assert!(
                (summary.period - expected).abs() / expected < 0.02,
                "period {}, expected {expected}",
                summary.period
            );
            return;
        }
    }
    panic!("run did not complete");
}

#[test]
fn measured_period_scales_with_root_length() {
    let short = measure_period(0.25, 0.08);
    let long = measure_period(1.0, 0.08);
    assert!((long / short - 2.0).abs() < 0.04);
}

// ─── Clock Tests ──────────────────────────────────────────────

#[test]
fn simulated_clock_reads_sim_time() {
    let clock = SimulatedClock;
    assert_eq!(clock.now(3.25), 3.25);
    assert_eq!(clock.name(), "simulated");
}

#[test]
fn wall_clock_is_monotonic() {
    let clock = WallClock::new();
    let a = clock.now(100.0);
    let b = clock.now(0.0);
    assert!(a >= 0.0);
    assert!(b >= a);
    assert!(a < 100.0);
}

#[test]
fn timing_source_builds_clock() {
    assert_eq!(TimingSource::default(), TimingSource::Simulated);
    assert_eq!(TimingSource::Simulated.clock().name(), "simulated");
    assert_eq!(TimingSource::WallClock.clock().name(), "wall_clock");

    let json = serde_json::to_string(&TimingSource::WallClock).unwrap();
    assert_eq!(json, "\"wall_clock\"");
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn measurement_config_default() {
    let config = MeasurementConfig::default();
    assert_eq!(config.oscillations_target, 20);
    assert!((config.proximity_band - DEFAULT_PROXIMITY_BAND).abs() < 1e-12);
    assert!((config.proximity_band - 0.1).abs() < 1e-12);
    assert_eq!(config.reference, ReferencePoint::Equilibrium);
    assert!(config.validate().is_ok());
}

#[test]
fn measurement_config_scaled_band() {
    let pendulum = PendulumConfig::new(1.0, 1.0, 0.08);
    let config = MeasurementConfig::scaled_to(&pendulum);
    assert!((config.proximity_band - 0.25 * pendulum.swing_height()).abs() < 1e-15);

    let hanging = PendulumConfig::new(1.0, 1.0, 0.0);
    assert!((MeasurementConfig::scaled_to(&hanging).proximity_band - DEFAULT_PROXIMITY_BAND).abs() < 1e-12);
}

#[test]
fn measurement_config_rejects_bad_values() {
    let zero = MeasurementConfig {
        oscillations_target: 0,
        ..Default::default()
    };
    assert!(zero.validate().is_err());
    let band = MeasurementConfig {
        proximity_band: -0.1,
        ..Default::default()
    };
    assert!(band.validate().is_err());
}

#[test]
fn measurement_config_toml_defaults_reference() {
    let config: MeasurementConfig =
        toml::from_str("oscillations_target = 10\nproximity_band = 0.05\n").unwrap();
    assert_eq!(config.oscillations_target, 10);
    assert_eq!(config.reference, ReferencePoint::Equilibrium);

    let text = toml::to_string(&MeasurementConfig {
        reference: ReferencePoint::ArmingPosition,
        ..Default::default()
    })
    .unwrap();
    assert!(text.contains("arming_position"));
}

// ─── Dataset Tests ────────────────────────────────────────────

#[test]
fn dataset_preserves_order_and_duplicates() {
    let mut data = Dataset::new();
    assert!(data.is_empty());
    data.record(DataPoint::new(1.0, 4.0));
    data.record(DataPoint::new(0.5, 2.0));
    data.record(DataPoint::new(1.0, 4.1));

    let lengths: Vec<f64> = data.all_points().iter().map(|p| p.length).collect();
    assert_eq!(lengths, vec![1.0, 0.5, 1.0]);
    assert_eq!(data.len(), 3);
    assert_eq!(data.last(), Some(&DataPoint::new(1.0, 4.1)));
}

#[test]
fn data_point_from_period() {
    let p = DataPoint::from_period(2.0, 3.0);
    assert_eq!(p.period_squared, 9.0);
    assert_eq!(p.period(), 3.0);
}

#[test]
fn fit_recovers_gravity() {
    let mut data = Dataset::new();
    for length in [0.25, 0.5, 1.0, 1.5, 2.0] {
        let period = 2.0 * PI * (length / GRAVITY).sqrt();
        data.record(DataPoint::from_period(length, period));
    }
    let fit = data.fit().unwrap();
    assert_eq!(fit.samples, 5);
    assert!(fit.intercept.abs() < 1e-9);
    assert!((fit.r_squared - 1.0).abs() < 1e-9);
    assert!((fit.gravity_estimate().unwrap() - GRAVITY).abs() < 1e-9);
    assert!((fit.predict(1.0) - 4.0 * PI * PI / GRAVITY).abs() < 1e-9);
}

#[test]
fn fit_needs_two_distinct_lengths() {
    let mut data = Dataset::new();
    assert!(data.fit().is_none());
    data.record(DataPoint::new(1.0, 4.0));
    assert!(data.fit().is_none());
    data.record(DataPoint::new(1.0, 4.1));
    assert!(data.fit().is_none());
    data.record(DataPoint::new(2.0, 8.0));
    assert!(data.fit().is_some());
}

#[test]
fn dataset_csv() {
    let mut data = Dataset::new();
    data.record(DataPoint::from_period(1.0, 2.0));
    let csv = data.to_csv();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("index,length_m"));
    assert_eq!(lines[1], "0,1.0000,2.000000,4.000000");
}

#[test]
fn dataset_serialization() {
    let mut data = Dataset::new();
    data.record(DataPoint::new(0.5, 2.01));
    let json = serde_json::to_string(&data).unwrap();
    let recovered: Dataset = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, data);
}
