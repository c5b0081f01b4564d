//! Integration tests for pendulab-session.

use pendulab_io::SessionConfig;
use pendulab_measure::{MeasurementConfig, MeasurementState, Progress, ReferencePoint, TimingSource};
use pendulab_physics::{
    BodyStore, DistanceConstraint, LaunchMode, PendulumConfig, SemiImplicitEuler, SolverConfig, StepResult,
    StepStrategy,
};
use pendulab_render::{HeadlessRenderer, Renderer};
use pendulab_session::{FrameDriver, PendulumSession};
use pendulab_telemetry::{EventKind, SharedVecSink};
use pendulab_types::{PendulabError, PendulabResult, RunId};

fn lab_session(length: f64) -> PendulumSession {
    PendulumSession::new(SessionConfig::for_pendulum(PendulumConfig::new(length, 1.0, 0.08))).unwrap()
}

fn count(events: &SharedVecSink, label: &str) -> usize {
    events
        .events()
        .iter()
        .filter(|e| e.kind.label() == label)
        .count()
}

/// Semi-implicit Euler that corrupts the bob once, at a chosen step.
struct FaultyStepper {
    inner: SemiImplicitEuler,
    fail_at: u64,
    failed: bool,
}

impl StepStrategy for FaultyStepper {
    fn step(
        &mut self,
        bodies: &mut BodyStore,
        constraint: &DistanceConstraint,
        gravity: f64,
        dt: f64,
    ) -> PendulabResult<StepResult> {
        let result = self.inner.step(bodies, constraint, gravity, dt)?;
        if !self.failed && bodies.steps == self.fail_at {
            self.failed = true;
            bodies.bob.velocity.x = f64::NAN;
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "faulty"
    }
}

// ─── Setup Tests ──────────────────────────────────────────────

#[test]
fn invalid_config_never_builds_a_session() {
    let mut config = SessionConfig::default();
    config.pendulum.length = 0.0;
    assert!(matches!(
        PendulumSession::new(config),
        Err(PendulabError::InvalidConfig(_))
    ));

    let mut config = SessionConfig::default();
    config.pendulum.initial_angle = f64::NAN;
    assert!(PendulumSession::new(config).is_err());
}

#[test]
fn new_session_is_idle_with_empty_dataset() {
    let session = PendulumSession::new(SessionConfig::default()).unwrap();
    assert_eq!(session.measurement().state(), MeasurementState::Idle);
    assert!(session.dataset().is_empty());
    assert_eq!(session.bodies().step, 0);
}

// ─── Tick Tests ───────────────────────────────────────────────

#[test]
fn tick_runs_pipeline_in_order() {
    let mut session = lab_session(1.0);
    let out = session.tick().unwrap();

    assert_eq!(out.snapshot.step, 1);
    assert_eq!(out.transforms.step, 1);
    assert_eq!(out.transforms, session.transforms());
    assert_eq!(out.progress, Progress::Unchanged);
    assert!(out.step.residual < 1e-9);
    assert!(out.completed().is_none());
}

#[test]
fn constraint_holds_across_many_ticks() {
    let mut session = lab_session(1.5);
    for _ in 0..1000 {
        session.tick().unwrap();
    }
    assert!(session.max_residual() < 1e-9);
    assert!((session.bodies().separation() - 1.5).abs() < 1e-9);
}

#[test]
fn tick_emits_step_events() {
    let mut session = lab_session(1.0);
    let sink = SharedVecSink::new();
    session.add_sink(Box::new(sink.clone()));
    session.tick().unwrap();
    session.tick().unwrap();

    assert_eq!(count(&sink, "step_completed"), 2);
    assert_eq!(count(&sink, "energy"), 2);
    assert_eq!(count(&sink, "constraint_residual"), 2);
}

// ─── Measurement Tests ────────────────────────────────────────

#[test]
fn unit_pendulum_records_expected_point() {
    let mut session = lab_session(1.0);
    let summary = FrameDriver::new(&mut session)
        .run_until_recorded(10_000)
        .unwrap()
        .unwrap();

    assert_eq!(summary.oscillations, 20);
    let points = session.dataset().all_points();
    assert_eq!(points.len(), 1);
    assert!((points[0].length - 1.0).abs() < 1e-12);
    // 2π√(1/9.81) ≈ 2.006 s, so T² ≈ 4.025.
    assert!(
        (points[0].period_squared - 4.025).abs() / 4.025 < 0.05,
        "period² = {}",
        points[0].period_squared
    );
    assert_eq!(session.measurement().state(), MeasurementState::Idle);
}

#[test]
fn measurement_events_follow_the_run() {
    let mut session = lab_session(0.5);
    let sink = SharedVecSink::milestones();
    session.add_sink(Box::new(sink.clone()));
    FrameDriver::new(&mut session)
        .run_until_recorded(10_000)
        .unwrap()
        .unwrap();

    let events = sink.events();
    assert_eq!(events.first().map(|e| e.kind.label()), Some("measurement_armed"));
    assert_eq!(events.last().map(|e| e.kind.label()), Some("run_completed"));
    assert_eq!(count(&sink, "counting_started"), 1);
    assert_eq!(count(&sink, "oscillation_counted"), 19);
}

/// Drives one run to completion and checks its period against 2π√(L/g).
fn assert_records_small_angle_period(config: SessionConfig) {
    let length = config.pendulum.length;
    let mut session = PendulumSession::new(config).unwrap();
    let sink = SharedVecSink::milestones();
    session.add_sink(Box::new(sink.clone()));

    let summary = FrameDriver::new(&mut session)
        .run_until_recorded(7200)
        .unwrap()
        .expect("run should complete");

    let expected = session.config().pendulum.theoretical_period().unwrap();
    assert!(
        (summary.period - expected).abs() / expected < 0.05,
        "period {}, expected {expected}",
        summary.period
    );
    assert_eq!(session.dataset().len(), 1);
    assert!((session.dataset().all_points()[0].length - length).abs() < 1e-12);
    assert_eq!(count(&sink, "counting_started"), 1);
    assert_eq!(count(&sink, "oscillation_counted"), 19);
}

#[test]
fn kick_launch_records_a_period() {
    let pendulum = PendulumConfig {
        launch: LaunchMode::Kick,
        ..PendulumConfig::new(1.0, 1.0, 0.08)
    };
    assert_records_small_angle_period(SessionConfig::for_pendulum(pendulum));
}

#[test]
fn arming_position_reference_records_a_period() {
    let mut config = SessionConfig::for_pendulum(PendulumConfig::new(1.0, 1.0, 0.08));
    config.measurement.reference = ReferencePoint::ArmingPosition;
    assert_records_small_angle_period(config);
}

#[test]
fn second_start_is_rejected_while_running() {
    let mut session = lab_session(1.0);
    assert_eq!(session.start_measurement().unwrap(), RunId(1));
    assert!(matches!(
        session.start_measurement(),
        Err(PendulabError::MeasurementBusy(_))
    ));
    assert_eq!(session.stop_measurement(), MeasurementState::Armed);
    assert_eq!(session.start_measurement().unwrap(), RunId(2));
}

#[test]
fn reconfigure_mid_counting_discards_run() {
    let mut session = lab_session(1.0);
    let sink = SharedVecSink::milestones();
    session.add_sink(Box::new(sink.clone()));
    session.start_measurement().unwrap();

    for _ in 0..2000 {
        session.tick().unwrap();
        if session.measurement().oscillations_observed() >= 1 {
            break;
        }
    }
    assert_eq!(session.measurement().state(), MeasurementState::Counting);
    assert!(session.measurement().oscillations_observed() >= 1);

    session
        .set_pendulum(PendulumConfig::new(0.5, 1.0, 0.08))
        .unwrap();

    assert_eq!(session.measurement().state(), MeasurementState::Idle);
    assert_eq!(session.measurement().oscillations_observed(), 0);
    assert!(session.dataset().is_empty());
    assert!(session.runs().is_empty());
    assert_eq!(count(&sink, "run_cancelled"), 1);
    assert!((session.bodies().rest_length - 0.5).abs() < 1e-12);
    assert_eq!(session.bodies().step, 0);
}

#[test]
fn invalid_reconfigure_changes_nothing() {
    let mut session = lab_session(1.0);
    session.start_measurement().unwrap();
    session.tick().unwrap();

    let err = session
        .set_pendulum(PendulumConfig::new(-1.0, 1.0, 0.08))
        .unwrap_err();
    assert!(matches!(err, PendulabError::InvalidConfig(_)));
    assert_eq!(session.measurement().state(), MeasurementState::Armed);
    assert_eq!(session.bodies().step, 1);
    assert!((session.config().pendulum.length - 1.0).abs() < 1e-12);
}

#[test]
fn dataset_accumulates_in_completion_order() {
    let mut session = lab_session(1.0);
    FrameDriver::new(&mut session)
        .run_until_recorded(10_000)
        .unwrap()
        .unwrap();

    session
        .set_pendulum(PendulumConfig::new(0.5, 1.0, 0.08))
        .unwrap();
    FrameDriver::new(&mut session)
        .run_until_recorded(10_000)
        .unwrap()
        .unwrap();

    let lengths: Vec<f64> = session.dataset().all_points().iter().map(|p| p.length).collect();
    assert_eq!(lengths, vec![1.0, 0.5]);
    assert_eq!(session.runs().len(), session.dataset().len());

    let g = session.report().fit.unwrap().gravity_estimate().unwrap();
    assert!((g - 9.81).abs() / 9.81 < 0.05, "g = {g}");
}

// ─── Failure Tests ────────────────────────────────────────────

#[test]
fn numeric_degeneracy_rebuilds_bodies() {
    let config = SessionConfig::for_pendulum(PendulumConfig::new(1.0, 1.0, 0.08));
    let stepper = FaultyStepper {
        inner: SemiImplicitEuler::new(),
        fail_at: 5,
        failed: false,
    };
    let mut session = PendulumSession::with_strategy(config.clone(), Box::new(stepper)).unwrap();
    let sink = SharedVecSink::milestones();
    session.add_sink(Box::new(sink.clone()));
    session.start_measurement().unwrap();

    for _ in 0..4 {
        session.tick().unwrap();
    }
    let err = session.tick().unwrap_err();
    assert!(matches!(err, PendulabError::NumericDegeneracy { step: 5, .. }));

    let bodies = session.bodies();
    assert!(bodies.is_finite());
    let fresh = BodyStore::from_config(&config.pendulum).unwrap();
    assert_eq!(bodies.bob, fresh.bob);
    assert_eq!(bodies.step, 4);
    assert_eq!(session.measurement().state(), MeasurementState::Idle);
    assert_eq!(count(&sink, "numeric_degeneracy"), 1);
    assert_eq!(count(&sink, "run_cancelled"), 1);

    let next = session.tick().unwrap();
    assert_eq!(next.snapshot.step, 5);
    assert!(next.snapshot.is_finite());
}

#[test]
fn driver_rides_through_degeneracy() {
    let config = SessionConfig::for_pendulum(PendulumConfig::new(1.0, 1.0, 0.08));
    let stepper = FaultyStepper {
        inner: SemiImplicitEuler::new(),
        fail_at: 3,
        failed: false,
    };
    let mut session = PendulumSession::with_strategy(config, Box::new(stepper)).unwrap();
    let summary = FrameDriver::new(&mut session).run_frames(10).unwrap();
    assert_eq!(summary.frames, 10);
    assert_eq!(summary.degeneracies, 1);
    assert_eq!(session.bodies().step, 9);
}

#[test]
fn stalled_run_is_reported_once_and_left_running() {
    let mut config = SessionConfig::for_pendulum(PendulumConfig::new(1.0, 1.0, 0.35));
    config.solver = SolverConfig::damped(0.2);
    config.stall_step_bound = Some(120);
    let mut session = PendulumSession::new(config).unwrap();
    let sink = SharedVecSink::milestones();
    session.add_sink(Box::new(sink.clone()));

    session.start_measurement().unwrap();
    let summary = FrameDriver::new(&mut session).run_frames(1000).unwrap();

    assert!(summary.completed.is_empty());
    assert_eq!(count(&sink, "measurement_stalled"), 1);
    assert!(session.measurement().state().is_active());
    assert!(session.measurement().is_stalled(120));

    assert!(session.stop_measurement().is_active());
    assert!(!session.measurement().is_stalled(120));
}

#[test]
fn budget_exhaustion_leaves_run_active() {
    let mut session = lab_session(1.0);
    let result = FrameDriver::new(&mut session).run_until_recorded(10).unwrap();
    assert!(result.is_none());
    assert!(session.measurement().state().is_active());
}

// ─── Snapshot Tests ───────────────────────────────────────────

#[test]
fn snapshot_restore_replays_exactly() {
    let mut session = lab_session(1.0);
    FrameDriver::new(&mut session).run_frames(100).unwrap();
    let snap = session.snapshot();
    assert_eq!(snap.step(), 100);

    FrameDriver::new(&mut session).run_frames(50).unwrap();
    let expected = session.bodies();

    session.restore(&snap).unwrap();
    assert_eq!(session.bodies().step, 100);
    assert_eq!(session.measurement().state(), MeasurementState::Idle);
    FrameDriver::new(&mut session).run_frames(50).unwrap();
    assert_eq!(session.bodies(), expected);
}

#[test]
fn restore_rescales_band_to_restored_pendulum() {
    let mut short = lab_session(0.25);
    FrameDriver::new(&mut short).run_frames(10).unwrap();
    let snap = short.snapshot();

    let mut session = lab_session(1.0);
    session.restore(&snap).unwrap();

    let expected = MeasurementConfig::scaled_to(&snap.pendulum).proximity_band;
    assert!((session.config().measurement.proximity_band - expected).abs() < 1e-15);
    assert!((session.config().pendulum.length - 0.25).abs() < 1e-12);

    let summary = FrameDriver::new(&mut session)
        .run_until_recorded(7200)
        .unwrap()
        .expect("restored session should record");
    assert!((summary.length - 0.25).abs() < 1e-12);
}

#[test]
fn restore_rejects_inconsistent_snapshot() {
    let mut session = lab_session(1.0);
    FrameDriver::new(&mut session).run_frames(10).unwrap();
    let mut snap = session.snapshot();
    snap.bodies.bob.mass = 3.0;

    let err = session.restore(&snap).unwrap_err();
    assert!(matches!(err, PendulabError::InvariantViolation(_)));
    assert_eq!(session.bodies().step, 10);
}

#[test]
fn report_reflects_session() {
    let mut session = lab_session(1.0);
    FrameDriver::new(&mut session).run_frames(60).unwrap();
    let report = session.finish();
    assert_eq!(report.steps, 60);
    assert!((report.sim_time - 1.0).abs() < 1e-9);
    assert!(report.runs.is_empty());
    assert!(report.fit.is_none());
    assert!(report.final_energy > 0.0);
}

// ─── Driver Tests ─────────────────────────────────────────────

#[test]
fn driver_presents_every_frame() {
    let mut session = lab_session(1.0);
    let mut renderer = HeadlessRenderer::new();
    let mut driver = FrameDriver::with_renderer(&mut session, &mut renderer).unwrap();
    let summary = driver.run_frames(30).unwrap();
    assert_eq!(summary.frames, 30);
    assert_eq!(driver.session().bodies().step, 30);
    driver.finish().unwrap();
    assert_eq!(renderer.frame_count(), 30);
}

#[test]
fn wall_clock_session_still_measures() {
    let mut config = SessionConfig::for_pendulum(PendulumConfig::new(0.25, 1.0, 0.08));
    config.timing = TimingSource::WallClock;
    config.measurement.oscillations_target = 2;
    let mut session = PendulumSession::new(config).unwrap();
    let summary = FrameDriver::new(&mut session)
        .run_until_recorded(5000)
        .unwrap()
        .unwrap();
    // Headless frames run far faster than real time.
    assert!(summary.period >= 0.0);
    assert!(summary.period < 1.0);
}
