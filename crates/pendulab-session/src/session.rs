//! The pendulum session: explicit owner of all runtime state.

use pendulab_debug::StateSnapshot;
use pendulab_io::{validate_config, SessionConfig, SessionReport};
use pendulab_measure::{
    Clock, Dataset, MeasurementConfig, MeasurementRun, MeasurementState, Progress, RunSummary,
};
use pendulab_physics::{
    BodySnapshot, BodyStore, DistanceConstraint, PendulumConfig, SemiImplicitEuler, StepResult,
    StepStrategy,
};
use pendulab_render::{RenderMirror, RenderTransforms};
use pendulab_telemetry::{EventBus, EventKind, EventSink};
use pendulab_types::{PendulabError, PendulabResult, RunId};

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub snapshot: BodySnapshot,
    pub transforms: RenderTransforms,
    pub progress: Progress,
    pub step: StepResult,
}

impl TickOutput {
    /// The run that completed on this tick, if any.
    pub fn completed(&self) -> Option<&RunSummary> {
        match &self.progress {
            Progress::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}

/// A single pendulum experiment.
///
/// The stepper is the only writer of the bodies; the mirror and the
/// measurement automaton read the snapshot the stepper hands over.
pub struct PendulumSession {
    config: SessionConfig,
    bodies: BodyStore,
    constraint: DistanceConstraint,
    stepper: Box<dyn StepStrategy>,
    mirror: RenderMirror,
    measurement: MeasurementRun,
    dataset: Dataset,
    runs: Vec<RunSummary>,
    clock: Box<dyn Clock>,
    bus: EventBus,
    max_residual: f64,
    stall_reported: bool,
}

impl PendulumSession {
    /// Validates `config` and builds a session with the semi-implicit Euler stepper.
    pub fn new(config: SessionConfig) -> PendulabResult<Self> {
        Self::with_strategy(config, Box::new(SemiImplicitEuler::new()))
    }

    /// Validates `config` and builds a session around a custom stepper.
    pub fn with_strategy(
        config: SessionConfig,
        mut stepper: Box<dyn StepStrategy>,
    ) -> PendulabResult<Self> {
        validate_config(&config)?;
        stepper.init(&config.solver)?;

        let bodies = BodyStore::from_config(&config.pendulum)?;
        tracing::info!(
            length = config.pendulum.length,
            mass = config.pendulum.bob_mass,
            gravity = config.pendulum.gravity,
            angle = config.pendulum.initial_angle,
            stepper = stepper.name(),
            "session ready"
        );

        Ok(Self {
            constraint: DistanceConstraint::new(config.pendulum.length, config.solver.stiffness),
            mirror: RenderMirror::new(config.render.clone()),
            measurement: MeasurementRun::new(config.measurement.clone()),
            clock: config.timing.clock(),
            bodies,
            stepper,
            dataset: Dataset::new(),
            runs: Vec::new(),
            bus: EventBus::new(),
            max_residual: 0.0,
            stall_reported: false,
            config,
        })
    }

    /// Registers a telemetry sink.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.bus.add_sink(sink);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current body state.
    pub fn bodies(&self) -> BodySnapshot {
        self.bodies.snapshot(self.constraint.length)
    }

    /// Render transforms for the current body state.
    pub fn transforms(&self) -> RenderTransforms {
        self.mirror.sync(&self.bodies())
    }

    pub fn measurement(&self) -> &MeasurementRun {
        &self.measurement
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Completed runs, in completion order.
    pub fn runs(&self) -> &[RunSummary] {
        &self.runs
    }

    /// Largest constraint residual seen since the session was built.
    pub fn max_residual(&self) -> f64 {
        self.max_residual
    }

    /// Kinetic plus potential energy of the bob.
    pub fn total_energy(&self) -> f64 {
        self.bodies.bob.kinetic_energy()
            + self
                .bodies
                .potential_energy(self.constraint.length, self.config.pendulum.gravity)
    }

    /// Advances one frame: step, mirror, measure, and record on completion.
    ///
    /// On non-finite body state the bodies are rebuilt from the current
    /// config, any run in progress is dropped, and
    /// [`PendulabError::NumericDegeneracy`] is returned. The next tick
    /// continues from the rebuilt state.
    pub fn tick(&mut self) -> PendulabResult<TickOutput> {
        let gravity = self.config.pendulum.gravity;
        let dt = self.config.solver.dt;
        let before = (self.bodies.steps, self.bodies.sim_time);

        let step = self
            .stepper
            .step(&mut self.bodies, &self.constraint, gravity, dt)?;

        let snapshot = self.bodies.snapshot(self.constraint.length);
        if !snapshot.is_finite() || !step.residual.is_finite() {
            return Err(self.recover_from_degeneracy(before, &snapshot));
        }

        self.max_residual = self.max_residual.max(step.residual);
        let transforms = self.mirror.sync(&snapshot);
        let now = self.clock.now(snapshot.sim_time);
        let progress = self.measurement.observe(&snapshot, now);

        self.emit_step_events(&snapshot, &step);
        self.handle_progress(&snapshot, progress);
        self.check_stall(snapshot.step);
        self.bus.flush();

        Ok(TickOutput {
            snapshot,
            transforms,
            progress,
            step,
        })
    }

    /// Arms a measurement run against the current body state.
    ///
    /// Fails with [`PendulabError::MeasurementBusy`] while a run is in progress.
    pub fn start_measurement(&mut self) -> PendulabResult<RunId> {
        let snapshot = self.bodies();
        let run = self.measurement.start(&snapshot)?;
        self.stall_reported = false;

        let reference_y = self.measurement.reference_y().unwrap_or(snapshot.rest_y());
        self.bus
            .emit_kind(snapshot.step, EventKind::MeasurementArmed { run, reference_y });
        self.bus.flush();
        Ok(run)
    }

    /// Stops the run in progress without crediting it.
    ///
    /// Returns the state the run was in.
    pub fn stop_measurement(&mut self) -> MeasurementState {
        let previous = self.cancel_run();
        self.bus.flush();
        previous
    }

    /// Replaces the session configuration.
    ///
    /// The new config is validated first; on error nothing changes. On
    /// success the bodies are rebuilt, any run in progress is dropped, and
    /// the dataset is kept.
    pub fn reconfigure(&mut self, config: SessionConfig) -> PendulabResult<()> {
        validate_config(&config)?;
        let bodies = BodyStore::from_config(&config.pendulum)?;
        self.stepper.init(&config.solver)?;

        self.cancel_run();
        self.measurement.reset(config.measurement.clone());
        self.bodies = bodies;
        self.constraint = DistanceConstraint::new(config.pendulum.length, config.solver.stiffness);
        self.mirror = RenderMirror::new(config.render.clone());
        if config.timing != self.config.timing {
            self.clock = config.timing.clock();
        }
        self.max_residual = 0.0;
        self.config = config;
        self.bus.flush();

        tracing::info!(
            length = self.config.pendulum.length,
            mass = self.config.pendulum.bob_mass,
            "session reconfigured"
        );
        Ok(())
    }

    /// Swaps in a new pendulum, keeping solver, render and timing settings.
    ///
    /// The proximity band is rescaled to the new swing height.
    pub fn set_pendulum(&mut self, pendulum: PendulumConfig) -> PendulabResult<()> {
        let config = self.config_for(pendulum);
        self.reconfigure(config)
    }

    /// The current config with `pendulum` swapped in and the band rescaled.
    fn config_for(&self, pendulum: PendulumConfig) -> SessionConfig {
        let measurement = MeasurementConfig {
            proximity_band: MeasurementConfig::scaled_to(&pendulum).proximity_band,
            ..self.config.measurement.clone()
        };
        SessionConfig {
            pendulum,
            measurement,
            ..self.config.clone()
        }
    }

    /// Captures the full session state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(
            &self.config.pendulum,
            &self.config.solver,
            &self.bodies,
            &self.measurement,
            &self.dataset,
        )
    }

    /// Resumes from a captured state.
    ///
    /// Bodies, pendulum, solver and dataset come from the snapshot, and the
    /// band is rescaled to the restored pendulum. Any run in progress here is
    /// dropped and the restored session starts Idle.
    pub fn restore(&mut self, snapshot: &StateSnapshot) -> PendulabResult<()> {
        snapshot.validate()?;
        let config = SessionConfig {
            solver: snapshot.solver.clone(),
            ..self.config_for(snapshot.pendulum.clone())
        };
        self.reconfigure(config)?;
        self.bodies = snapshot.bodies.clone();
        self.dataset = snapshot.dataset.clone();
        Ok(())
    }

    /// Results so far.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            config: self.config.clone(),
            steps: self.bodies.steps,
            sim_time: self.bodies.sim_time,
            runs: self.runs.clone(),
            dataset: self.dataset.clone(),
            fit: self.dataset.fit(),
            max_residual: self.max_residual,
            final_energy: self.total_energy(),
        }
    }

    /// Flushes and finalizes the telemetry sinks, then reports.
    pub fn finish(&mut self) -> SessionReport {
        self.bus.finalize();
        self.report()
    }

    fn emit_step_events(&self, snapshot: &BodySnapshot, step: &StepResult) {
        let gravity = self.config.pendulum.gravity;
        self.bus.emit_kind(
            snapshot.step,
            EventKind::StepCompleted {
                sim_time: snapshot.sim_time,
                wall_time: step.wall_time,
            },
        );
        self.bus.emit_kind(
            snapshot.step,
            EventKind::Energy {
                kinetic: snapshot.kinetic_energy(),
                potential: snapshot.potential_energy(gravity),
            },
        );
        self.bus.emit_kind(
            snapshot.step,
            EventKind::ConstraintResidual {
                residual: step.residual,
                within_tolerance: step.residual <= self.config.solver.residual_tolerance,
            },
        );
    }

    fn handle_progress(&mut self, snapshot: &BodySnapshot, progress: Progress) {
        let run = self.measurement.run_id();
        match progress {
            Progress::Unchanged => {}
            Progress::CountingStarted { .. } => {
                // Runs that start inside the band announce timing on their first entry.
                if let Some(start_time) = self.measurement.start_timestamp() {
                    self.bus
                        .emit_kind(snapshot.step, EventKind::CountingStarted { run, start_time });
                }
            }
            Progress::TimingStarted { start_time } => {
                self.bus
                    .emit_kind(snapshot.step, EventKind::CountingStarted { run, start_time });
            }
            Progress::Counted { observed } => {
                self.bus.emit_kind(
                    snapshot.step,
                    EventKind::OscillationCounted {
                        run,
                        observed,
                        target: self.measurement.oscillations_target(),
                    },
                );
            }
            Progress::Completed(summary) => {
                let point = summary.data_point();
                self.dataset.record(point);
                self.runs.push(summary);
                self.stall_reported = false;
                self.bus.emit_kind(
                    snapshot.step,
                    EventKind::RunCompleted {
                        run: summary.run,
                        length: point.length,
                        period: summary.period,
                        period_squared: point.period_squared,
                    },
                );
            }
        }
    }

    fn check_stall(&mut self, step: u64) {
        let Some(bound) = self.config.stall_step_bound else {
            return;
        };
        if self.stall_reported || !self.measurement.is_stalled(bound) {
            return;
        }
        self.stall_reported = true;
        let run = self.measurement.run_id();
        let steps_since_progress = self.measurement.steps_since_progress();
        tracing::warn!(
            run = run.0,
            state = self.measurement.state().name(),
            steps_since_progress,
            "measurement stalled"
        );
        self.bus.emit_kind(
            step,
            EventKind::MeasurementStalled {
                run,
                steps_since_progress,
            },
        );
    }

    fn cancel_run(&mut self) -> MeasurementState {
        let observed = self.measurement.oscillations_observed();
        let previous = self.measurement.cancel();
        if previous.is_active() {
            let run = self.measurement.run_id();
            tracing::debug!(run = run.0, observed, "measurement cancelled");
            self.bus
                .emit_kind(self.bodies.steps, EventKind::RunCancelled { run, observed });
        }
        self.stall_reported = false;
        previous
    }

    fn recover_from_degeneracy(&mut self, before: (u64, f64), snapshot: &BodySnapshot) -> PendulabError {
        let detail = if !snapshot.bob.is_finite() {
            format!(
                "bob state non-finite: pos = {:?}, vel = {:?}",
                snapshot.bob.position, snapshot.bob.velocity
            )
        } else {
            "constraint residual non-finite".to_string()
        };
        let step = before.0 + 1;
        tracing::warn!(step, detail = %detail, "numeric degeneracy, rebuilding bodies");

        self.cancel_run();
        match BodyStore::from_config(&self.config.pendulum) {
            Ok(mut bodies) => {
                bodies.steps = before.0;
                bodies.sim_time = before.1;
                self.bodies = bodies;
            }
            Err(e) => return e,
        }
        self.bus.emit_kind(
            step,
            EventKind::NumericDegeneracy {
                detail: detail.clone(),
            },
        );
        self.bus.flush();
        PendulabError::NumericDegeneracy { step, detail }
    }
}
