//! Simulation event types.
//!
//! Structured events emitted by the session during each tick. Events are
//! small value types carrying just enough data for monitoring a run.

use serde::{Deserialize, Serialize};

use pendulab_types::RunId;

/// A simulation event, tagged with the step it was emitted after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Steps taken when the event was emitted.
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// One fixed timestep finished.
    StepCompleted {
        /// Simulated time after the step (seconds).
        sim_time: f64,
        /// Wall-clock time spent in the step (seconds).
        wall_time: f64,
    },

    /// Energy of the bob after the step.
    Energy {
        /// 0.5 * m * v².
        kinetic: f64,
        /// m * g * h above the rest position.
        potential: f64,
    },

    /// Anchor–bob separation error after the constraint solve.
    ConstraintResidual {
        residual: f64,
        /// True when the residual is within the solver tolerance.
        within_tolerance: bool,
    },

    /// A run was armed.
    MeasurementArmed { run: RunId, reference_y: f64 },

    /// First band contact; timing started.
    CountingStarted { run: RunId, start_time: f64 },

    /// A band entry was credited as one oscillation.
    OscillationCounted { run: RunId, observed: u32, target: u32 },

    /// Target reached and a data point recorded.
    RunCompleted {
        run: RunId,
        length: f64,
        period: f64,
        period_squared: f64,
    },

    /// A run was stopped or reconfigured away before completing.
    RunCancelled { run: RunId, observed: u32 },

    /// An active run made no progress within the stall bound.
    MeasurementStalled { run: RunId, steps_since_progress: u64 },

    /// Body state went non-finite; bodies were rebuilt from config.
    NumericDegeneracy { detail: String },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl EventKind {
    /// Short snake_case label, used as the log message.
    pub fn label(&self) -> &str {
        match self {
            EventKind::StepCompleted { .. } => "step_completed",
            EventKind::Energy { .. } => "energy",
            EventKind::ConstraintResidual { .. } => "constraint_residual",
            EventKind::MeasurementArmed { .. } => "measurement_armed",
            EventKind::CountingStarted { .. } => "counting_started",
            EventKind::OscillationCounted { .. } => "oscillation_counted",
            EventKind::RunCompleted { .. } => "run_completed",
            EventKind::RunCancelled { .. } => "run_cancelled",
            EventKind::MeasurementStalled { .. } => "measurement_stalled",
            EventKind::NumericDegeneracy { .. } => "numeric_degeneracy",
            EventKind::Custom { label, .. } => label,
        }
    }

    /// True for the per-step variants emitted on every tick.
    pub fn is_per_step(&self) -> bool {
        matches!(
            self,
            EventKind::StepCompleted { .. } | EventKind::Energy { .. } | EventKind::ConstraintResidual { .. }
        )
    }
}

impl SimulationEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
