//! Lab scenarios — pendulum, solver and length schedule for each experiment.
//!
//! Three canonical scenarios:
//! 1. **Seconds pendulum** — L = g/π², a 2 s period
//! 2. **Short pendulum** — L = 0.25 m, a fast 1 s swing
//! 3. **Length sweep** — six lengths from 0.25 m to 1.5 m for the T²-vs-L plot

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use pendulab_io::SessionConfig;
use pendulab_physics::{PendulumConfig, SolverConfig};
use pendulab_types::constants::{DEFAULT_OSCILLATIONS, GRAVITY};

/// Release angle for every scenario: inside the small-angle regime.
pub const LAB_RELEASE_ANGLE: f64 = 0.08;

/// Which scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    SecondsPendulum,
    ShortPendulum,
    LengthSweep,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::SecondsPendulum,
            ScenarioKind::ShortPendulum,
            ScenarioKind::LengthSweep,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::SecondsPendulum => "seconds_pendulum",
            ScenarioKind::ShortPendulum => "short_pendulum",
            ScenarioKind::LengthSweep => "length_sweep",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified lab scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    /// Pendulum for the first length; later lengths reuse mass, gravity
    /// and angle.
    pub pendulum: PendulumConfig,
    pub solver: SolverConfig,
    /// Lengths to measure, in order (metres).
    pub lengths: Vec<f64>,
    /// Oscillations per run.
    pub oscillations: u32,
    /// Frame budget per run before the length is given up.
    pub max_frames_per_run: u64,
}

impl Scenario {
    /// Length with a 2 s period: `g / π²` (≈ 0.994 m).
    pub fn seconds_pendulum() -> Self {
        Self::single(ScenarioKind::SecondsPendulum, GRAVITY / (PI * PI))
    }

    pub fn short_pendulum() -> Self {
        Self::single(ScenarioKind::ShortPendulum, 0.25)
    }

    pub fn length_sweep() -> Self {
        Self::with_lengths(ScenarioKind::LengthSweep, vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5])
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::SecondsPendulum => Self::seconds_pendulum(),
            ScenarioKind::ShortPendulum => Self::short_pendulum(),
            ScenarioKind::LengthSweep => Self::length_sweep(),
        }
    }

    /// A length sweep over caller-chosen lengths.
    pub fn custom_sweep(lengths: Vec<f64>) -> Self {
        Self::with_lengths(ScenarioKind::LengthSweep, lengths)
    }

    /// Overrides the oscillations timed per run.
    pub fn with_oscillations(mut self, oscillations: u32) -> Self {
        self.oscillations = oscillations;
        self
    }

    /// Session configuration for measuring at `length`.
    pub fn session_config(&self, length: f64) -> SessionConfig {
        let mut config = SessionConfig::for_pendulum(self.pendulum.with_length(length));
        config.solver = self.solver.clone();
        config.measurement.oscillations_target = self.oscillations;
        config
    }

    fn single(kind: ScenarioKind, length: f64) -> Self {
        Self::with_lengths(kind, vec![length])
    }

    fn with_lengths(kind: ScenarioKind, lengths: Vec<f64>) -> Self {
        let first = lengths.first().copied().unwrap_or(1.0);
        Self {
            kind,
            pendulum: PendulumConfig::new(first, 1.0, LAB_RELEASE_ANGLE),
            solver: SolverConfig::rigid(),
            lengths,
            oscillations: DEFAULT_OSCILLATIONS,
            max_frames_per_run: 20_000,
        }
    }
}
