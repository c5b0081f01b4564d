//! State snapshot serialization for replay and debugging.
//!
//! Snapshots capture the full session state at a point in time. Restoring
//! the bodies from a snapshot and stepping with the same solver config
//! reproduces the original run exactly.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use pendulab_measure::{Dataset, MeasurementRun, MeasurementState};
use pendulab_physics::{BodyStore, PendulumConfig, SolverConfig};
use pendulab_types::{PendulabError, PendulabResult, RunId};

/// Measurement progress at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementStatus {
    pub state: MeasurementState,
    pub run: RunId,
    pub oscillations_observed: u32,
    pub oscillations_target: u32,
    pub reference_y: Option<f64>,
    pub steps_since_progress: u64,
}

impl MeasurementStatus {
    pub fn of(run: &MeasurementRun) -> Self {
        Self {
            state: run.state(),
            run: run.run_id(),
            oscillations_observed: run.oscillations_observed(),
            oscillations_target: run.oscillations_target(),
            reference_y: run.reference_y(),
            steps_since_progress: run.steps_since_progress(),
        }
    }
}

/// A complete session state snapshot.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub pendulum: PendulumConfig,
    pub solver: SolverConfig,
    /// Bodies and step counters.
    pub bodies: BodyStore,
    pub measurement: MeasurementStatus,
    pub dataset: Dataset,
}

impl StateSnapshot {
    pub fn capture(
        pendulum: &PendulumConfig,
        solver: &SolverConfig,
        bodies: &BodyStore,
        measurement: &MeasurementRun,
        dataset: &Dataset,
    ) -> Self {
        Self {
            pendulum: pendulum.clone(),
            solver: solver.clone(),
            bodies: bodies.clone(),
            measurement: MeasurementStatus::of(measurement),
            dataset: dataset.clone(),
        }
    }

    /// Steps taken at capture time.
    pub fn step(&self) -> u64 {
        self.bodies.steps
    }

    pub fn sim_time(&self) -> f64 {
        self.bodies.sim_time
    }

    /// Checks that the bodies belong to the captured pendulum.
    ///
    /// Fails with [`PendulabError::InvariantViolation`] on non-finite body
    /// state, a non-static anchor, or a bob whose mass differs from the
    /// pendulum's.
    pub fn validate(&self) -> PendulabResult<()> {
        let b = &self.bodies;
        if !b.is_finite() {
            return Err(PendulabError::InvariantViolation(format!(
                "snapshot at step {} holds non-finite body state",
                b.steps
            )));
        }
        if !b.anchor.is_static || b.bob.is_static {
            return Err(PendulabError::InvariantViolation(
                "snapshot anchor must be static and bob dynamic".into(),
            ));
        }
        if b.bob.mass != self.pendulum.bob_mass {
            return Err(PendulabError::InvariantViolation(format!(
                "snapshot bob mass {} kg does not match pendulum mass {} kg",
                b.bob.mass, self.pendulum.bob_mass
            )));
        }
        Ok(())
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> PendulabResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| PendulabError::Serialization(format!("Snapshot serialization failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> PendulabResult<Self> {
        bincode::deserialize(data)
            .map_err(|e| PendulabError::Serialization(format!("Snapshot deserialization failed: {e}")))
    }

    pub fn save(&self, path: &Path) -> PendulabResult<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> PendulabResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Multi-line human-readable description.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let b = &self.bodies;
        let m = &self.measurement;
        let _ = writeln!(out, "step {} (t = {:.4} s)", b.steps, b.sim_time);
        let _ = writeln!(
            out,
            "pendulum: L = {} m, m = {} kg, g = {} m/s², θ0 = {} rad",
            self.pendulum.length, self.pendulum.bob_mass, self.pendulum.gravity, self.pendulum.initial_angle
        );
        let _ = writeln!(
            out,
            "bob: pos = ({:.6}, {:.6}), vel = ({:.6}, {:.6}), ω = {:.6}",
            b.bob.position.x, b.bob.position.y, b.bob.velocity.x, b.bob.velocity.y, b.bob.angular_velocity
        );
        let _ = writeln!(
            out,
            "constraint error: {:.3e} m",
            (b.separation() - self.pendulum.length).abs()
        );
        let _ = writeln!(
            out,
            "measurement: run {} {:?}, {}/{} oscillations",
            m.run.0, m.state, m.oscillations_observed, m.oscillations_target
        );
        let _ = write!(out, "dataset: {} point(s)", self.dataset.len());
        out
    }
}
