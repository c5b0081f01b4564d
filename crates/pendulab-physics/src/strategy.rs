//! Step strategy trait for time integration.
//!
//! The session holds one strategy and calls it once per frame:
//!
//! ```text
//! strategy.init(&solver_config)?;
//! loop {
//!     strategy.step(&mut bodies, &constraint, gravity, dt)?;
//!     let snapshot = bodies.snapshot(constraint.length);
//! }
//! ```

use pendulab_types::PendulabResult;

use crate::body::BodyStore;
use crate::config::SolverConfig;
use crate::constraint::DistanceConstraint;

/// Result of a single step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Separation error after the constraint solve (metres).
    pub residual: f64,
    /// Velocity change applied by the constraint (m/s).
    pub velocity_correction: f64,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
}

/// Trait for time integration strategies.
///
/// # Implementations
///
/// - [`SemiImplicitEuler`](crate::semi_implicit::SemiImplicitEuler) — the lab integrator
pub trait StepStrategy: Send {
    /// Load solver parameters. Called before the first step and again
    /// whenever the session is reconfigured.
    fn init(&mut self, config: &SolverConfig) -> PendulabResult<()> {
        let _ = config;
        Ok(())
    }

    /// Advance the bodies by one fixed timestep.
    ///
    /// Mutates `bodies` in place and increments its step counter.
    fn step(
        &mut self,
        bodies: &mut BodyStore,
        constraint: &DistanceConstraint,
        gravity: f64,
        dt: f64,
    ) -> PendulabResult<StepResult>;

    /// Returns the strategy's name.
    fn name(&self) -> &str;
}
