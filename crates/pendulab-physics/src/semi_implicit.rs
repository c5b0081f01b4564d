//! Semi-implicit Euler stepper.
//!
//! Velocity is updated from gravity first, then position from the new
//! velocity, then the link constraint is solved and the bob's angular
//! velocity is recomputed from its tangential motion.

use std::time::Instant;

use pendulab_math::planar::angular_velocity;
use pendulab_types::PendulabResult;

use crate::body::BodyStore;
use crate::config::SolverConfig;
use crate::constraint::{apply_constraint, DistanceConstraint};
use crate::strategy::{StepResult, StepStrategy};

/// Fixed-timestep semi-implicit Euler integrator.
pub struct SemiImplicitEuler {
    air_friction: f64,
}

impl SemiImplicitEuler {
    /// Creates an undamped stepper.
    pub fn new() -> Self {
        Self { air_friction: 0.0 }
    }

    /// Creates a stepper using the damping from `config`.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            air_friction: config.air_friction,
        }
    }
}

impl Default for SemiImplicitEuler {
    fn default() -> Self {
        Self::new()
    }
}

impl StepStrategy for SemiImplicitEuler {
    fn init(&mut self, config: &SolverConfig) -> PendulabResult<()> {
        config.validate()?;
        self.air_friction = config.air_friction;
        Ok(())
    }

    fn step(
        &mut self,
        bodies: &mut BodyStore,
        constraint: &DistanceConstraint,
        gravity: f64,
        dt: f64,
    ) -> PendulabResult<StepResult> {
        let start = Instant::now();

        // 1. Gravity and air friction act on velocity
        if !bodies.bob.is_static {
            bodies.bob.velocity.y += gravity * dt;
            bodies.bob.velocity *= 1.0 - self.air_friction;

            // 2. Integrate position with the updated velocity
            bodies.bob.position += bodies.bob.velocity * dt;
        }

        // 3. Link constraint
        let solve = apply_constraint(&bodies.anchor, &mut bodies.bob, constraint);

        // 4. Spin from tangential motion
        let offset = bodies.bob.position - bodies.anchor.position;
        bodies.bob.angular_velocity = angular_velocity(offset, bodies.bob.velocity);

        bodies.steps += 1;
        bodies.sim_time += dt;

        Ok(StepResult {
            residual: solve.residual,
            velocity_correction: solve.velocity_correction,
            wall_time: start.elapsed().as_secs_f64(),
        })
    }

    fn name(&self) -> &str {
        "semi_implicit_euler"
    }
}
