//! Pendulum and solver configuration.
//!
//! Both structs are immutable for the lifetime of a run. A change of
//! length or mass goes through session reconfiguration, which rebuilds
//! the bodies and cancels any measurement in progress.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use pendulab_types::constants::{DEFAULT_DT, DEFAULT_RESIDUAL_TOLERANCE, GRAVITY, KICK_SPEED};
use pendulab_types::{PendulabError, PendulabResult};

/// How the bob is set in motion when the bodies are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// Bob displaced to `initial_angle` and released from rest.
    #[default]
    Release,
    /// Bob at the rest position, pushed sideways with a speed
    /// proportional to `sin(initial_angle)`.
    Kick,
}

/// Physical parameters of one pendulum session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumConfig {
    /// Link length (metres, > 0).
    pub length: f64,

    /// Bob mass (kg, > 0).
    pub bob_mass: f64,

    /// Gravitational acceleration along +Y (m/s², screen-down).
    pub gravity: f64,

    /// Launch angle from vertical (radians).
    pub initial_angle: f64,

    /// Launch style.
    #[serde(default)]
    pub launch: LaunchMode,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            length: 1.0,
            bob_mass: 1.0,
            gravity: GRAVITY,
            initial_angle: 0.35,
            launch: LaunchMode::Release,
        }
    }
}

impl PendulumConfig {
    /// Creates a released pendulum with standard gravity.
    pub fn new(length: f64, bob_mass: f64, initial_angle: f64) -> Self {
        Self {
            length,
            bob_mass,
            initial_angle,
            ..Default::default()
        }
    }

    /// Returns a copy with a different link length.
    pub fn with_length(&self, length: f64) -> Self {
        Self {
            length,
            ..self.clone()
        }
    }

    /// Returns a copy with a different bob mass.
    pub fn with_mass(&self, bob_mass: f64) -> Self {
        Self {
            bob_mass,
            ..self.clone()
        }
    }

    /// Visual sizing factor for the bob: `sqrt(bob_mass)`.
    ///
    /// A display heuristic, not the cube-root law of equal-density spheres.
    pub fn bob_radius_scale(&self) -> f64 {
        self.bob_mass.sqrt()
    }

    /// Small-angle period `2π√(L/g)`, or `None` when gravity is not positive.
    pub fn theoretical_period(&self) -> Option<f64> {
        if self.gravity > 0.0 {
            Some(2.0 * PI * (self.length / self.gravity).sqrt())
        } else {
            None
        }
    }

    /// Highest rise of the bob above rest, ignoring damping.
    ///
    /// `L(1 - cos θ)` for a release; for a kick, the height the launch
    /// speed reaches, capped at the top of the circle.
    pub fn swing_height(&self) -> f64 {
        match self.launch {
            LaunchMode::Release => self.length * (1.0 - self.initial_angle.cos()),
            LaunchMode::Kick => {
                if self.gravity <= 0.0 {
                    return 2.0 * self.length;
                }
                let speed = KICK_SPEED * self.initial_angle.sin();
                (speed * speed / (2.0 * self.gravity)).min(2.0 * self.length)
            }
        }
    }

    /// Rejects non-positive or non-finite input before a session starts.
    pub fn validate(&self) -> PendulabResult<()> {
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(PendulabError::InvalidConfig(format!(
                "Pendulum length must be positive and finite, got {}",
                self.length
            )));
        }
        if !self.bob_mass.is_finite() || self.bob_mass <= 0.0 {
            return Err(PendulabError::InvalidConfig(format!(
                "Bob mass must be positive and finite, got {}",
                self.bob_mass
            )));
        }
        if !self.gravity.is_finite() {
            return Err(PendulabError::InvalidConfig(format!(
                "Gravity must be finite, got {}",
                self.gravity
            )));
        }
        if !self.initial_angle.is_finite() {
            return Err(PendulabError::InvalidConfig(format!(
                "Initial angle must be finite, got {}",
                self.initial_angle
            )));
        }
        Ok(())
    }
}

/// Configuration for the stepper and constraint solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Fixed timestep (seconds). Independent of the host frame cadence.
    pub dt: f64,

    /// Constraint stiffness in (0, 1]. 1 projects exactly onto the link circle.
    pub stiffness: f64,

    /// Per-step velocity loss in [0, 1). 0 = undamped.
    pub air_friction: f64,

    /// Largest separation error (metres) accepted as "on the link".
    pub residual_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            stiffness: 1.0,
            air_friction: 0.0,
            residual_tolerance: DEFAULT_RESIDUAL_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Rigid, undamped link (the canonical lab setup).
    pub fn rigid() -> Self {
        Self::default()
    }

    /// Soft link with the given stiffness.
    pub fn soft(stiffness: f64) -> Self {
        Self {
            stiffness,
            ..Default::default()
        }
    }

    /// Rigid link with air friction.
    pub fn damped(air_friction: f64) -> Self {
        Self {
            air_friction,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> PendulabResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(PendulabError::InvalidConfig(format!(
                "Timestep dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if self.dt > 1.0 {
            return Err(PendulabError::InvalidConfig(
                "Timestep dt > 1.0 is unreasonably large".into(),
            ));
        }
        if !(self.stiffness > 0.0 && self.stiffness <= 1.0) {
            return Err(PendulabError::InvalidConfig(format!(
                "Constraint stiffness must lie in (0, 1], got {}",
                self.stiffness
            )));
        }
        if !(self.air_friction >= 0.0 && self.air_friction < 1.0) {
            return Err(PendulabError::InvalidConfig(format!(
                "Air friction must lie in [0, 1), got {}",
                self.air_friction
            )));
        }
        if !self.residual_tolerance.is_finite() || self.residual_tolerance <= 0.0 {
            return Err(PendulabError::InvalidConfig(
                "Residual tolerance must be positive and finite".into(),
            ));
        }
        Ok(())
    }
}
