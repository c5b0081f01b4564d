//! Rigid-body store for the anchor and the bob.
//!
//! This is the primary mutable data structure during simulation. Only a
//! [`StepStrategy`](crate::strategy::StepStrategy) writes to it; every
//! other stage reads a [`BodySnapshot`](crate::state::BodySnapshot).

use serde::{Deserialize, Serialize};

use pendulab_math::planar::{self, offset_at_angle};
use pendulab_math::DVec2;
use pendulab_types::constants::{KICK_SPEED, KICK_SPIN};
use pendulab_types::{BodyId, PendulabResult};

use crate::config::{LaunchMode, PendulumConfig};
use crate::state::BodySnapshot;

/// Point-mass rigid body in the simulation plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Signed angular velocity about the anchor (rad/s).
    pub angular_velocity: f64,
    pub mass: f64,
    pub is_static: bool,
}

impl RigidBody {
    /// A static body pinned at `position` (infinite mass).
    pub fn fixed(position: DVec2) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            angular_velocity: 0.0,
            mass: f64::MAX,
            is_static: true,
        }
    }

    /// A dynamic body at rest.
    pub fn dynamic(position: DVec2, mass: f64) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            angular_velocity: 0.0,
            mass,
            is_static: false,
        }
    }

    /// `0` for static bodies.
    #[inline]
    pub fn inverse_mass(&self) -> f64 {
        if self.is_static {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// 0.5 * m * |v|². Static bodies carry none.
    pub fn kinetic_energy(&self) -> f64 {
        if self.is_static {
            return 0.0;
        }
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// True if position, velocity and spin are all finite.
    pub fn is_finite(&self) -> bool {
        planar::is_finite(self.position)
            && planar::is_finite(self.velocity)
            && self.angular_velocity.is_finite()
    }
}

/// The anchor–bob pair plus the step counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyStore {
    pub anchor: RigidBody,
    pub bob: RigidBody,
    /// Steps taken since the bodies were built.
    pub steps: u64,
    /// Simulated seconds since the bodies were built (sum of `dt`).
    pub sim_time: f64,
}

impl BodyStore {
    /// Builds the bodies for `config` with the anchor at the origin.
    pub fn from_config(config: &PendulumConfig) -> PendulabResult<Self> {
        Self::with_anchor(config, DVec2::ZERO)
    }

    /// Builds the bodies for `config` with the anchor at `anchor`.
    ///
    /// Validates the config first; an invalid config never yields bodies.
    pub fn with_anchor(config: &PendulumConfig, anchor: DVec2) -> PendulabResult<Self> {
        config.validate()?;

        let bob = match config.launch {
            LaunchMode::Release => RigidBody::dynamic(
                anchor + offset_at_angle(config.length, config.initial_angle),
                config.bob_mass,
            ),
            LaunchMode::Kick => {
                let mut bob = RigidBody::dynamic(
                    anchor + DVec2::new(0.0, config.length),
                    config.bob_mass,
                );
                let push = config.initial_angle.sin();
                bob.velocity = DVec2::new(KICK_SPEED * push, 0.0);
                bob.angular_velocity = KICK_SPIN * push;
                bob
            }
        };

        Ok(Self {
            anchor: RigidBody::fixed(anchor),
            bob,
            steps: 0,
            sim_time: 0.0,
        })
    }

    pub fn get(&self, id: BodyId) -> &RigidBody {
        match id {
            BodyId::Anchor => &self.anchor,
            BodyId::Bob => &self.bob,
        }
    }

    /// Anchor→bob vector.
    pub fn offset(&self) -> DVec2 {
        self.bob.position - self.anchor.position
    }

    /// Anchor–bob distance.
    pub fn separation(&self) -> f64 {
        self.offset().length()
    }

    pub fn is_finite(&self) -> bool {
        self.anchor.is_finite() && self.bob.is_finite() && self.sim_time.is_finite()
    }

    /// m g h of the bob, with h measured upward from the rest position
    /// `anchor.y + rest_length`.
    pub fn potential_energy(&self, rest_length: f64, gravity: f64) -> f64 {
        let rest_y = self.anchor.position.y + rest_length;
        self.bob.mass * gravity * (rest_y - self.bob.position.y)
    }

    /// Immutable view of the current state for downstream stages.
    pub fn snapshot(&self, rest_length: f64) -> BodySnapshot {
        BodySnapshot {
            step: self.steps,
            sim_time: self.sim_time,
            anchor: self.anchor,
            bob: self.bob,
            rest_length,
        }
    }
}
