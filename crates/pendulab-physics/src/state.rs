//! Immutable body snapshot handed between pipeline stages.
//!
//! The stepper produces one snapshot per step; the render mirror and the
//! measurement automaton consume it. Neither can reach back into the
//! mutable [`BodyStore`](crate::body::BodyStore).

use serde::{Deserialize, Serialize};

use pendulab_math::planar::angle_from_vertical;
use pendulab_math::DVec2;

use crate::body::RigidBody;

/// Copy of the body state after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    /// Steps taken when the snapshot was captured.
    pub step: u64,
    /// Simulated time (seconds).
    pub sim_time: f64,
    pub anchor: RigidBody,
    pub bob: RigidBody,
    /// Constraint rest length (metres).
    pub rest_length: f64,
}

impl BodySnapshot {
    /// Anchor→bob vector.
    pub fn offset(&self) -> DVec2 {
        self.bob.position - self.anchor.position
    }

    /// Current anchor–bob distance.
    pub fn separation(&self) -> f64 {
        self.offset().length()
    }

    /// |separation − rest length|.
    pub fn constraint_error(&self) -> f64 {
        (self.separation() - self.rest_length).abs()
    }

    /// Swing angle from vertical (radians).
    pub fn angle(&self) -> f64 {
        angle_from_vertical(self.offset())
    }

    /// Y of the bob when hanging at rest.
    pub fn rest_y(&self) -> f64 {
        self.anchor.position.y + self.rest_length
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bob.kinetic_energy()
    }

    /// m g h, with h measured upward from the rest position.
    pub fn potential_energy(&self, gravity: f64) -> f64 {
        self.bob.mass * gravity * (self.rest_y() - self.bob.position.y)
    }

    pub fn is_finite(&self) -> bool {
        self.anchor.is_finite() && self.bob.is_finite() && self.sim_time.is_finite()
    }
}
