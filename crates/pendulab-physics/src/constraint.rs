//! Fixed-length link between the anchor and the bob.
//!
//! Position-based: the bob is moved along the link direction toward the
//! rest length, then its velocity is replaced by the purely tangential
//! velocity carrying the same angular momentum about the anchor (the link
//! force is central). Both corrections scale with stiffness, so stiffness 1
//! lands the bob exactly on the link circle with purely tangential motion.

use serde::{Deserialize, Serialize};

use pendulab_math::DVec2;
use pendulab_types::constants::EPSILON;

use crate::body::RigidBody;

/// Distance constraint between two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceConstraint {
    /// Target separation (metres).
    pub length: f64,
    /// Fraction of the error corrected per solve, in (0, 1].
    pub stiffness: f64,
}

impl DistanceConstraint {
    pub fn new(length: f64, stiffness: f64) -> Self {
        Self { length, stiffness }
    }

    /// Fully rigid link.
    pub fn rigid(length: f64) -> Self {
        Self::new(length, 1.0)
    }
}

/// Outcome of one constraint solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintResult {
    /// |separation − length| before the solve.
    pub initial_error: f64,
    /// |separation − length| after the solve.
    pub residual: f64,
    /// Magnitude of the velocity change applied to the bob (m/s).
    pub velocity_correction: f64,
}

/// Pulls `bob` toward `constraint.length` from `anchor`.
///
/// Only the bob moves; the anchor is read-only here. A static bob is left
/// untouched. When the bob sits on the anchor the link direction is
/// undefined and +Y (straight down) is used.
pub fn apply_constraint(
    anchor: &RigidBody,
    bob: &mut RigidBody,
    constraint: &DistanceConstraint,
) -> ConstraintResult {
    let offset = bob.position - anchor.position;
    let dist = offset.length();
    let initial_error = (dist - constraint.length).abs();

    if bob.is_static {
        return ConstraintResult {
            initial_error,
            residual: initial_error,
            velocity_correction: 0.0,
        };
    }

    let normal = if dist > EPSILON { offset / dist } else { DVec2::Y };

    // Angular momentum (per unit mass) about the anchor, before projection.
    let rel_velocity = bob.velocity - anchor.velocity;
    let momentum = offset.perp_dot(rel_velocity);

    // Position: move along the link by stiffness * error.
    let error = dist - constraint.length;
    bob.position -= normal * (error * constraint.stiffness);

    // Velocity: tangential motion with the same angular momentum.
    let new_offset = bob.position - anchor.position;
    let r2 = new_offset.length_squared();
    let mut correction = DVec2::ZERO;
    if r2 > EPSILON {
        let tangential = new_offset.perp() * (momentum / r2);
        correction = (tangential - rel_velocity) * constraint.stiffness;
        bob.velocity += correction;
    }

    ConstraintResult {
        initial_error,
        residual: (new_offset.length() - constraint.length).abs(),
        velocity_correction: correction.length(),
    }
}
