//! Planar pendulum geometry.
//!
//! The simulation plane uses screen orientation: +X right, +Y down.
//! A bob hanging at rest sits at `anchor + (0, length)` and its angle
//! from vertical is zero. Positive angles swing toward +X.

use glam::{DVec2, DVec3};

/// Offset of a bob at `angle` radians from vertical on a link of `length`.
#[inline]
pub fn offset_at_angle(length: f64, angle: f64) -> DVec2 {
    DVec2::new(length * angle.sin(), length * angle.cos())
}

/// Angle from vertical of an anchor→bob offset (radians, in (-π, π]).
#[inline]
pub fn angle_from_vertical(offset: DVec2) -> f64 {
    offset.x.atan2(offset.y)
}

/// Signed angular velocity of a point moving with `velocity` at `offset`
/// from the pivot: (r × v) / |r|².
///
/// Returns 0 for a zero-length offset.
#[inline]
pub fn angular_velocity(offset: DVec2, velocity: DVec2) -> f64 {
    let r2 = offset.length_squared();
    if r2 <= f64::EPSILON {
        return 0.0;
    }
    offset.perp_dot(velocity) / r2
}

/// Lifts a plane vector into 3D at z = 0.
#[inline]
pub fn lift(v: DVec2) -> DVec3 {
    v.extend(0.0)
}

/// True if both components are finite.
#[inline]
pub fn is_finite(v: DVec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
