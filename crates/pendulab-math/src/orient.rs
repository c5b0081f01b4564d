//! Orientation helpers for rod-like meshes.
//!
//! Cylinder meshes are authored along +Y. These helpers rotate that axis
//! onto the anchor→bob direction.

use glam::{DQuat, DVec3};

/// Rotation taking the +Y axis onto `direction`.
///
/// A zero or non-finite direction yields the identity rotation.
pub fn align_y_to(direction: DVec3) -> DQuat {
    match direction.try_normalize() {
        Some(dir) => DQuat::from_rotation_arc(DVec3::Y, dir),
        None => DQuat::IDENTITY,
    }
}
