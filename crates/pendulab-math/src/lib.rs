//! # pendulab-math
//!
//! Vector primitives for the pendulab simulation core.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec2`, `DVec3`, `DQuat`)
//! - Planar pendulum geometry (angle from vertical, offsets, lifting to 3D)
//! - Orientation helpers for aligning a unit rod with an arbitrary direction

pub mod orient;
pub mod planar;

// Re-export glam types as the canonical math types for pendulab.
pub use glam::{DQuat, DVec2, DVec3};
