//! # pendulab-physics
//!
//! Body state, the anchor–bob link constraint, and fixed-timestep
//! integration for a single planar pendulum.
//!
//! ## Key Types
//!
//! - [`BodyStore`] — the anchor and bob, mutated only by a stepper
//! - [`DistanceConstraint`] — fixed-length link with stiffness in (0, 1]
//! - [`StepStrategy`] — pluggable integrator trait
//! - [`SemiImplicitEuler`] — gravity, integrate, project, recompute spin
//! - [`BodySnapshot`] — immutable per-step view handed to downstream stages
//! - [`PendulumConfig`] / [`SolverConfig`] — validated session parameters

pub mod body;
pub mod config;
pub mod constraint;
pub mod semi_implicit;
pub mod state;
pub mod strategy;

pub use body::{BodyStore, RigidBody};
pub use config::{LaunchMode, PendulumConfig, SolverConfig};
pub use constraint::{apply_constraint, ConstraintResult, DistanceConstraint};
pub use semi_implicit::SemiImplicitEuler;
pub use state::BodySnapshot;
pub use strategy::{StepResult, StepStrategy};
