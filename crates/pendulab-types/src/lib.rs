//! # pendulab-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the pendulab pendulum simulation core.
//!
//! This crate has zero domain logic; it defines the vocabulary
//! that all other pendulab crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{PendulabError, PendulabResult};
pub use ids::{BodyId, RunId};
