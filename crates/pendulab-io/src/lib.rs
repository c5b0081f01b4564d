//! # pendulab-io
//!
//! Session input/output contract and configuration validation.
//!
//! Defines the boundary types that external systems (CLI, UI collaborators,
//! experiment scripts) use to configure a pendulum session and read its
//! results back.

pub mod contract;
pub mod validator;

pub use contract::{SessionConfig, SessionReport};
pub use validator::validate_config;
