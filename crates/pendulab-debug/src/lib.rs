//! # pendulab-debug
//!
//! State snapshots for debugging simulation issues. A snapshot captures
//! the bodies, configuration, measurement progress and dataset of a
//! session, serialized to binary for replay and offline inspection.

pub mod snapshot;

pub use snapshot::{MeasurementStatus, StateSnapshot};
