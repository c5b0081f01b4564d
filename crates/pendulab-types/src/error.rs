//! Error types for the pendulab core.
//!
//! All crates return `PendulabResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the pendulab core.
#[derive(Debug, Error)]
pub enum PendulabError {
    /// Configuration value is invalid. Raised before the frame loop starts.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Body state became NaN or infinite during a step.
    #[error("Numeric degeneracy at step {step}: {detail}")]
    NumericDegeneracy {
        step: u64,
        detail: String,
    },

    /// A measurement command arrived in a state that cannot accept it.
    #[error("Measurement busy: {0}")]
    MeasurementBusy(String),

    /// A simulation invariant was violated.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, PendulabError>`.
pub type PendulabResult<T> = Result<T, PendulabError>;
