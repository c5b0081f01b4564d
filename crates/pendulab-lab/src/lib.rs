//! # pendulab-lab
//!
//! Experiment procedures for the pendulum core.
//!
//! Provides canonical lab scenarios, a sweep runner that measures one
//! period per length while the dataset accumulates across
//! reconfigurations, and CSV export for the resulting metrics.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::RunMetrics;
pub use runner::{SweepReport, SweepRunner};
pub use scenarios::{Scenario, ScenarioKind};
