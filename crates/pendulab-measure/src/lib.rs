//! # pendulab-measure
//!
//! Period measurement for the pendulum core.
//!
//! A [`MeasurementRun`] watches body snapshots, counts oscillation edges
//! through a proximity band around a reference height, and on completion
//! yields a [`DataPoint`] for the [`Dataset`].
//!
//! ## Key Types
//!
//! - [`MeasurementState`] — Idle → Armed → Counting → Complete → Idle
//! - [`MeasurementConfig`] — target count, band width, reference height
//! - [`Clock`] — source of `now()` for run timing (simulated or wall)
//! - [`Dataset`] — append-only (length, period²) series with a linear fit

pub mod automaton;
pub mod clock;
pub mod config;
pub mod dataset;

pub use automaton::{next_state, MeasurementRun, MeasurementState, Progress, RunSummary, SwingPhase, Trigger};
pub use clock::{Clock, SimulatedClock, TimingSource, WallClock};
pub use config::{MeasurementConfig, ReferencePoint};
pub use dataset::{DataPoint, Dataset, LinearFit};
