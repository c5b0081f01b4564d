//! # pendulab-telemetry
//!
//! Event bus for simulation telemetry. Emits structured events
//! (step timing, energy, constraint residual, measurement progress)
//! that pluggable sinks consume: in-memory buffers for tests and
//! callers, or the `tracing` log.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, SharedVecSink, TracingSink, VecSink};
