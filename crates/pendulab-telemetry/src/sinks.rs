//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them (collect in memory,
//! forward to the `tracing` log, etc.).

use std::sync::{Arc, Mutex, PoisonError};

use crate::events::{EventKind, SimulationEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the session ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// A simple sink that collects events in a `Vec`.
pub struct VecSink {
    /// Collected events.
    pub events: Vec<SimulationEvent>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        self.events.push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Collects events into a buffer the caller keeps a handle to.
///
/// Once a sink is boxed into the bus it can no longer be inspected;
/// clone this sink first and read the clone.
#[derive(Clone, Default)]
pub struct SharedVecSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
    per_step: bool,
}

impl SharedVecSink {
    /// Creates a sink that keeps every event.
    pub fn new() -> Self {
        Self {
            events: Arc::default(),
            per_step: true,
        }
    }

    /// Creates a sink that drops the per-step variants (step, energy,
    /// residual) and keeps measurement and error events only.
    pub fn milestones() -> Self {
        Self {
            events: Arc::default(),
            per_step: false,
        }
    }

    /// Copy of the events collected so far.
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for SharedVecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if !self.per_step && event.kind.is_per_step() {
            return;
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn name(&self) -> &str {
        "shared_vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
///
/// Per-step events go out at `TRACE`, so a default `INFO` subscriber only
/// shows measurement progress.
pub struct TracingSink {
    per_step_level: tracing::Level,
}

impl TracingSink {
    /// Creates a tracing sink that logs per-step events at `per_step_level`.
    pub fn new(per_step_level: tracing::Level) -> Self {
        Self { per_step_level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(tracing::Level::TRACE)
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if event.kind.is_per_step() {
            match self.per_step_level {
                tracing::Level::DEBUG => {
                    tracing::debug!(step = event.step, event = ?event.kind, "simulation_event")
                }
                tracing::Level::INFO => {
                    tracing::info!(step = event.step, event = ?event.kind, "simulation_event")
                }
                _ => tracing::trace!(step = event.step, event = ?event.kind, "simulation_event"),
            }
            return;
        }
        match &event.kind {
            EventKind::MeasurementStalled { .. } | EventKind::NumericDegeneracy { .. } => {
                tracing::warn!(step = event.step, event = ?event.kind, "{}", event.kind.label())
            }
            _ => tracing::info!(step = event.step, event = ?event.kind, "{}", event.kind.label()),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
