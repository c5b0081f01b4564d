//! Event bus — dispatches session events to pluggable sinks.
//!
//! Events go through a `std::sync::mpsc` channel and are handed to the
//! sinks on `flush()`, which the session calls once at the end of each
//! tick. Emitting never blocks the frame callback on a sink.

use std::sync::mpsc;

use crate::events::{EventKind, SimulationEvent};
use crate::sinks::EventSink;

/// Broadcast event bus for simulation telemetry.
pub struct EventBus {
    sender: mpsc::Sender<SimulationEvent>,
    receiver: mpsc::Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// Disabled bus is a no-op.
    enabled: bool,
    /// Events dispatched since creation.
    dispatched: u64,
}

impl EventBus {
    /// Creates a new event bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: true,
            dispatched: 0,
        }
    }

    /// Registers a sink to receive events.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus. Disabled bus drops events silently.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. No-op when the bus is disabled or has no sinks.
    pub fn emit(&self, event: SimulationEvent) {
        if !self.enabled || self.sinks.is_empty() {
            return;
        }
        // The receiver lives as long as the bus, so send cannot fail here.
        let _ = self.sender.send(event);
    }

    /// Shorthand for `emit(SimulationEvent::new(step, kind))`.
    pub fn emit_kind(&self, step: u64, kind: EventKind) {
        self.emit(SimulationEvent::new(step, kind));
    }

    /// Delivers all pending events to every sink, in emission order.
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
            self.dispatched += 1;
        }
    }

    /// Flushes, then lets every sink finalize.
    pub fn finalize(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Events delivered to sinks so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
