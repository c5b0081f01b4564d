//! Time sources for run timing.
//!
//! The stepper always advances by a fixed `dt`. A run's elapsed time can be
//! read either from that simulated time or from the host's wall clock; the
//! two drift apart whenever the frame cadence is not exactly `1/dt`.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Which clock a session times its runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    /// Sum of fixed timesteps. Deterministic.
    #[default]
    Simulated,
    /// Real elapsed time since the clock was created.
    WallClock,
}

impl TimingSource {
    /// Builds the clock for this source.
    pub fn clock(self) -> Box<dyn Clock> {
        match self {
            TimingSource::Simulated => Box::new(SimulatedClock),
            TimingSource::WallClock => Box::new(WallClock::new()),
        }
    }
}

/// Source of `now()` in seconds.
pub trait Clock: Send {
    /// Current time given the simulated time of the latest snapshot.
    fn now(&self, sim_time: f64) -> f64;

    fn name(&self) -> &str;
}

/// Reads the simulated time straight from the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedClock;

impl Clock for SimulatedClock {
    fn now(&self, sim_time: f64) -> f64 {
        sim_time
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self, _sim_time: f64) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn name(&self) -> &str {
        "wall_clock"
    }
}
