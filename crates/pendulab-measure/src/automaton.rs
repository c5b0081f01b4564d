//! Measurement automaton — times a fixed number of oscillations.
//!
//! ```text
//!   Idle ──start──▶ Armed ──band contact──▶ Counting ──target──▶ Complete
//!    ▲                │                        │                    │
//!    └──cancel────────┴────────cancel──────────┘◀──────recorded─────┘
//! ```
//!
//! The band is `|bob.y - reference_y| < proximity_band`. While Counting,
//! only outside→inside edges are candidates, and an edge is credited only
//! when the bob enters in the same swing phase (direction of travel, side
//! of the anchor) it had when Counting began. The bob passes the reference
//! height several times per cycle; the phase match keeps exactly one
//! credited edge per full cycle, so `elapsed / target` is the period.
//!
//! When Counting begins with the bob already inside the band (a kick from
//! rest, or a reference taken at the arming position) there is no entry
//! phase yet. The timing origin then moves to the first real
//! outside→inside edge, which is not credited.

use serde::{Deserialize, Serialize};

use pendulab_physics::BodySnapshot;
use pendulab_types::{PendulabError, PendulabResult, RunId};

use crate::config::{MeasurementConfig, ReferencePoint};
use crate::dataset::DataPoint;

/// Automaton state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementState {
    #[default]
    Idle,
    Armed,
    Counting,
    Complete,
}

impl MeasurementState {
    pub fn name(self) -> &'static str {
        match self {
            MeasurementState::Idle => "idle",
            MeasurementState::Armed => "armed",
            MeasurementState::Counting => "counting",
            MeasurementState::Complete => "complete",
        }
    }

    /// True while a run is in progress.
    pub fn is_active(self) -> bool {
        matches!(self, MeasurementState::Armed | MeasurementState::Counting)
    }
}

/// Input to the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Start command from the caller.
    Start,
    /// Bob observed inside the proximity band.
    BandContact,
    /// Credited oscillations reached the target.
    TargetReached,
    /// Data point handed to the dataset.
    Recorded,
    /// Stop command or reconfiguration.
    Cancel,
}

/// Transition table.
///
/// `None` marks a trigger the state cannot accept (a second `Start` while a
/// run is in progress). Triggers that do not apply to a state leave it
/// unchanged.
pub fn next_state(state: MeasurementState, trigger: Trigger) -> Option<MeasurementState> {
    use MeasurementState::*;

    match (state, trigger) {
        (_, Trigger::Cancel) => Some(Idle),
        (Idle, Trigger::Start) => Some(Armed),
        (_, Trigger::Start) => None,
        (Armed, Trigger::BandContact) => Some(Counting),
        (Counting, Trigger::TargetReached) => Some(Complete),
        (Complete, Trigger::Recorded) => Some(Idle),
        (s, _) => Some(s),
    }
}

/// Direction of travel and side of the anchor at a band entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingPhase {
    pub moving_right: bool,
    pub right_of_anchor: bool,
}

impl SwingPhase {
    pub fn of(snapshot: &BodySnapshot) -> Self {
        Self {
            moving_right: snapshot.bob.velocity.x >= 0.0,
            right_of_anchor: snapshot.offset().x >= 0.0,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run: RunId,
    /// Link length the run was armed with (metres).
    pub length: f64,
    pub oscillations: u32,
    /// Seconds between the timing origin and the last credited edge.
    pub elapsed: f64,
    /// `elapsed / oscillations`.
    pub period: f64,
    /// Step at which the run completed.
    pub completed_at_step: u64,
}

impl RunSummary {
    pub fn data_point(&self) -> DataPoint {
        DataPoint::from_period(self.length, self.period)
    }
}

/// What one observation did to the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// No transition and no credited edge.
    Unchanged,
    /// Armed → Counting on first band contact.
    CountingStarted { reference_y: f64 },
    /// Timing origin set on the first real band entry, for runs that
    /// started counting inside the band.
    TimingStarted { start_time: f64 },
    /// One more oscillation credited.
    Counted { observed: u32 },
    /// Target reached; the run passed through Complete back to Idle.
    Completed(RunSummary),
}

/// One measurement run and its in-progress counters.
#[derive(Debug, Clone)]
pub struct MeasurementRun {
    config: MeasurementConfig,
    state: MeasurementState,
    run: RunId,
    length: f64,
    oscillations_observed: u32,
    start_timestamp: Option<f64>,
    reference_y: Option<f64>,
    start_phase: Option<SwingPhase>,
    was_inside: bool,
    steps_since_progress: u64,
}

impl MeasurementRun {
    pub fn new(config: MeasurementConfig) -> Self {
        Self {
            config,
            state: MeasurementState::Idle,
            run: RunId(0),
            length: 0.0,
            oscillations_observed: 0,
            start_timestamp: None,
            reference_y: None,
            start_phase: None,
            was_inside: false,
            steps_since_progress: 0,
        }
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    pub fn state(&self) -> MeasurementState {
        self.state
    }

    /// Id of the most recently armed run (0 before the first start).
    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn oscillations_observed(&self) -> u32 {
        self.oscillations_observed
    }

    pub fn oscillations_target(&self) -> u32 {
        self.config.oscillations_target
    }

    pub fn start_timestamp(&self) -> Option<f64> {
        self.start_timestamp
    }

    pub fn reference_y(&self) -> Option<f64> {
        self.reference_y
    }

    /// Observations since the run last moved forward (arming, first
    /// contact, or a credited edge).
    pub fn steps_since_progress(&self) -> u64 {
        self.steps_since_progress
    }

    /// True when an active run has made no progress for `bound` steps.
    ///
    /// The run is never cancelled here; the caller decides.
    pub fn is_stalled(&self, bound: u64) -> bool {
        self.state.is_active() && self.steps_since_progress >= bound
    }

    /// Arms a run against `snapshot`.
    ///
    /// A bob already inside the band at arming has not entered it; its
    /// first contact defers the timing origin.
    pub fn start(&mut self, snapshot: &BodySnapshot) -> PendulabResult<RunId> {
        let next = next_state(self.state, Trigger::Start).ok_or_else(|| {
            PendulabError::MeasurementBusy(format!(
                "run {} is {}",
                self.run.0,
                self.state.name()
            ))
        })?;

        let reference_y = match self.config.reference {
            ReferencePoint::Equilibrium => snapshot.rest_y(),
            ReferencePoint::ArmingPosition => snapshot.bob.position.y,
        };

        self.clear_counters();
        self.run = self.run.next();
        self.length = snapshot.rest_length;
        self.reference_y = Some(reference_y);
        self.was_inside = self.is_inside(snapshot, reference_y);
        self.transition(next);
        Ok(self.run)
    }

    /// Stops an in-progress run without crediting it.
    ///
    /// Returns the state the run was in.
    pub fn cancel(&mut self) -> MeasurementState {
        let previous = self.state;
        self.clear_counters();
        self.reference_y = None;
        self.transition(MeasurementState::Idle);
        previous
    }

    /// Cancels and swaps in a new configuration.
    pub fn reset(&mut self, config: MeasurementConfig) -> MeasurementState {
        let previous = self.cancel();
        self.config = config;
        previous
    }

    /// Feeds one post-step snapshot, timestamped with `now`.
    pub fn observe(&mut self, snapshot: &BodySnapshot, now: f64) -> Progress {
        let reference_y = match (self.state.is_active(), self.reference_y) {
            (true, Some(y)) => y,
            _ => return Progress::Unchanged,
        };

        self.steps_since_progress += 1;
        let inside = self.is_inside(snapshot, reference_y);
        let entered = inside && !self.was_inside;
        self.was_inside = inside;

        match self.state {
            MeasurementState::Armed => {
                if !inside {
                    return Progress::Unchanged;
                }
                self.transition(MeasurementState::Counting);
                self.oscillations_observed = 0;
                self.steps_since_progress = 0;
                if entered {
                    self.start_timestamp = Some(now);
                    self.start_phase = Some(SwingPhase::of(snapshot));
                }
                Progress::CountingStarted { reference_y }
            }
            MeasurementState::Counting => {
                if !entered {
                    return Progress::Unchanged;
                }
                let phase = SwingPhase::of(snapshot);
                let Some(start_phase) = self.start_phase else {
                    self.start_timestamp = Some(now);
                    self.start_phase = Some(phase);
                    self.steps_since_progress = 0;
                    tracing::debug!(run = self.run.0, start_time = now, "timing origin set");
                    return Progress::TimingStarted { start_time: now };
                };
                if phase != start_phase {
                    return Progress::Unchanged;
                }

                self.oscillations_observed += 1;
                self.steps_since_progress = 0;
                if self.oscillations_observed < self.config.oscillations_target {
                    return Progress::Counted {
                        observed: self.oscillations_observed,
                    };
                }
                self.complete(snapshot, now)
            }
            _ => Progress::Unchanged,
        }
    }

    fn is_inside(&self, snapshot: &BodySnapshot, reference_y: f64) -> bool {
        (snapshot.bob.position.y - reference_y).abs() < self.config.proximity_band
    }

    fn complete(&mut self, snapshot: &BodySnapshot, now: f64) -> Progress {
        self.transition(MeasurementState::Complete);

        let elapsed = now - self.start_timestamp.unwrap_or(now);
        let oscillations = self.oscillations_observed;
        let summary = RunSummary {
            run: self.run,
            length: self.length,
            oscillations,
            elapsed,
            period: elapsed / oscillations as f64,
            completed_at_step: snapshot.step,
        };
        tracing::info!(
            run = summary.run.0,
            length = summary.length,
            period = summary.period,
            "measurement complete"
        );

        self.clear_counters();
        self.reference_y = None;
        if let Some(next) = next_state(self.state, Trigger::Recorded) {
            self.transition(next);
        }
        Progress::Completed(summary)
    }

    fn clear_counters(&mut self) {
        self.oscillations_observed = 0;
        self.start_timestamp = None;
        self.start_phase = None;
        self.was_inside = false;
        self.steps_since_progress = 0;
    }

    fn transition(&mut self, next: MeasurementState) {
        if next != self.state {
            tracing::debug!(
                run = self.run.0,
                from = self.state.name(),
                to = next.name(),
                "measurement transition"
            );
            self.state = next;
        }
    }
}

impl Default for MeasurementRun {
    fn default() -> Self {
        Self::new(MeasurementConfig::default())
    }
}
