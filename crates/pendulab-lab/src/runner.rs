//! Sweep runner — measures one period per length and collects metrics.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use pendulab_measure::{Dataset, LinearFit};
use pendulab_session::{FrameDriver, PendulumSession};
use pendulab_types::{PendulabError, PendulabResult};

use crate::metrics::RunMetrics;
use crate::scenarios::Scenario;

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub scenario: String,
    /// One entry per completed run, in sweep order.
    pub runs: Vec<RunMetrics>,
    /// Lengths whose run did not complete within the frame budget.
    pub incomplete: Vec<f64>,
    pub dataset: Dataset,
    pub fit: Option<LinearFit>,
}

impl SweepReport {
    /// g from the fitted slope, when the sweep covered two or more lengths.
    pub fn gravity_estimate(&self) -> Option<f64> {
        self.fit.as_ref().and_then(LinearFit::gravity_estimate)
    }

    /// Largest relative period error across runs.
    pub fn worst_error(&self) -> f64 {
        self.runs.iter().map(|r| r.relative_error).fold(0.0, f64::max)
    }

    pub fn to_csv(&self) -> String {
        RunMetrics::to_csv(&self.runs)
    }
}

/// Runs lab scenarios through a single session.
pub struct SweepRunner;

impl SweepRunner {
    /// Run every length of `scenario` in order.
    ///
    /// One session is reconfigured between lengths, so the dataset keeps
    /// every completed run.
    pub fn run(scenario: &Scenario) -> PendulabResult<SweepReport> {
        let first = scenario.lengths.first().copied().ok_or_else(|| {
            PendulabError::InvalidConfig(format!("scenario {} has no lengths", scenario.kind.name()))
        })?;
        let mut session = PendulumSession::new(scenario.session_config(first))?;

        let mut runs = Vec::with_capacity(scenario.lengths.len());
        let mut incomplete = Vec::new();

        for (i, &length) in scenario.lengths.iter().enumerate() {
            if i > 0 {
                session.reconfigure(scenario.session_config(length))?;
            }

            let start = Instant::now();
            let steps_before = session.bodies().step;
            let summary = FrameDriver::new(&mut session).run_until_recorded(scenario.max_frames_per_run)?;
            let wall_time = start.elapsed().as_secs_f64();

            let Some(summary) = summary else {
                tracing::warn!(scenario = scenario.kind.name(), length, "run did not complete");
                session.stop_measurement();
                incomplete.push(length);
                continue;
            };

            let theoretical_period = session
                .config()
                .pendulum
                .theoretical_period()
                .unwrap_or(f64::NAN);
            let metrics = RunMetrics {
                scenario: scenario.kind.name().to_string(),
                length,
                period: summary.period,
                theoretical_period,
                relative_error: (summary.period - theoretical_period).abs() / theoretical_period,
                oscillations: summary.oscillations,
                frames: session.bodies().step - steps_before,
                wall_time,
                max_residual: session.max_residual(),
            };
            tracing::info!(
                scenario = scenario.kind.name(),
                length,
                period = metrics.period,
                error = metrics.relative_error,
                "length measured"
            );
            runs.push(metrics);
        }

        let report = session.finish();
        Ok(SweepReport {
            scenario: scenario.kind.name().to_string(),
            runs,
            incomplete,
            fit: report.fit,
            dataset: report.dataset,
        })
    }

    /// Run all scenarios and return a report for each.
    pub fn run_all() -> PendulabResult<Vec<SweepReport>> {
        use crate::scenarios::ScenarioKind;
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            results.push(Self::run(&Scenario::from_kind(kind))?);
        }
        Ok(results)
    }
}
