//! Session input/output contract types.
//!
//! Serializable for file-based configuration (TOML or JSON) and for
//! reporting results from the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};

use pendulab_measure::{Dataset, LinearFit, MeasurementConfig, RunSummary, TimingSource};
use pendulab_physics::{PendulumConfig, SolverConfig};
use pendulab_render::RenderConfig;
use pendulab_types::{PendulabError, PendulabResult};

/// Complete configuration of one pendulum session.
///
/// Every section may be omitted from a config file and falls back to its
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Clock used to time measurement runs.
    pub timing: TimingSource,
    /// Observations without progress after which an active run is
    /// reported as stalled. `None` disables the report.
    pub stall_step_bound: Option<u64>,
    pub pendulum: PendulumConfig,
    pub solver: SolverConfig,
    pub measurement: MeasurementConfig,
    pub render: RenderConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let pendulum = PendulumConfig::default();
        Self {
            timing: TimingSource::Simulated,
            stall_step_bound: None,
            measurement: MeasurementConfig::scaled_to(&pendulum),
            pendulum,
            solver: SolverConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Default session for `pendulum`, with the band scaled to its swing.
    pub fn for_pendulum(pendulum: PendulumConfig) -> Self {
        Self {
            measurement: MeasurementConfig::scaled_to(&pendulum),
            pendulum,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> PendulabResult<Self> {
        toml::from_str(text)
            .map_err(|e| PendulabError::Serialization(format!("TOML parse failed: {e}")))
    }

    pub fn from_json_str(text: &str) -> PendulabResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| PendulabError::Serialization(format!("JSON parse failed: {e}")))
    }

    pub fn to_toml_string(&self) -> PendulabResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PendulabError::Serialization(format!("TOML serialization failed: {e}")))
    }

    pub fn to_json_string(&self) -> PendulabResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PendulabError::Serialization(format!("JSON serialization failed: {e}")))
    }

    /// Reads a config file; `.json` is parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> PendulabResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }
}

/// Results of a session, as reported by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub config: SessionConfig,
    /// Steps executed.
    pub steps: u64,
    /// Simulated seconds.
    pub sim_time: f64,
    /// Completed runs, in completion order.
    pub runs: Vec<RunSummary>,
    pub dataset: Dataset,
    /// Line through the dataset, when it has two distinct lengths.
    pub fit: Option<LinearFit>,
    /// Largest constraint residual seen (metres).
    pub max_residual: f64,
    /// Total energy of the bob at the end (J).
    pub final_energy: f64,
}

impl SessionReport {
    /// Small-angle period of the configured pendulum.
    pub fn theoretical_period(&self) -> Option<f64> {
        self.config.pendulum.theoretical_period()
    }

    /// Relative error of the last measured period against small-angle theory.
    pub fn period_error(&self) -> Option<f64> {
        let expected = self.theoretical_period()?;
        let last = self.runs.last()?;
        Some((last.period - expected).abs() / expected)
    }
}
