//! Run metrics — data collected for each measured length.

use serde::{Deserialize, Serialize};

/// Metrics collected from one measurement run in a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Link length (metres).
    pub length: f64,
    /// Measured period (seconds).
    pub period: f64,
    /// Small-angle period `2π√(L/g)`.
    pub theoretical_period: f64,
    /// |measured − theoretical| / theoretical.
    pub relative_error: f64,
    /// Oscillations timed.
    pub oscillations: u32,
    /// Frames driven to complete the run.
    pub frames: u64,
    /// Wall-clock time for the run (seconds).
    pub wall_time: f64,
    /// Largest constraint residual during the run (metres).
    pub max_residual: f64,
}

impl RunMetrics {
    pub fn period_squared(&self) -> f64 {
        self.period * self.period
    }

    /// CSV header row.
    pub fn to_csv_header() -> String {
        "scenario,length_m,period_s,period_squared_s2,theory_s,rel_error,oscillations,frames,wall_time_ms,max_residual_m".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{:.4},{:.6},{:.6},{:.6},{:.5},{},{},{:.3},{:.3e}",
            self.scenario,
            self.length,
            self.period,
            self.period_squared(),
            self.theoretical_period,
            self.relative_error,
            self.oscillations,
            self.frames,
            self.wall_time * 1000.0,
            self.max_residual,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[RunMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
