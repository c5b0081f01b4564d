//! Dataset accumulator — (length, period²) samples across runs.
//!
//! Append-only, in completion order. Repeated lengths are separate samples
//! and are never merged. The series is not cleared on reconfiguration.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// One completed measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Link length (metres).
    pub length: f64,
    /// Measured period squared (s²).
    pub period_squared: f64,
}

impl DataPoint {
    pub fn new(length: f64, period_squared: f64) -> Self {
        Self {
            length,
            period_squared,
        }
    }

    pub fn from_period(length: f64, period: f64) -> Self {
        Self::new(length, period * period)
    }

    pub fn period(&self) -> f64 {
        self.period_squared.sqrt()
    }
}

/// Least-squares line `period² = slope * length + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; 1 when every point is on the line.
    pub r_squared: f64,
    /// Points used.
    pub samples: usize,
}

impl LinearFit {
    /// `4π² / slope`, from `T² = (4π²/g) L`. `None` for a non-positive slope.
    pub fn gravity_estimate(&self) -> Option<f64> {
        if self.slope > 0.0 {
            Some(4.0 * PI * PI / self.slope)
        } else {
            None
        }
    }

    pub fn predict(&self, length: f64) -> f64 {
        self.slope * length + self.intercept
    }
}

/// Ordered sequence of data points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    points: Vec<DataPoint>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `point` after every point recorded so far.
    pub fn record(&mut self, point: DataPoint) {
        tracing::debug!(
            length = point.length,
            period_squared = point.period_squared,
            index = self.points.len(),
            "data point recorded"
        );
        self.points.push(point);
    }

    pub fn all_points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    /// Ordinary least squares over all points.
    ///
    /// `None` with fewer than two points or when every length is equal.
    pub fn fit(&self) -> Option<LinearFit> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;
        let mean_x = self.points.iter().map(|p| p.length).sum::<f64>() / nf;
        let mean_y = self.points.iter().map(|p| p.period_squared).sum::<f64>() / nf;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for p in &self.points {
            let dx = p.length - mean_x;
            let dy = p.period_squared - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx <= f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        let r_squared = if syy > 0.0 { (sxy * sxy) / (sxx * syy) } else { 1.0 };
        Some(LinearFit {
            slope,
            intercept: mean_y - slope * mean_x,
            r_squared,
            samples: n,
        })
    }

    /// CSV with a header row, one line per point in recorded order.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("index,length_m,period_s,period_squared_s2");
        for (i, p) in self.points.iter().enumerate() {
            csv.push('\n');
            csv.push_str(&format!(
                "{},{:.4},{:.6},{:.6}",
                i,
                p.length,
                p.period(),
                p.period_squared
            ));
        }
        csv
    }
}
