//! Measurement configuration.

use serde::{Deserialize, Serialize};

use pendulab_physics::PendulumConfig;
use pendulab_types::constants::{DEFAULT_OSCILLATIONS, DEFAULT_PROXIMITY_BAND};
use pendulab_types::{PendulabError, PendulabResult};

/// Height the proximity band is centred on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePoint {
    /// Rest height of the bob: `anchor.y + length`.
    #[default]
    Equilibrium,
    /// Bob height at the moment the run is armed.
    ArmingPosition,
}

/// Parameters for one measurement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementConfig {
    /// Oscillations to time before computing the period.
    pub oscillations_target: u32,
    /// Half-width of the proximity band (metres).
    pub proximity_band: f64,
    #[serde(default)]
    pub reference: ReferencePoint,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            oscillations_target: DEFAULT_OSCILLATIONS,
            proximity_band: DEFAULT_PROXIMITY_BAND,
            reference: ReferencePoint::Equilibrium,
        }
    }
}

impl MeasurementConfig {
    /// Band of one quarter of the swing height of `pendulum`.
    ///
    /// At small release angles the bob rises only millimetres above rest
    /// and a fixed band would contain the whole swing.
    pub fn scaled_to(pendulum: &PendulumConfig) -> Self {
        let band = 0.25 * pendulum.swing_height();
        Self {
            proximity_band: if band > 0.0 { band } else { DEFAULT_PROXIMITY_BAND },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> PendulabResult<()> {
        if self.oscillations_target == 0 {
            return Err(PendulabError::InvalidConfig(
                "oscillations_target must be at least 1".into(),
            ));
        }
        if !self.proximity_band.is_finite() || self.proximity_band <= 0.0 {
            return Err(PendulabError::InvalidConfig(format!(
                "proximity_band must be positive, got {}",
                self.proximity_band
            )));
        }
        Ok(())
    }
}
