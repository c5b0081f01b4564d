//! Session configuration validation.
//!
//! Runs before a session is built, so configuration errors surface to the
//! caller before the frame loop starts.

use pendulab_measure::ReferencePoint;
use pendulab_types::{PendulabError, PendulabResult};

use crate::contract::SessionConfig;

/// Validates a complete session configuration.
///
/// Checks:
/// - Pendulum parameters are positive and finite
/// - Solver timestep, stiffness and damping are in range
/// - Measurement target and band are usable for this pendulum (an
///   equilibrium band must sit inside the swing height)
/// - Render scaling is positive
pub fn validate_config(config: &SessionConfig) -> PendulabResult<()> {
    config.pendulum.validate()?;
    config.solver.validate()?;
    config.measurement.validate()?;
    config.render.validate()?;

    // A band this wide contains the whole circle and can never be re-entered.
    if config.measurement.proximity_band >= 2.0 * config.pendulum.length {
        return Err(PendulabError::InvalidConfig(format!(
            "Proximity band {} m covers the whole swing of a {} m pendulum",
            config.measurement.proximity_band, config.pendulum.length
        )));
    }

    // Around equilibrium the band must be shallower than the swing, or the
    // bob never leaves it and no entry edge exists.
    let swing = config.pendulum.swing_height();
    if config.measurement.reference == ReferencePoint::Equilibrium
        && config.measurement.proximity_band >= swing
    {
        return Err(PendulabError::InvalidConfig(format!(
            "Proximity band {} m is not below the {:.4} m swing height; the bob never leaves it",
            config.measurement.proximity_band, swing
        )));
    }

    if config.stall_step_bound == Some(0) {
        return Err(PendulabError::InvalidConfig(
            "stall_step_bound must be at least 1 when set".into(),
        ));
    }

    Ok(())
}
