//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Fixed simulation timestep (seconds). 1/60th of a second.
///
/// The step size never follows the host's frame interval.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// Oscillations timed per measurement run (canonical lab procedure).
pub const DEFAULT_OSCILLATIONS: u32 = 20;

/// Scale between simulation metres and visual units (pixels).
pub const PIXELS_PER_METER: f64 = 100.0;

/// Proximity band half-width in visual units.
pub const DEFAULT_PROXIMITY_BAND_PX: f64 = 10.0;

/// Proximity band half-width in metres.
pub const DEFAULT_PROXIMITY_BAND: f64 = DEFAULT_PROXIMITY_BAND_PX / PIXELS_PER_METER;

/// Bob radius (visual units) for a 1 kg bob.
pub const BASE_BOB_RADIUS: f64 = 20.0;

/// Default pivot position in visual units.
pub const DEFAULT_PIVOT_PX: [f64; 2] = [400.0, 50.0];

/// Horizontal launch speed (m/s) for `LaunchMode::Kick` at sin(angle) = 1.
///
/// 5 px per 60 Hz frame at 100 px/m.
pub const KICK_SPEED: f64 = 3.0;

/// Angular velocity scale applied to a kicked bob.
pub const KICK_SPIN: f64 = 0.1;

/// Allowed drift between anchor–bob separation and rest length (metres).
pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 1.0e-6;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1.0e-12;
