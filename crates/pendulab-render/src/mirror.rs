//! Render mirror — body snapshot to mesh transforms.
//!
//! A pure function of the snapshot: nothing here can touch simulation
//! state. Visual space keeps the simulation's +Y-down orientation, offset
//! so the anchor lands on `pivot` and scaled by `pixels_per_meter`.

use serde::{Deserialize, Serialize};

use pendulab_math::orient::align_y_to;
use pendulab_math::planar::lift;
use pendulab_math::{DQuat, DVec2, DVec3};
use pendulab_physics::BodySnapshot;
use pendulab_types::constants::{BASE_BOB_RADIUS, DEFAULT_PIVOT_PX, PIXELS_PER_METER};
use pendulab_types::{PendulabError, PendulabResult};

/// Visual scaling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Anchor position in visual units.
    pub pivot: DVec2,
    /// Visual units per simulation metre.
    pub pixels_per_meter: f64,
    /// Bob radius (visual units) at 1 kg.
    pub base_radius: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pivot: DVec2::from_array(DEFAULT_PIVOT_PX),
            pixels_per_meter: PIXELS_PER_METER,
            base_radius: BASE_BOB_RADIUS,
        }
    }
}

impl RenderConfig {
    /// Visual bob radius: `base_radius * sqrt(mass)`.
    ///
    /// Square root on purpose; equal-density spheres would scale with the
    /// cube root, but presenters rely on this law.
    pub fn bob_radius(&self, mass: f64) -> f64 {
        self.base_radius * mass.sqrt()
    }

    pub fn validate(&self) -> PendulabResult<()> {
        if !self.pivot.is_finite() {
            return Err(PendulabError::InvalidConfig("Render pivot must be finite".into()));
        }
        if !self.pixels_per_meter.is_finite() || self.pixels_per_meter <= 0.0 {
            return Err(PendulabError::InvalidConfig(format!(
                "pixels_per_meter must be positive, got {}",
                self.pixels_per_meter
            )));
        }
        if !self.base_radius.is_finite() || self.base_radius <= 0.0 {
            return Err(PendulabError::InvalidConfig(format!(
                "base_radius must be positive, got {}",
                self.base_radius
            )));
        }
        Ok(())
    }
}

/// Placement of the bob sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BobTransform {
    pub position: DVec3,
    /// Sphere radius in visual units.
    pub radius: f64,
}

impl BobTransform {
    /// Uniform scale for a unit sphere mesh.
    pub fn scale(&self) -> DVec3 {
        DVec3::splat(self.radius)
    }
}

/// Placement of the rod, modelled as a +Y-aligned cylinder of height
/// `rest_length` centred at its origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RodTransform {
    /// Midpoint between anchor and bob.
    pub position: DVec3,
    /// Rotation taking +Y onto the anchor→bob direction.
    pub orientation: DQuat,
    /// Current separation over rest length.
    pub length_scale: f64,
    /// Rod height at scale 1 (visual units).
    pub rest_length: f64,
}

/// Everything a presenter needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderTransforms {
    pub step: u64,
    pub anchor: DVec3,
    pub bob: BobTransform,
    pub rod: RodTransform,
}

/// Maps body snapshots into visual space.
#[derive(Debug, Clone, Default)]
pub struct RenderMirror {
    config: RenderConfig,
}

impl RenderMirror {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Visual position of a simulation point, relative to the snapshot's anchor.
    pub fn to_visual(&self, snapshot: &BodySnapshot, point: DVec2) -> DVec3 {
        let rel = point - snapshot.anchor.position;
        lift(self.config.pivot + rel * self.config.pixels_per_meter)
    }

    /// Derives the bob and rod transforms from `snapshot`.
    pub fn sync(&self, snapshot: &BodySnapshot) -> RenderTransforms {
        let anchor = lift(self.config.pivot);
        let bob_pos = self.to_visual(snapshot, snapshot.bob.position);
        let rest_length = snapshot.rest_length * self.config.pixels_per_meter;

        let length_scale = if snapshot.rest_length > 0.0 {
            snapshot.separation() / snapshot.rest_length
        } else {
            0.0
        };

        RenderTransforms {
            step: snapshot.step,
            anchor,
            bob: BobTransform {
                position: bob_pos,
                radius: self.config.bob_radius(snapshot.bob.mass),
            },
            rod: RodTransform {
                position: (anchor + bob_pos) * 0.5,
                orientation: align_y_to(bob_pos - anchor),
                length_scale,
                rest_length,
            },
        }
    }
}
