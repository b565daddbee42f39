//! Sculpt brush settings.
//!
//! Radius is in the surface's local units. The falloff is shared with the
//! painting brush, see [`painting::falloff`].

use chisel_config::{
    DEFAULT_CARVE_RATE, DEFAULT_DRAG_DAMPING, DEFAULT_SCULPT_HARDNESS, DEFAULT_SCULPT_RADIUS,
    DEFAULT_SCULPT_STRENGTH,
};
use painting::{validate_hardness, validate_radius, validate_strength, BrushParamError, Falloff};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sculpt brush configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SculptBrush {
    radius: f32,
    /// Maximum per-stroke displacement for Carve/Raise, and Sand blend factor
    strength: f32,
    /// 0.0 = linear cone, 1.0 = hard disc
    hardness: f32,
    /// Budget spent per second is `strength * carve_rate`
    carve_rate: f32,
    /// Fraction of the pointer motion applied to dragged vertices
    drag_damping: f32,
}

impl Default for SculptBrush {
    fn default() -> Self {
        Self {
            radius: DEFAULT_SCULPT_RADIUS,
            strength: DEFAULT_SCULPT_STRENGTH,
            hardness: DEFAULT_SCULPT_HARDNESS,
            carve_rate: DEFAULT_CARVE_RATE,
            drag_damping: DEFAULT_DRAG_DAMPING,
        }
    }
}

impl SculptBrush {
    /// Create a brush, validating every field.
    pub fn new(radius: f32, strength: f32, hardness: f32) -> Result<Self, BrushParamError> {
        Ok(Self {
            radius: validate_radius(radius)?,
            strength: validate_strength(strength)?,
            hardness: validate_hardness(hardness)?,
            ..Self::default()
        })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn hardness(&self) -> f32 {
        self.hardness
    }

    pub fn carve_rate(&self) -> f32 {
        self.carve_rate
    }

    pub fn drag_damping(&self) -> f32 {
        self.drag_damping
    }

    pub fn falloff(&self) -> Falloff {
        Falloff::new(self.radius, self.hardness)
    }

    /// Displacement budget spent in a step of `dt` seconds.
    pub fn carve_step(&self, dt: f32) -> f32 {
        (self.strength * self.carve_rate * dt).max(0.0)
    }

    /// Rejects non-positive radii and keeps the previous one.
    pub fn set_radius(&mut self, radius: f32) -> Result<(), BrushParamError> {
        self.radius = validate_radius(radius).inspect_err(|e| warn!("{}", e))?;
        Ok(())
    }

    pub fn set_strength(&mut self, strength: f32) -> Result<(), BrushParamError> {
        self.strength = validate_strength(strength).inspect_err(|e| warn!("{}", e))?;
        Ok(())
    }

    pub fn set_hardness(&mut self, hardness: f32) -> Result<(), BrushParamError> {
        self.hardness = validate_hardness(hardness).inspect_err(|e| warn!("{}", e))?;
        Ok(())
    }

    /// Non-finite or negative rates are ignored.
    pub fn set_carve_rate(&mut self, rate: f32) {
        if rate.is_finite() && rate >= 0.0 {
            self.carve_rate = rate;
        }
    }

    pub fn set_drag_damping(&mut self, damping: f32) {
        if damping.is_finite() {
            self.drag_damping = damping.max(0.0);
        }
    }
}
