//! Brush falloff shared by sculpting and painting.
//!
//! Influence is 1 inside the hard core (`radius * hardness`), ramps linearly
//! to 0 at the rim, and is 0 outside the radius.

use crate::constants::FADE_EPSILON;

/// Influence of a brush at `distance` from its center, in 0..1.
///
/// - `distance > radius` → 0
/// - `distance <= radius * hardness` → 1
/// - otherwise a linear ramp from the hard core to the rim
///
/// When the fade range collapses (hardness near 1) the ramp becomes a hard step.
#[inline]
pub fn influence(distance: f32, radius: f32, hardness: f32) -> f32 {
    if radius <= 0.0 || distance > radius {
        return 0.0;
    }

    let hard_radius = radius * hardness.clamp(0.0, 1.0);
    if distance <= hard_radius {
        return 1.0;
    }

    let fade_range = radius - hard_radius;
    if fade_range < FADE_EPSILON {
        return 0.0;
    }

    (1.0 - (distance - hard_radius) / fade_range).clamp(0.0, 1.0)
}

/// Influence scaled by flow, clamped to 0..1.
#[inline]
pub fn brush_weight(distance: f32, radius: f32, hardness: f32, flow: f32) -> f32 {
    (influence(distance, radius, hardness) * flow).clamp(0.0, 1.0)
}

/// A brush footprint with fixed radius and hardness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    pub radius: f32,
    pub hardness: f32,
}

impl Falloff {
    pub fn new(radius: f32, hardness: f32) -> Self {
        Self { radius, hardness }
    }

    #[inline]
    pub fn at(&self, distance: f32) -> f32 {
        influence(distance, self.radius, self.hardness)
    }

    /// Whether a point at `distance` is inside the footprint.
    #[inline]
    pub fn contains(&self, distance: f32) -> bool {
        distance <= self.radius
    }
}
