//! Secondary-button rotation of the target surface about world axes.

use glam::{Affine3A, Quat, Vec2, Vec3};

/// Rotates the target in place (pivot at its origin) from pointer motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turntable {
    /// Degrees per pointer axis unit per second, see [`crate::PointerSample::delta`]
    pub speed: f32,
}

impl Turntable {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// World-space rotation for one frame of pointer motion.
    ///
    /// Horizontal motion spins about world up (moving right turns the surface
    /// to the left), vertical motion tilts about world right.
    pub fn rotation(&self, delta: Vec2, dt: f32) -> Quat {
        let yaw = (-delta.x * self.speed * dt).to_radians();
        let pitch = (delta.y * self.speed * dt).to_radians();
        Quat::from_axis_angle(Vec3::X, pitch) * Quat::from_axis_angle(Vec3::Y, yaw)
    }

    /// Apply one frame of rotation to a transform, keeping its translation and scale.
    pub fn apply(&self, transform: Affine3A, delta: Vec2, dt: f32) -> Affine3A {
        let (scale, rotation, translation) = transform.to_scale_rotation_translation();
        let rotation = (self.rotation(delta, dt) * rotation).normalize();
        Affine3A::from_scale_rotation_translation(scale, rotation, translation)
    }
}
