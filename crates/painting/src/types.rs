use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// RGBA color with float channels in 0..1.
pub type Rgba = [f32; 4];

/// A world-space ray, usually derived from the pointer and the active camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction of the ray (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect with the plane through `point` with normal `normal`.
    ///
    /// Returns the intersection point, or None if the ray is parallel to the
    /// plane or the plane lies behind the origin.
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<Vec3> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some(self.point_at(t))
    }
}

/// A resolved hit on the active surface, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// World-space hit position
    pub point: Vec3,
    /// World-space surface normal (normalized)
    pub normal: Vec3,
    /// Interpolated UV, if the surface has UVs
    pub uv: Option<Vec2>,
    /// Index of the hit triangle
    pub triangle_index: u32,
    /// World-space distance from the ray origin
    pub distance: f32,
}

/// An axis-aligned pixel rectangle on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Whether the pixel lies inside the rectangle.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}
