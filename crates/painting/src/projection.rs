//! Brush projection math for 3D surface painting.
//!
//! Canvas brushes are sized in texture pixels, but the preview cursor lives in
//! world space on the hit triangle. The conversion uses the ratio between the
//! triangle's world area and its UV area, assuming the UV mapping is locally
//! uniform across the triangle.

use glam::{Vec2, Vec3};
use tracing::trace;

use chisel_config::{DEFAULT_PREVIEW_BASE_SIZE, DEFAULT_REFERENCE_RADIUS_PIXELS};

use crate::constants::UV_AREA_EPSILON;
use crate::raycast::CollisionProxy;
use crate::types::SurfaceHit;

/// Construct an orthonormal tangent-space basis from a surface normal.
///
/// Returns (tangent, bitangent, normal) forming a right-handed coordinate system
/// where normal points "up" from the surface.
pub fn build_tangent_space(normal: Vec3) -> (Vec3, Vec3, Vec3) {
    let n = normal.normalize();
    let t = arbitrary_perpendicular(n);
    // Bitangent completes the right-handed basis
    let b = n.cross(t).normalize();
    (t, b, n)
}

/// Find an arbitrary vector perpendicular to the given normal.
///
/// Uses the axis least aligned with the normal to ensure numerical stability.
fn arbitrary_perpendicular(normal: Vec3) -> Vec3 {
    let axis = if normal.x.abs() < normal.y.abs() {
        if normal.x.abs() < normal.z.abs() {
            Vec3::X
        } else {
            Vec3::Z
        }
    } else if normal.y.abs() < normal.z.abs() {
        Vec3::Y
    } else {
        Vec3::Z
    };

    normal.cross(axis).normalize()
}

/// Area of a triangle in 3D.
pub fn triangle_area(p0: Vec3, p1: Vec3, p2: Vec3) -> f32 {
    0.5 * (p1 - p0).cross(p2 - p0).length()
}

/// Area of a triangle in UV space.
pub fn uv_triangle_area(uv0: Vec2, uv1: Vec2, uv2: Vec2) -> f32 {
    0.5 * (uv1 - uv0).perp_dot(uv2 - uv0).abs()
}

/// World positions and UVs of one triangle.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSample {
    pub positions: [Vec3; 3],
    pub uvs: [Vec2; 3],
}

impl TriangleSample {
    /// Gather the hit triangle from the proxy. None without UVs or for a bad index.
    pub fn from_hit(proxy: &CollisionProxy, hit: &SurfaceHit) -> Option<Self> {
        let tri = hit.triangle_index as usize;
        let (p0, p1, p2) = proxy.triangle_world_positions(tri)?;
        let (uv0, uv1, uv2) = proxy.triangle_uvs(tri)?;
        Some(Self {
            positions: [p0, p1, p2],
            uvs: [uv0, uv1, uv2],
        })
    }
}

/// Converts pixel-space brush radii into world-space radii for preview sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSizeNormalizer {
    /// World size used when the UV mapping is unusable
    pub preview_base_size: f32,
    /// Pixel radius at which the fallback equals `preview_base_size`
    pub reference_radius_pixels: f32,
}

impl Default for BrushSizeNormalizer {
    fn default() -> Self {
        Self {
            preview_base_size: DEFAULT_PREVIEW_BASE_SIZE,
            reference_radius_pixels: DEFAULT_REFERENCE_RADIUS_PIXELS,
        }
    }
}

impl BrushSizeNormalizer {
    pub fn new(preview_base_size: f32, reference_radius_pixels: f32) -> Self {
        Self {
            preview_base_size,
            reference_radius_pixels,
        }
    }

    /// Size used when the triangle cannot provide a world/UV ratio.
    pub fn fallback(&self, radius_pixels: f32) -> f32 {
        if self.reference_radius_pixels <= 0.0 {
            return self.preview_base_size;
        }
        self.preview_base_size * (radius_pixels / self.reference_radius_pixels)
    }

    /// World radius of a `radius_pixels` brush on the given triangle.
    pub fn world_radius(
        &self,
        triangle: &TriangleSample,
        radius_pixels: f32,
        texture_width: u32,
    ) -> f32 {
        let [p0, p1, p2] = triangle.positions;
        let [uv0, uv1, uv2] = triangle.uvs;

        let world_area = triangle_area(p0, p1, p2);
        let uv_area = uv_triangle_area(uv0, uv1, uv2);

        if uv_area < UV_AREA_EPSILON || texture_width == 0 {
            trace!(uv_area, "degenerate UV triangle, using fallback brush size");
            return self.fallback(radius_pixels);
        }

        // Square root of the area ratio approximates the linear scale
        let scale = (world_area / uv_area).sqrt();
        (radius_pixels / texture_width as f32) * scale
    }

    /// World radius at a raycast hit, falling back when the proxy lacks UVs.
    pub fn world_radius_at_hit(
        &self,
        proxy: &CollisionProxy,
        hit: &SurfaceHit,
        radius_pixels: f32,
        texture_width: u32,
    ) -> f32 {
        match TriangleSample::from_hit(proxy, hit) {
            Some(triangle) => self.world_radius(&triangle, radius_pixels, texture_width),
            None => self.fallback(radius_pixels),
        }
    }
}
