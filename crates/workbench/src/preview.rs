//! Brush previews shown at the hit point.
//!
//! The paint preview is a textured quad lying on the surface, sized so its
//! world radius matches the pixel radius the canvas brush will cover. The
//! sculpt cursor is a simple disc oriented to the hit normal.

use glam::{Quat, Vec3};
use painting::{
    build_tangent_space, BrushSizeNormalizer, CollisionProxy, PaintBrush, Rgba, SurfaceHit, WHITE,
};

/// Which image the preview quad should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTexture {
    /// The brush's stamp image
    Stamp,
    /// The procedural soft-round brush
    SoftRound,
}

/// Paint brush preview quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushPreview {
    /// Center, lifted off the surface along the normal
    pub position: Vec3,
    /// In-plane axis, rotated by the stamp angle in stamp mode
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
    /// World-space radius matching the canvas brush
    pub world_radius: f32,
    pub texture: PreviewTexture,
    /// White for stamps so their colors show unmodified
    pub tint: Rgba,
}

/// Sculpt brush cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SculptCursor {
    pub position: Vec3,
    pub up: Vec3,
    /// Brush radius in surface units
    pub radius: f32,
}

/// Build the paint preview for a hit.
pub fn brush_preview(
    hit: &SurfaceHit,
    proxy: &CollisionProxy,
    brush: &PaintBrush,
    normalizer: &BrushSizeNormalizer,
    texture_width: u32,
    surface_offset: f32,
) -> BrushPreview {
    let (mut tangent, mut bitangent, normal) = build_tangent_space(hit.normal);
    let stamps = brush.stamps();
    if stamps {
        let spin = Quat::from_axis_angle(normal, brush.rotation().to_radians());
        tangent = spin * tangent;
        bitangent = spin * bitangent;
    }

    BrushPreview {
        position: hit.point + normal * surface_offset,
        tangent,
        bitangent,
        normal,
        world_radius: normalizer.world_radius_at_hit(proxy, hit, brush.radius(), texture_width),
        texture: if stamps {
            PreviewTexture::Stamp
        } else {
            PreviewTexture::SoftRound
        },
        tint: if stamps { WHITE } else { brush.color() },
    }
}

pub fn sculpt_cursor(hit: &SurfaceHit, radius: f32) -> SculptCursor {
    SculptCursor {
        position: hit.point,
        up: hit.normal,
        radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Affine3A, Vec2};
    use painting::{Ray, StampImage, SurfaceMesh, SurfaceRaycaster};

    fn plane_hit() -> (CollisionProxy, SurfaceHit) {
        let mesh = SurfaceMesh::plane("plane", 2.0, 2, Affine3A::IDENTITY);
        let proxy = CollisionProxy::from_mesh(&mesh);
        let ray = Ray::new(Vec3::new(0.2, 3.0, 0.3), Vec3::NEG_Y);
        let hit = SurfaceRaycaster::default().cast(&ray, &proxy).unwrap();
        (proxy, hit)
    }

    #[test]
    fn test_preview_sits_above_surface() {
        let (proxy, hit) = plane_hit();
        let brush = PaintBrush::default();
        let normalizer = BrushSizeNormalizer::default();
        let preview = brush_preview(&hit, &proxy, &brush, &normalizer, 1024, 0.01);

        assert!((preview.position.y - 0.01).abs() < 1e-5);
        assert!((preview.normal - Vec3::Y).length() < 1e-5);
        assert_eq!(preview.texture, PreviewTexture::SoftRound);
        assert_eq!(preview.tint, brush.color());
        // 2x2 world plane over 0..1 UVs: scale 2, 25px of 1024
        assert!((preview.world_radius - 25.0 / 1024.0 * 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_stamp_preview_rotates_and_is_white() {
        let (proxy, hit) = plane_hit();
        let mut brush = PaintBrush::default();
        brush.set_stamp(Some(StampImage::soft_round(4)));
        brush.set_use_stamp(true);

        let normalizer = BrushSizeNormalizer::default();
        let plain = brush_preview(&hit, &proxy, &PaintBrush::default(), &normalizer, 1024, 0.01);
        brush.set_rotation(90.0).unwrap();
        let stamped = brush_preview(&hit, &proxy, &brush, &normalizer, 1024, 0.01);

        assert_eq!(stamped.texture, PreviewTexture::Stamp);
        assert_eq!(stamped.tint, WHITE);
        assert!(stamped.tangent.dot(plain.tangent).abs() < 1e-5);
        assert!(stamped.tangent.dot(stamped.normal).abs() < 1e-5);
    }

    #[test]
    fn test_sculpt_cursor() {
        let hit = SurfaceHit {
            point: Vec3::ONE,
            normal: Vec3::Z,
            uv: Some(Vec2::ZERO),
            triangle_index: 0,
            distance: 2.0,
        };
        let cursor = sculpt_cursor(&hit, 0.5);
        assert_eq!(cursor.position, Vec3::ONE);
        assert_eq!(cursor.up, Vec3::Z);
        assert_eq!(cursor.radius, 0.5);
    }
}
