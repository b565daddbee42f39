//! Sculpting engine orchestration.
//!
//! The engine owns the active surface while it is bound. Every step runs
//! footprint → deform → commit (normals, bounds, revision) → proxy resync, so
//! the next raycast always sees the geometry this step produced.

use glam::{Affine3A, Vec3};
use painting::{CollisionProxy, SurfaceHit, SurfaceMesh};
use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::brush::SculptBrush;
use crate::deformation::{apply_budgeted_offset, apply_drag, apply_sand, gather_affected};
use crate::stroke::StrokeState;
use crate::types::{GeometryCommit, SculptInput, SculptMode, SculptStepResult};

/// Squared world-space drag deltas below this are ignored.
pub const DRAG_DEADZONE_SQ: f32 = 1e-5;

#[derive(Debug, Error, PartialEq)]
pub enum SculptError {
    #[error("Mesh '{0}' is not writable; enable read/write access on the asset")]
    NotWritable(String),
    #[error("Mesh '{0}' has no vertices or triangles")]
    EmptyGeometry(String),
}

/// The surface bound to the engine, with its proxy and stroke state.
#[derive(Debug)]
struct BoundSurface {
    mesh: SurfaceMesh,
    proxy: CollisionProxy,
    stroke: StrokeState,
}

impl BoundSurface {
    /// Recompute derived data and bring the proxy up to date.
    fn commit(&mut self, vertices_modified: usize) -> GeometryCommit {
        self.mesh.commit();
        self.proxy.resync(&self.mesh);
        GeometryCommit {
            revision: self.mesh.revision(),
            bounds: self.mesh.bounds(),
            vertices_modified,
        }
    }
}

/// Owns the mutable geometry of the active surface and applies sculpt steps.
#[derive(Debug, Default)]
pub struct SculptEngine {
    mode: SculptMode,
    /// Current brush settings
    pub brush: SculptBrush,
    surface: Option<BoundSurface>,
}

impl SculptEngine {
    pub fn new(brush: SculptBrush) -> Self {
        Self {
            mode: SculptMode::default(),
            brush,
            surface: None,
        }
    }

    /// Take ownership of a surface for sculpting.
    ///
    /// Read-only and empty surfaces are refused and the engine stays unbound.
    /// A previously bound surface is dropped; call [`Self::unbind`] first to
    /// keep it.
    pub fn bind(&mut self, mesh: SurfaceMesh) -> Result<(), SculptError> {
        if !mesh.is_writable() {
            error!("Cannot sculpt '{}': mesh is read-only", mesh.name);
            return Err(SculptError::NotWritable(mesh.name));
        }
        if mesh.vertex_count() == 0 || mesh.triangle_count() == 0 {
            error!("Cannot sculpt '{}': mesh is empty", mesh.name);
            return Err(SculptError::EmptyGeometry(mesh.name));
        }

        info!(
            "Bound '{}' for sculpting: {} vertices, {} triangles",
            mesh.name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        self.surface = Some(BoundSurface {
            proxy: CollisionProxy::from_mesh(&mesh),
            stroke: StrokeState::new(mesh.vertex_count()),
            mesh,
        });
        Ok(())
    }

    /// Release the surface to the host. Ends any active stroke.
    pub fn unbind(&mut self) -> Option<SurfaceMesh> {
        let surface = self.surface.take()?;
        info!("Unbound '{}'", surface.mesh.name);
        Some(surface.mesh)
    }

    pub fn is_bound(&self) -> bool {
        self.surface.is_some()
    }

    pub fn mesh(&self) -> Option<&SurfaceMesh> {
        self.surface.as_ref().map(|s| &s.mesh)
    }

    /// Collision proxy for raycasting, synced after every mutation
    pub fn proxy(&self) -> Option<&CollisionProxy> {
        self.surface.as_ref().map(|s| &s.proxy)
    }

    pub fn stroke(&self) -> Option<&StrokeState> {
        self.surface.as_ref().map(|s| &s.stroke)
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke().is_some_and(StrokeState::is_active)
    }

    pub fn mode(&self) -> SculptMode {
        self.mode
    }

    /// Switch modes. An active stroke is ended first.
    pub fn set_mode(&mut self, mode: SculptMode) {
        if mode == self.mode {
            return;
        }
        if self.is_stroke_active() {
            debug!("Mode change during stroke, ending stroke first");
            self.end_stroke();
        }
        info!("Sculpt mode: {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
    }

    /// Update the surface transform and resync the proxy.
    pub fn set_transform(&mut self, transform: Affine3A) {
        if let Some(surface) = self.surface.as_mut() {
            surface.mesh.set_transform(transform);
            surface.proxy.resync(&surface.mesh);
        }
    }

    /// Start a stroke. The hit point becomes the drag anchor.
    pub fn begin_stroke(&mut self, hit: Option<&SurfaceHit>) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.stroke.begin(hit.map(|h| h.point));
        debug!(
            "begin_stroke: mode={}, anchor={:?}",
            self.mode.name(),
            surface.stroke.anchor()
        );
    }

    /// Drop the drag anchor while the pointer is off the surface.
    ///
    /// The next step that hits re-anchors instead of applying the motion
    /// made while off the surface.
    pub fn clear_anchor(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.stroke.clear_anchor();
        }
    }

    /// End the stroke. The budget persists until the next begin.
    pub fn end_stroke(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.stroke.end();
        }
    }

    /// Apply one step of the current mode at the input's hit.
    pub fn apply_step(&mut self, input: &SculptInput) -> SculptStepResult {
        if !self.mode.deforms() {
            return SculptStepResult::default();
        }
        let Some(surface) = self.surface.as_mut() else {
            return SculptStepResult::default();
        };

        let mode = self.mode;
        let brush = &self.brush;

        // Drag needs an anchor before it can produce a delta
        let drag_delta = if mode == SculptMode::Drag {
            let Some(anchor) = surface.stroke.anchor() else {
                surface.stroke.set_anchor(input.hit.point);
                trace!("apply_step: drag anchor set");
                return SculptStepResult::default();
            };
            let projected = input.ray.intersect_plane(input.hit.point, input.view_direction);
            let Some(projected) = projected else {
                return SculptStepResult::default();
            };
            let delta = projected - anchor;
            if delta.length_squared() < DRAG_DEADZONE_SQ {
                return SculptStepResult::default();
            }
            surface.stroke.set_anchor(projected);
            surface.mesh.world_to_local_vector(delta)
        } else {
            Vec3::ZERO
        };

        let center = surface.mesh.world_to_local_point(input.hit.point);
        let affected = gather_affected(surface.mesh.positions(), center, brush.falloff());
        if affected.is_empty() {
            return SculptStepResult::default();
        }

        let inward = -surface.mesh.world_to_local_normal(input.hit.normal);
        let BoundSurface { mesh, stroke, .. } = &mut *surface;
        let positions = mesh.positions_mut();
        let modified = match mode {
            SculptMode::Disabled => 0,
            SculptMode::Carve => apply_budgeted_offset(
                positions,
                &affected,
                inward,
                brush.carve_step(input.dt),
                brush.strength(),
                stroke,
            ),
            SculptMode::Raise => apply_budgeted_offset(
                positions,
                &affected,
                -inward,
                brush.carve_step(input.dt),
                brush.strength(),
                stroke,
            ),
            SculptMode::Drag => apply_drag(positions, &affected, drag_delta, brush.drag_damping()),
            SculptMode::Sand => apply_sand(positions, &affected, brush.strength()),
        };

        debug!(
            "apply_step: mode={}, affected={}, modified={}",
            mode.name(),
            affected.len(),
            modified
        );

        let commit = (modified > 0).then(|| surface.commit(modified));
        SculptStepResult {
            vertices_affected: affected.len(),
            commit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use painting::{MeshAccess, Ray, SurfaceRaycaster};

    const DT: f32 = 1.0 / 60.0;

    fn bound_plane(subdivisions: u32) -> SculptEngine {
        let mut engine = SculptEngine::default();
        engine
            .bind(SurfaceMesh::plane("patch", 2.0, subdivisions, Affine3A::IDENTITY))
            .unwrap();
        engine
    }

    fn hit_at(point: Vec3) -> SurfaceHit {
        SurfaceHit {
            point,
            normal: Vec3::Y,
            uv: None,
            triangle_index: 0,
            distance: 1.0,
        }
    }

    fn input_at(point: Vec3) -> SculptInput {
        SculptInput {
            hit: hit_at(point),
            ray: Ray::new(point + Vec3::Y * 5.0, Vec3::NEG_Y),
            view_direction: Vec3::NEG_Y,
            dt: DT,
        }
    }

    #[test]
    fn test_bind_rejects_read_only() {
        let mut engine = SculptEngine::default();
        let mesh = SurfaceMesh::plane("locked", 1.0, 1, Affine3A::IDENTITY)
            .with_access(MeshAccess::ReadOnly);
        assert_eq!(engine.bind(mesh), Err(SculptError::NotWritable("locked".to_string())));
        assert!(!engine.is_bound());
        assert!(engine.apply_step(&input_at(Vec3::ZERO)).is_noop());
    }

    #[test]
    fn test_bind_rejects_empty() {
        let mut engine = SculptEngine::default();
        let mesh = SurfaceMesh::new("empty", vec![], vec![], vec![], Affine3A::IDENTITY).unwrap();
        assert_eq!(engine.bind(mesh), Err(SculptError::EmptyGeometry("empty".to_string())));
    }

    #[test]
    fn test_carve_scenario_displaces_exactly_strength() {
        let mut engine = bound_plane(8);
        engine.brush.set_radius(0.5).unwrap();
        engine.brush.set_strength(0.1).unwrap();
        engine.set_mode(SculptMode::Carve);

        let before = engine.mesh().unwrap().positions().to_vec();
        engine.begin_stroke(Some(&hit_at(Vec3::ZERO)));
        for _ in 0..60 {
            engine.apply_step(&input_at(Vec3::ZERO));
        }
        engine.end_stroke();

        let after = engine.mesh().unwrap().positions();
        let mut affected = 0;
        for (b, a) in before.iter().zip(after) {
            // Rim vertices at exactly the radius are carved too
            if b.length() <= 0.5 {
                affected += 1;
                assert!((b.y - a.y - 0.1).abs() < 1e-5, "displaced {}", b.y - a.y);
            } else if b.length() > 0.5 {
                assert_eq!(a, b);
            }
        }
        assert!(affected > 0);
        // (0.5, 0, 0) sits on the rim
        assert!((after[42].y + 0.1).abs() < 1e-5, "{:?}", after[42]);
    }

    #[test]
    fn test_carve_follows_tilted_surface_normal() {
        let transform = Affine3A::from_rotation_translation(
            Quat::from_rotation_z(30f32.to_radians()),
            Vec3::new(1.0, 2.0, -1.0),
        );
        let mut engine = SculptEngine::default();
        engine.bind(SurfaceMesh::plane("tilted", 2.0, 8, transform)).unwrap();
        engine.brush.set_strength(0.1).unwrap();

        let world_normal = transform.transform_vector3(Vec3::Y);
        let target = transform.transform_point3(Vec3::new(0.1, 0.0, 0.1));
        let ray = Ray::new(target + world_normal * 5.0, -world_normal);
        let hit = SurfaceRaycaster::default()
            .cast(&ray, engine.proxy().unwrap())
            .unwrap();
        assert!((hit.normal - world_normal).length() < 1e-5);

        let input = SculptInput {
            hit,
            ray,
            view_direction: -world_normal,
            dt: DT,
        };
        engine.begin_stroke(Some(&hit));
        for _ in 0..60 {
            engine.apply_step(&input);
        }

        // Center vertex of the 9x9 grid sinks along the world normal
        let mesh = engine.mesh().unwrap();
        let local = mesh.positions()[40];
        assert!((local - Vec3::new(0.0, -0.1, 0.0)).length() < 1e-5, "{local:?}");
        let world = mesh.transform().transform_point3(local);
        let expected = transform.transform_point3(Vec3::ZERO) - world_normal * 0.1;
        assert!((world - expected).length() < 1e-5, "{world:?}");
    }

    #[test]
    fn test_raise_moves_outward_within_budget() {
        let mut engine = bound_plane(4);
        engine.set_mode(SculptMode::Raise);
        engine.brush.set_strength(0.05).unwrap();
        engine.begin_stroke(None);
        for _ in 0..240 {
            engine.apply_step(&input_at(Vec3::ZERO));
        }

        let stroke = engine.stroke().unwrap();
        for (i, p) in engine.mesh().unwrap().positions().iter().enumerate() {
            assert!(p.y >= 0.0);
            assert!(p.y <= 0.05 + 1e-6);
            assert!(stroke.accumulated(i) <= 0.05 + 1e-6);
        }
    }

    #[test]
    fn test_budget_resets_on_new_stroke() {
        let mut engine = bound_plane(4);
        engine.brush.set_strength(0.05).unwrap();
        for _ in 0..2 {
            engine.begin_stroke(None);
            for _ in 0..120 {
                engine.apply_step(&input_at(Vec3::ZERO));
            }
            engine.end_stroke();
        }
        // Center vertex of the 5x5 grid
        let center = engine.mesh().unwrap().positions()[12];
        assert!((center.y + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_commit_resyncs_proxy() {
        let mut engine = bound_plane(4);
        let revision = engine.mesh().unwrap().revision();
        engine.begin_stroke(None);
        let result = engine.apply_step(&input_at(Vec3::ZERO));

        let commit = result.commit.unwrap();
        assert_eq!(commit.revision, revision + 1);
        let mesh = engine.mesh().unwrap();
        let proxy = engine.proxy().unwrap();
        assert!(proxy.is_synced_with(mesh));

        // The next raycast sees the carved surface
        let ray = Ray::new(Vec3::new(0.1, 5.0, 0.1), Vec3::NEG_Y);
        let hit = SurfaceRaycaster::default().cast(&ray, proxy).unwrap();
        assert!(hit.point.y < 0.0);
    }

    #[test]
    fn test_miss_is_noop() {
        let mut engine = bound_plane(2);
        let revision = engine.mesh().unwrap().revision();
        engine.begin_stroke(None);
        let result = engine.apply_step(&input_at(Vec3::new(50.0, 0.0, 50.0)));
        assert!(result.is_noop());
        assert_eq!(result.vertices_affected, 0);
        assert_eq!(engine.mesh().unwrap().revision(), revision);
    }

    #[test]
    fn test_disabled_mode_is_noop() {
        let mut engine = bound_plane(2);
        engine.set_mode(SculptMode::Disabled);
        engine.begin_stroke(None);
        assert!(engine.apply_step(&input_at(Vec3::ZERO)).is_noop());
    }

    #[test]
    fn test_drag_follows_pointer() {
        let mut engine = bound_plane(4);
        engine.set_mode(SculptMode::Drag);
        engine.brush.set_hardness(1.0).unwrap();

        // No anchor yet: first step only sets it
        engine.begin_stroke(None);
        assert!(engine.apply_step(&input_at(Vec3::ZERO)).is_noop());

        // Camera looks along -Z; pointer ray moves up by 0.2
        let input = SculptInput {
            hit: hit_at(Vec3::ZERO),
            ray: Ray::new(Vec3::new(0.0, 0.2, 5.0), Vec3::NEG_Z),
            view_direction: Vec3::NEG_Z,
            dt: DT,
        };
        let result = engine.apply_step(&input);
        assert!(result.commit.is_some());

        let center = engine.mesh().unwrap().positions()[12];
        assert!((center.y - 0.1).abs() < 1e-5);
        let anchor = engine.stroke().unwrap().anchor().unwrap();
        assert!((anchor - Vec3::new(0.0, 0.2, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_drag_reanchors_after_clear() {
        let mut engine = bound_plane(4);
        engine.set_mode(SculptMode::Drag);
        let revision = engine.mesh().unwrap().revision();

        engine.begin_stroke(Some(&hit_at(Vec3::new(-0.5, 0.0, 0.0))));
        engine.clear_anchor();
        assert!(engine.is_stroke_active());

        // Returning at a different point only re-anchors
        assert!(engine.apply_step(&input_at(Vec3::new(0.5, 0.0, 0.0))).is_noop());
        assert_eq!(engine.mesh().unwrap().revision(), revision);
        let anchor = engine.stroke().unwrap().anchor().unwrap();
        assert!((anchor - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_drag_ignores_tiny_motion() {
        let mut engine = bound_plane(4);
        engine.set_mode(SculptMode::Drag);
        engine.begin_stroke(Some(&hit_at(Vec3::ZERO)));
        let input = SculptInput {
            hit: hit_at(Vec3::ZERO),
            ray: Ray::new(Vec3::new(0.001, 0.0, 5.0), Vec3::NEG_Z),
            view_direction: Vec3::NEG_Z,
            dt: DT,
        };
        assert!(engine.apply_step(&input).is_noop());
    }

    #[test]
    fn test_sand_scenario_collapses_spike() {
        let mesh = SurfaceMesh::new(
            "spike",
            vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, 3.0, 0.0)],
            vec![0, 1, 2],
            vec![],
            Affine3A::IDENTITY,
        )
        .unwrap();
        let mut engine = SculptEngine::new(SculptBrush::new(10.0, 1.0, 1.0).unwrap());
        engine.bind(mesh).unwrap();
        engine.set_mode(SculptMode::Sand);
        engine.begin_stroke(None);
        engine.apply_step(&input_at(Vec3::ZERO));

        let centroid = Vec3::new(1.0 / 3.0, 1.0, 0.0);
        for p in engine.mesh().unwrap().positions() {
            assert!((*p - centroid).length() < 1e-5);
        }
    }

    #[test]
    fn test_mode_change_flushes_stroke() {
        let mut engine = bound_plane(2);
        engine.begin_stroke(Some(&hit_at(Vec3::ZERO)));
        assert!(engine.is_stroke_active());
        engine.set_mode(SculptMode::Sand);
        assert!(!engine.is_stroke_active());
        assert!(engine.stroke().unwrap().anchor().is_none());
    }

    #[test]
    fn test_set_transform_resyncs_proxy() {
        let mut engine = bound_plane(2);
        engine.set_transform(Affine3A::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let mesh = engine.mesh().unwrap();
        assert!(engine.proxy().unwrap().is_synced_with(mesh));

        let ray = Ray::new(Vec3::new(0.1, 5.0, 0.1), Vec3::NEG_Y);
        let hit = SurfaceRaycaster::default().cast(&ray, engine.proxy().unwrap()).unwrap();
        assert!((hit.point.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unbind_returns_mesh() {
        let mut engine = bound_plane(2);
        let mesh = engine.unbind().unwrap();
        assert_eq!(mesh.name, "patch");
        assert!(!engine.is_bound());
        assert!(engine.unbind().is_none());
    }
}
