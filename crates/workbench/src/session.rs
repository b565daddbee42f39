//! The per-tick workbench session.
//!
//! One [`Workbench::step`] per frame:
//! 1. turntable rotation from the secondary button
//! 2. stamp rotation from scroll
//! 3. one raycast against the active collision proxy
//! 4. brush previews at the hit
//! 5. stroke begin/step/end from the primary button, paint before sculpt
//!
//! Mutations are announced through [`SurfaceHost`] after the engine has
//! resynced the collision proxy.

use chisel_config::WorkbenchConfig;
use glam::{Affine3A, Vec2, Vec3};
use painting::{
    BrushSizeNormalizer, Canvas, CollisionProxy, PaintBrush, PaintingPipeline, PixelRect,
    SourceTexture, StampImage, SurfaceHit, SurfaceMesh, SurfaceRaycaster,
};
use sculpting::{GeometryCommit, SculptBrush, SculptEngine, SculptInput, SculptMode};
use tracing::{debug, error, info, warn};

use crate::error::WorkbenchError;
use crate::pointer::{PointerSample, PointerTracker};
use crate::preview::{brush_preview, sculpt_cursor, BrushPreview, SculptCursor};
use crate::turntable::Turntable;

/// Receives committed mutations of the bound surface.
pub trait SurfaceHost {
    /// Geometry changed; the proxy already mirrors `mesh`.
    fn geometry_committed(
        &mut self,
        mesh: &SurfaceMesh,
        proxy: &CollisionProxy,
        commit: &GeometryCommit,
    );

    /// Pixels inside `rect` changed. [`Canvas::rect_rows`] yields just
    /// those bytes for a partial upload.
    fn canvas_committed(&mut self, canvas: &Canvas, rect: PixelRect);

    /// The surface transform changed (turntable).
    fn transform_committed(&mut self, _transform: Affine3A) {}
}

/// A host that ignores commit notifications and polls the workbench instead.
impl SurfaceHost for () {
    fn geometry_committed(
        &mut self,
        _mesh: &SurfaceMesh,
        _proxy: &CollisionProxy,
        _commit: &GeometryCommit,
    ) {
    }

    fn canvas_committed(&mut self, _canvas: &Canvas, _rect: PixelRect) {}
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub hit: Option<SurfaceHit>,
    pub brush_preview: Option<BrushPreview>,
    pub sculpt_cursor: Option<SculptCursor>,
    /// Canvas rectangle processed by this tick's dab
    pub painted: Option<PixelRect>,
    pub geometry: Option<GeometryCommit>,
    /// The turntable changed the surface transform
    pub rotated: bool,
}

/// Everything released by [`Workbench::unbind_surface`].
#[derive(Debug)]
pub struct ReleasedSurface {
    pub mesh: Option<SurfaceMesh>,
    pub canvas: Option<Canvas>,
}

/// Sculpting and painting session for one target surface.
pub struct Workbench {
    raycaster: SurfaceRaycaster,
    normalizer: BrushSizeNormalizer,
    turntable: Turntable,
    pointer_sensitivity: f32,
    show_preview: bool,
    surface_offset: f32,
    painting: PaintingPipeline,
    sculpt: SculptEngine,
    source_texture: Option<Box<dyn SourceTexture>>,
    soft_round: StampImage,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(&WorkbenchConfig::default())
    }
}

impl Workbench {
    /// Create a session from configuration. Invalid brush values fall back
    /// to the built-in defaults with a warning.
    pub fn new(config: &WorkbenchConfig) -> Self {
        let mut painting = PaintingPipeline::new(config.canvas.width, config.canvas.height);
        apply_paint_config(&mut painting.brush, config);

        let mut sculpt_brush = SculptBrush::default();
        apply_sculpt_config(&mut sculpt_brush, config);

        Self {
            raycaster: SurfaceRaycaster::new(config.interaction.raycast_max_distance),
            normalizer: BrushSizeNormalizer::new(
                config.preview.base_size,
                config.preview.reference_radius_pixels,
            ),
            turntable: Turntable::new(config.interaction.turntable_speed),
            pointer_sensitivity: config.interaction.pointer_sensitivity,
            show_preview: config.preview.show,
            surface_offset: config.preview.surface_offset,
            painting,
            sculpt: SculptEngine::new(sculpt_brush),
            source_texture: None,
            soft_round: StampImage::default_brush(),
        }
    }

    /// Bind the target surface and its optional source texture.
    ///
    /// `None` is fatal for the session until a surface is bound. A previously
    /// bound surface and its canvas are dropped.
    pub fn bind_surface(
        &mut self,
        mesh: Option<SurfaceMesh>,
        texture: Option<Box<dyn SourceTexture>>,
    ) -> Result<(), WorkbenchError> {
        let Some(mesh) = mesh else {
            error!("{}", WorkbenchError::MissingTarget);
            return Err(WorkbenchError::MissingTarget);
        };
        if self.sculpt.is_bound() {
            warn!("Replacing the bound surface; its canvas is discarded");
            self.unbind_surface();
        }

        self.sculpt.bind(mesh)?;
        self.source_texture = texture;
        Ok(())
    }

    /// Build a surface from raw buffers and bind it.
    pub fn bind_geometry(
        &mut self,
        name: &str,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        uvs: Vec<Vec2>,
        transform: Affine3A,
        texture: Option<Box<dyn SourceTexture>>,
    ) -> Result<(), WorkbenchError> {
        let mesh = SurfaceMesh::new(name, positions, indices, uvs, transform)?;
        self.bind_surface(Some(mesh), texture)
    }

    /// Hand the surface and the painted canvas back to the host.
    pub fn unbind_surface(&mut self) -> ReleasedSurface {
        self.source_texture = None;
        ReleasedSurface {
            mesh: self.sculpt.unbind(),
            canvas: self.painting.take_canvas(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.sculpt.is_bound()
    }

    pub fn mesh(&self) -> Option<&SurfaceMesh> {
        self.sculpt.mesh()
    }

    pub fn proxy(&self) -> Option<&CollisionProxy> {
        self.sculpt.proxy()
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.painting.canvas()
    }

    pub fn sculpt_mode(&self) -> SculptMode {
        self.sculpt.mode()
    }

    pub fn set_sculpt_mode(&mut self, mode: SculptMode) {
        self.sculpt.set_mode(mode);
    }

    pub fn is_painting_enabled(&self) -> bool {
        self.painting.is_enabled()
    }

    pub fn set_painting_enabled(&mut self, enabled: bool) {
        self.painting.set_enabled(enabled);
    }

    pub fn sculpt_brush(&self) -> &SculptBrush {
        &self.sculpt.brush
    }

    pub fn sculpt_brush_mut(&mut self) -> &mut SculptBrush {
        &mut self.sculpt.brush
    }

    pub fn paint_brush(&self) -> &PaintBrush {
        &self.painting.brush
    }

    pub fn paint_brush_mut(&mut self) -> &mut PaintBrush {
        &mut self.painting.brush
    }

    pub fn set_show_preview(&mut self, show: bool) {
        self.show_preview = show;
    }

    /// A tracker producing samples in the configured pointer axis units.
    pub fn pointer_tracker(&self) -> PointerTracker {
        PointerTracker::new(self.pointer_sensitivity)
    }

    /// Image the paint preview should display.
    pub fn preview_image(&self) -> &StampImage {
        match self.painting.brush.stamp() {
            Some(stamp) if self.painting.brush.use_stamp() => stamp,
            _ => &self.soft_round,
        }
    }

    /// Advance one frame.
    pub fn step(
        &mut self,
        sample: &PointerSample,
        dt: f32,
        host: &mut dyn SurfaceHost,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        if !self.sculpt.is_bound() {
            return report;
        }

        // Turntable
        if sample.secondary.held && sample.delta != Vec2::ZERO {
            if let Some(transform) = self.sculpt.mesh().map(SurfaceMesh::transform) {
                let rotated = self.turntable.apply(transform, sample.delta, dt);
                self.sculpt.set_transform(rotated);
                host.transform_committed(rotated);
                report.rotated = true;
            }
        }

        if self.painting.is_enabled() && sample.scroll != 0.0 {
            self.painting.scroll(sample.scroll);
        }

        let hit = self
            .sculpt
            .proxy()
            .and_then(|proxy| self.raycaster.cast(&sample.ray, proxy));
        report.hit = hit;

        if self.show_preview {
            if let (Some(hit), Some(proxy)) = (hit.as_ref(), self.sculpt.proxy()) {
                if self.painting.is_enabled() {
                    report.brush_preview = Some(brush_preview(
                        hit,
                        proxy,
                        &self.painting.brush,
                        &self.normalizer,
                        self.painting.texture_width(),
                        self.surface_offset,
                    ));
                }
                if self.sculpt.mode().deforms() {
                    report.sculpt_cursor = Some(sculpt_cursor(hit, self.sculpt.brush.radius()));
                }
            }
        }

        if sample.primary.pressed {
            debug!("Stroke started, hit={}", hit.is_some());
            self.sculpt.begin_stroke(hit.as_ref());
        }

        if sample.primary.held {
            match hit {
                Some(hit) => {
                    report.painted = self.paint(&hit, host);
                    report.geometry = self.sculpt_step(hit, sample, dt, host);
                }
                None => self.sculpt.clear_anchor(),
            }
        }

        if sample.primary.released {
            debug!("Stroke ended");
            self.sculpt.end_stroke();
        }

        report
    }

    fn paint(&mut self, hit: &SurfaceHit, host: &mut dyn SurfaceHost) -> Option<PixelRect> {
        let rect = self.painting.paint_hit(hit, self.source_texture.as_deref())?;
        if let Some(canvas) = self.painting.canvas() {
            host.canvas_committed(canvas, rect);
        }
        Some(rect)
    }

    fn sculpt_step(
        &mut self,
        hit: SurfaceHit,
        sample: &PointerSample,
        dt: f32,
        host: &mut dyn SurfaceHost,
    ) -> Option<GeometryCommit> {
        let input = SculptInput {
            hit,
            ray: sample.ray,
            view_direction: sample.view_direction,
            dt,
        };
        let commit = self.sculpt.apply_step(&input).commit?;
        if let (Some(mesh), Some(proxy)) = (self.sculpt.mesh(), self.sculpt.proxy()) {
            host.geometry_committed(mesh, proxy, &commit);
        }
        Some(commit)
    }
}

fn apply_paint_config(brush: &mut PaintBrush, config: &WorkbenchConfig) {
    let paint = &config.paint;
    let results = [
        brush.set_radius(paint.radius_pixels),
        brush.set_flow(paint.flow),
        brush.set_hardness(paint.hardness),
    ];
    if results.iter().any(Result::is_err) {
        warn!("Paint config has invalid values; using defaults for those");
    }
    brush.set_color(paint.color);
    brush.set_rotation_step(paint.stamp_rotation_step);
}

fn apply_sculpt_config(brush: &mut SculptBrush, config: &WorkbenchConfig) {
    let sculpt = &config.sculpt;
    let results = [
        brush.set_radius(sculpt.radius),
        brush.set_strength(sculpt.strength),
        brush.set_hardness(sculpt.hardness),
    ];
    if results.iter().any(Result::is_err) {
        warn!("Sculpt config has invalid values; using defaults for those");
    }
    brush.set_carve_rate(sculpt.carve_rate);
    brush.set_drag_damping(sculpt.drag_damping);
    info!(
        "Sculpt brush: radius={}, strength={}, hardness={}",
        brush.radius(),
        brush.strength(),
        brush.hardness()
    );
}
