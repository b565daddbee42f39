//! Texture painting pipeline
//!
//! Connects a surface hit to the canvas:
//! - hit UV is mapped to a canvas pixel
//! - the canvas is provisioned on first use
//! - a stamp or round brush dab is composited
//!
//! The pipeline is driven from the workbench but has no knowledge of pointers
//! or cameras.

use chisel_config::DEFAULT_CANVAS_SIZE;
use glam::Vec2;
use tracing::{debug, info};

use crate::brush::PaintBrush;
use crate::canvas::{Canvas, SourceTexture, TextureCanvas};
use crate::types::{PixelRect, SurfaceHit};

/// Painting state for the active surface
pub struct PaintingPipeline {
    enabled: bool,
    /// Current brush settings
    pub brush: PaintBrush,
    canvas: TextureCanvas,
}

impl Default for PaintingPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE)
    }
}

impl PaintingPipeline {
    /// Create a pipeline whose blank canvases use the given resolution
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            enabled: false,
            brush: PaintBrush::default(),
            canvas: TextureCanvas::new(canvas_width, canvas_height),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Texture painting {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    /// The owned canvas, if one has been provisioned
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.canvas()
    }

    pub fn texture_canvas(&self) -> &TextureCanvas {
        &self.canvas
    }

    /// Width used for preview sizing: the canvas width, or the configured
    /// blank canvas width before a canvas exists.
    pub fn texture_width(&self) -> u32 {
        self.canvas
            .canvas()
            .map(|c| c.width)
            .unwrap_or(self.canvas.default_size().0)
    }

    /// Rotate the stamp from scroll input
    pub fn scroll(&mut self, delta: f32) {
        self.brush.scroll(delta);
    }

    /// Paint one dab at a surface hit.
    ///
    /// Returns the canvas rectangle that was processed. Does nothing while
    /// disabled or when the hit carries no UV.
    pub fn paint_hit(
        &mut self,
        hit: &SurfaceHit,
        source: Option<&dyn SourceTexture>,
    ) -> Option<PixelRect> {
        if !self.enabled {
            return None;
        }
        let Some(uv) = hit.uv else {
            debug!("PaintingPipeline::paint_hit: hit has no UV, skipping");
            return None;
        };

        let center = self.canvas.ensure(source).uv_to_pixel(uv);
        self.paint_at(center, source)
    }

    /// Paint one dab centered on a canvas pixel position
    pub fn paint_at(
        &mut self,
        center: Vec2,
        source: Option<&dyn SourceTexture>,
    ) -> Option<PixelRect> {
        if !self.enabled {
            return None;
        }
        let brush = &self.brush;
        let canvas = self.canvas.ensure(source);
        match brush.stamp().filter(|_| brush.use_stamp()) {
            Some(stamp) => {
                canvas.paint_stamp(center, brush.radius(), stamp, brush.rotation(), brush.flow())
            }
            None => canvas.paint_brush(
                center,
                brush.radius(),
                brush.color(),
                brush.flow(),
                brush.hardness(),
            ),
        }
    }

    /// Release the canvas, e.g. when the surface is unbound
    pub fn take_canvas(&mut self) -> Option<Canvas> {
        self.canvas.take()
    }
}
