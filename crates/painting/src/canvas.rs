//! Engine-owned RGBA canvas and its brush/stamp compositing.
//!
//! A canvas is provisioned once per surface: blank white when the surface has
//! no texture, otherwise a clone of the source texture. The source is never
//! written, and once the canvas exists it is never re-derived from the source.

use chisel_config::DEFAULT_CANVAS_SIZE;
use glam::Vec2;
use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::WHITE;
use crate::falloff::brush_weight;
use crate::stamp::{lerp_rgba, StampImage};
use crate::types::{PixelRect, Rgba};

#[derive(Debug, Error, PartialEq)]
pub enum TextureReadError {
    #[error("Texture '{0}' is not readable")]
    NotReadable(String),
    #[error("Texture '{name}' returned {actual} pixels, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// An external texture a canvas may be cloned from.
pub trait SourceTexture {
    fn name(&self) -> &str;
    fn dimensions(&self) -> (u32, u32);
    /// Read all pixels row-major. May fail for assets without CPU access.
    fn read_pixels(&self) -> Result<Vec<Rgba>, TextureReadError>;
}

impl SourceTexture for RgbaImage {
    fn name(&self) -> &str {
        "rgba8"
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn read_pixels(&self) -> Result<Vec<Rgba>, TextureReadError> {
        Ok(self
            .pixels()
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                ]
            })
            .collect())
    }
}

/// A host-side texture asset with an explicit CPU read permission.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAsset {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
    pub readable: bool,
}

impl TextureAsset {
    pub fn new(name: impl Into<String>, width: u32, height: u32, pixels: Vec<Rgba>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels,
            readable: true,
        }
    }

    pub fn solid(name: impl Into<String>, width: u32, height: u32, color: Rgba) -> Self {
        Self::new(name, width, height, vec![color; (width as usize) * (height as usize)])
    }
}

impl SourceTexture for TextureAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_pixels(&self) -> Result<Vec<Rgba>, TextureReadError> {
        if !self.readable {
            return Err(TextureReadError::NotReadable(self.name.clone()));
        }
        Ok(self.pixels.clone())
    }
}

/// Where a canvas' initial pixels came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasOrigin {
    /// Fresh opaque white buffer
    Blank,
    /// Copy of a readable source texture
    Cloned { source: String },
    /// Source could not be read; opaque white at the source's size
    Substituted { source: String },
}

/// An RGBA float pixel buffer, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Create a canvas filled with a solid color
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![color; pixel_count],
        }
    }

    /// Opaque white canvas
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, WHITE)
    }

    /// Clone a source texture's pixels into a new canvas.
    pub fn clone_from_source(source: &dyn SourceTexture) -> Result<Self, TextureReadError> {
        let (width, height) = source.dimensions();
        let pixels = source.read_pixels()?;
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(TextureReadError::SizeMismatch {
                name: source.name().to_string(),
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Pixel center for a UV coordinate.
    pub fn uv_to_pixel(&self, uv: Vec2) -> Vec2 {
        Vec2::new(uv.x * self.width as f32, uv.y * self.height as f32)
    }

    /// Square box `[center - radius, center + radius]` clipped to the canvas.
    /// None when the box misses the canvas entirely.
    pub fn brush_box(&self, center: Vec2, radius: f32) -> Option<PixelRect> {
        if self.width == 0 || self.height == 0 || !(radius > 0.0) {
            return None;
        }

        let x_min_f = (center.x - radius).floor();
        let y_min_f = (center.y - radius).floor();
        let x_max_f = (center.x + radius).ceil();
        let y_max_f = (center.y + radius).ceil();

        // Completely off-canvas
        if x_max_f < 0.0
            || y_max_f < 0.0
            || x_min_f > (self.width - 1) as f32
            || y_min_f > (self.height - 1) as f32
        {
            return None;
        }

        let x_min = x_min_f.max(0.0) as u32;
        let y_min = y_min_f.max(0.0) as u32;
        let x_max = (x_max_f as u32).min(self.width - 1);
        let y_max = (y_max_f as u32).min(self.height - 1);

        Some(PixelRect {
            x: x_min,
            y: y_min,
            width: x_max - x_min + 1,
            height: y_max - y_min + 1,
        })
    }

    /// Paint a round brush dab.
    ///
    /// Pixels within `radius` of `center` blend toward `color` by
    /// `influence * flow`. Returns the box that was processed.
    pub fn paint_brush(
        &mut self,
        center: Vec2,
        radius: f32,
        color: Rgba,
        flow: f32,
        hardness: f32,
    ) -> Option<PixelRect> {
        let rect = self.brush_box(center, radius)?;
        debug!(
            "paint_brush: center=({:.1}, {:.1}), r={:.1}, flow={:.2}, hardness={:.2}, box={:?}",
            center.x, center.y, radius, flow, hardness, rect
        );

        for py in rect.y..rect.y + rect.height {
            for px in rect.x..rect.x + rect.width {
                let distance = Vec2::new(px as f32, py as f32).distance(center);
                if distance > radius {
                    continue;
                }
                let alpha = brush_weight(distance, radius, hardness, flow);
                if alpha > 0.0 {
                    let index = self.index(px, py);
                    self.pixels[index] = lerp_rgba(self.pixels[index], color, alpha);
                }
            }
        }

        Some(rect)
    }

    /// Paint a rotated stamp image centered on `center`.
    ///
    /// The stamp spans the brush box (`2 * radius` pixels across). Offsets are
    /// rotated by `-rotation_degrees` into stamp space; pixels mapping outside
    /// the unit square are left alone, so the stamp's own alpha defines its shape.
    pub fn paint_stamp(
        &mut self,
        center: Vec2,
        radius: f32,
        stamp: &StampImage,
        rotation_degrees: f32,
        flow: f32,
    ) -> Option<PixelRect> {
        let rect = self.brush_box(center, radius)?;
        debug!(
            "paint_stamp: center=({:.1}, {:.1}), r={:.1}, angle={:.1}deg, flow={:.2}, box={:?}",
            center.x, center.y, radius, rotation_degrees, flow, rect
        );

        let angle = (-rotation_degrees).to_radians();
        let (sin_a, cos_a) = angle.sin_cos();
        let diameter = radius * 2.0;
        let flow = flow.clamp(0.0, 1.0);

        for py in rect.y..rect.y + rect.height {
            for px in rect.x..rect.x + rect.width {
                let rel_x = px as f32 - center.x;
                let rel_y = py as f32 - center.y;

                let rot_x = rel_x * cos_a - rel_y * sin_a;
                let rot_y = rel_x * sin_a + rel_y * cos_a;

                let u = rot_x / diameter + 0.5;
                let v = rot_y / diameter + 0.5;
                if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
                    continue;
                }

                let sample = stamp.sample_bilinear(u, v);
                let alpha = (sample[3] * flow).clamp(0.0, 1.0);
                if alpha > 0.0 {
                    let index = self.index(px, py);
                    self.pixels[index] = lerp_rgba(self.pixels[index], sample, alpha);
                }
            }
        }

        Some(rect)
    }

    /// Get raw pixel data for a full upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Raw bytes of each row of `rect`, top to bottom, for partial uploads.
    ///
    /// Yields `(y, bytes)`. The rectangle is clipped to the canvas.
    pub fn rect_rows(&self, rect: PixelRect) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        let x0 = rect.x.min(self.width);
        let x1 = rect.x.saturating_add(rect.width).min(self.width);
        let y0 = rect.y.min(self.height);
        let y1 = rect.y.saturating_add(rect.height).min(self.height);
        (y0..y1).map(move |y| {
            let row = (y * self.width) as usize;
            let span = row + x0 as usize..row + x1 as usize;
            let bytes: &[u8] = bytemuck::cast_slice(&self.pixels[span]);
            (y, bytes)
        })
    }

    /// Quantize to an 8-bit image for the host.
    pub fn to_rgba8(&self) -> RgbaImage {
        let bytes: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|p| p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect();
        // Length always matches width * height * 4
        RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }
}

/// The canvas slot for the active surface.
#[derive(Debug)]
pub struct TextureCanvas {
    canvas: Option<Canvas>,
    origin: Option<CanvasOrigin>,
    default_size: (u32, u32),
}

impl Default for TextureCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE)
    }
}

impl TextureCanvas {
    pub fn new(default_width: u32, default_height: u32) -> Self {
        Self {
            canvas: None,
            origin: None,
            default_size: (default_width, default_height),
        }
    }

    /// Resolution of canvases provisioned without a source texture.
    pub fn default_size(&self) -> (u32, u32) {
        self.default_size
    }

    /// Provision the canvas on first use and return it.
    ///
    /// An existing canvas is always returned as-is. Otherwise the canvas is a
    /// clone of `source`, or white when there is no source. An unreadable
    /// source is replaced by white at its dimensions.
    pub fn ensure(&mut self, source: Option<&dyn SourceTexture>) -> &mut Canvas {
        let default_size = self.default_size;
        let origin = &mut self.origin;
        self.canvas.get_or_insert_with(|| {
            let (canvas, provisioned) = provision(default_size, source);
            *origin = Some(provisioned);
            canvas
        })
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn origin(&self) -> Option<&CanvasOrigin> {
        self.origin.as_ref()
    }

    pub fn is_owned(&self) -> bool {
        self.canvas.is_some()
    }

    /// Release the canvas to the host.
    pub fn take(&mut self) -> Option<Canvas> {
        self.origin = None;
        self.canvas.take()
    }
}

fn provision(
    default_size: (u32, u32),
    source: Option<&dyn SourceTexture>,
) -> (Canvas, CanvasOrigin) {
    let Some(source) = source else {
        let (w, h) = default_size;
        info!("Provisioning blank {}x{} canvas", w, h);
        return (Canvas::blank(w, h), CanvasOrigin::Blank);
    };

    match Canvas::clone_from_source(source) {
        Ok(canvas) => {
            info!(
                "Cloned texture '{}' ({}x{}) into a paintable canvas",
                source.name(),
                canvas.width,
                canvas.height
            );
            let origin = CanvasOrigin::Cloned {
                source: source.name().to_string(),
            };
            (canvas, origin)
        }
        Err(e) => {
            let (w, h) = source.dimensions();
            warn!("{}. Creating a blank white {}x{} canvas for painting.", e, w, h);
            let origin = CanvasOrigin::Substituted {
                source: source.name().to_string(),
            };
            (Canvas::blank(w, h), origin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [1.0, 0.0, 0.0, 1.0];

    fn assert_rgba_near(actual: Option<Rgba>, expected: Rgba) {
        let actual = actual.expect("pixel in range");
        for c in 0..4 {
            assert!(
                (actual[c] - expected[c]).abs() < 1e-5,
                "{actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn test_blank_canvas() {
        let canvas = Canvas::blank(100, 100);
        assert_eq!(canvas.pixel_count(), 10000);
        assert_eq!(canvas.get_pixel(5, 5), Some(WHITE));
        assert_eq!(canvas.get_pixel(100, 100), None);
    }

    #[test]
    fn test_hard_brush_scenario() {
        let mut canvas = Canvas::blank(1024, 1024);
        let color = [0.2, 0.4, 0.6, 1.0];
        let rect = canvas
            .paint_brush(Vec2::new(512.0, 512.0), 10.0, color, 1.0, 1.0)
            .unwrap();

        assert_eq!(canvas.get_pixel(517, 512), Some(color));
        assert_eq!(canvas.get_pixel(512, 507), Some(color));
        assert_eq!(canvas.get_pixel(527, 512), Some(WHITE));
        assert_eq!(canvas.get_pixel(512, 497), Some(WHITE));
        assert_eq!(
            rect,
            PixelRect {
                x: 502,
                y: 502,
                width: 21,
                height: 21
            }
        );
    }

    #[test]
    fn test_soft_brush_falls_off() {
        let mut canvas = Canvas::blank(64, 64);
        canvas.paint_brush(Vec2::new(32.0, 32.0), 10.0, RED, 1.0, 0.0);

        let center = canvas.get_pixel(32, 32).unwrap();
        let mid = canvas.get_pixel(37, 32).unwrap();
        assert_eq!(center, RED);
        // Half-way out on a linear cone: 50% blend toward red
        assert!((mid[1] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_flow_limits_opacity() {
        let mut canvas = Canvas::blank(32, 32);
        canvas.paint_brush(Vec2::new(16.0, 16.0), 4.0, RED, 0.25, 1.0);
        let p = canvas.get_pixel(16, 16).unwrap();
        assert!((p[1] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_brush_only_touches_box() {
        let mut canvas = Canvas::blank(64, 48);
        let before = canvas.clone();
        let rect = canvas
            .paint_brush(Vec2::new(3.5, 40.2), 7.0, RED, 1.0, 0.3)
            .unwrap();

        for y in 0..canvas.height {
            for x in 0..canvas.width {
                if !rect.contains(x, y) {
                    assert_eq!(canvas.get_pixel(x, y), before.get_pixel(x, y), "({x},{y})");
                }
            }
        }
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y + rect.height, 48);
    }

    #[test]
    fn test_brush_off_canvas() {
        let mut canvas = Canvas::blank(16, 16);
        assert!(canvas.paint_brush(Vec2::new(-50.0, 8.0), 5.0, RED, 1.0, 1.0).is_none());
        assert!(canvas.paint_brush(Vec2::new(8.0, 8.0), 0.0, RED, 1.0, 1.0).is_none());
        assert!(canvas.pixels().iter().all(|p| *p == WHITE));
    }

    fn left_half_stamp() -> StampImage {
        // Opaque red on the left half, transparent on the right
        let mut pixels = Vec::new();
        for _y in 0..8 {
            for x in 0..8 {
                if x < 4 {
                    pixels.push(RED);
                } else {
                    pixels.push([0.0, 0.0, 0.0, 0.0]);
                }
            }
        }
        StampImage::from_pixels(8, 8, pixels).unwrap()
    }

    #[test]
    fn test_stamp_uses_its_alpha_shape() {
        let mut canvas = Canvas::blank(64, 64);
        canvas.paint_stamp(Vec2::new(32.0, 32.0), 10.0, &left_half_stamp(), 0.0, 1.0);

        assert_rgba_near(canvas.get_pixel(25, 32), RED);
        assert_eq!(canvas.get_pixel(39, 32), Some(WHITE));
        // Corners of the box are inside the unit square, no circular clip
        assert_rgba_near(canvas.get_pixel(23, 23), RED);
    }

    #[test]
    fn test_stamp_rotation() {
        let mut canvas = Canvas::blank(64, 64);
        canvas.paint_stamp(Vec2::new(32.0, 32.0), 10.0, &left_half_stamp(), 180.0, 1.0);

        // Rotated half-way round, the painted half moves to the right
        assert_rgba_near(canvas.get_pixel(39, 32), RED);
        assert_eq!(canvas.get_pixel(25, 32), Some(WHITE));
    }

    #[test]
    fn test_stamp_only_touches_box() {
        let mut canvas = Canvas::blank(40, 40);
        let before = canvas.clone();
        let stamp = StampImage::soft_round(16);
        let rect = canvas
            .paint_stamp(Vec2::new(38.0, 2.0), 6.0, &stamp, 45.0, 1.0)
            .unwrap();

        for y in 0..canvas.height {
            for x in 0..canvas.width {
                if !rect.contains(x, y) {
                    assert_eq!(canvas.get_pixel(x, y), before.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn test_ensure_blank_when_no_source() {
        let mut slot = TextureCanvas::new(32, 16);
        let canvas = slot.ensure(None);
        assert_eq!((canvas.width, canvas.height), (32, 16));
        assert!(canvas.pixels().iter().all(|p| *p == WHITE));
        assert_eq!(slot.origin(), Some(&CanvasOrigin::Blank));
    }

    #[test]
    fn test_clone_is_non_destructive() {
        let source = TextureAsset::solid("albedo", 16, 16, [0.0, 0.0, 1.0, 1.0]);
        let snapshot = source.clone();

        let mut slot = TextureCanvas::default();
        slot.ensure(Some(&source))
            .paint_brush(Vec2::new(8.0, 8.0), 4.0, RED, 1.0, 1.0);

        assert_eq!(source, snapshot);
        assert_eq!(slot.canvas().unwrap().get_pixel(8, 8), Some(RED));
        assert_eq!(
            slot.origin(),
            Some(&CanvasOrigin::Cloned {
                source: "albedo".to_string()
            })
        );
    }

    #[test]
    fn test_unreadable_source_is_substituted() {
        let mut source = TextureAsset::solid("locked", 8, 4, [0.0, 1.0, 0.0, 1.0]);
        source.readable = false;

        let mut slot = TextureCanvas::default();
        let canvas = slot.ensure(Some(&source));
        assert_eq!((canvas.width, canvas.height), (8, 4));
        assert!(canvas.pixels().iter().all(|p| *p == WHITE));
        assert_eq!(
            slot.origin(),
            Some(&CanvasOrigin::Substituted {
                source: "locked".to_string()
            })
        );
    }

    #[test]
    fn test_owned_canvas_is_never_rederived() {
        let source = TextureAsset::solid("albedo", 8, 8, [0.0, 0.0, 1.0, 1.0]);
        let mut slot = TextureCanvas::default();
        slot.ensure(Some(&source)).set_pixel(0, 0, RED);

        let other = TextureAsset::solid("other", 4, 4, [0.0, 1.0, 0.0, 1.0]);
        let canvas = slot.ensure(Some(&other));
        assert_eq!((canvas.width, canvas.height), (8, 8));
        assert_eq!(canvas.get_pixel(0, 0), Some(RED));
    }

    #[test]
    fn test_clone_from_rgba8() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([0, 255, 0, 255]));
        let canvas = Canvas::clone_from_source(&image).unwrap();
        assert_eq!(canvas.get_pixel(3, 3), Some([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(canvas.to_rgba8(), image);
    }

    #[test]
    fn test_size_mismatch_is_an_error() {
        let source = TextureAsset::new("short", 4, 4, vec![WHITE; 3]);
        assert!(matches!(
            Canvas::clone_from_source(&source),
            Err(TextureReadError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_as_bytes() {
        let canvas = Canvas::blank(2, 2);
        // 4 pixels * 4 components * 4 bytes per f32 = 64 bytes
        assert_eq!(canvas.as_bytes().len(), 64);
    }

    #[test]
    fn test_rect_rows_bring_a_mirror_up_to_date() {
        let mut canvas = Canvas::blank(64, 48);
        let mut mirror = canvas.as_bytes().to_vec();
        let rect = canvas
            .paint_brush(Vec2::new(60.0, 10.0), 7.0, [0.0, 0.5, 1.0, 1.0], 1.0, 0.5)
            .unwrap();
        assert_ne!(mirror.as_slice(), canvas.as_bytes());

        let row_bytes = 64 * 16;
        for (y, bytes) in canvas.rect_rows(rect) {
            let start = y as usize * row_bytes + rect.x as usize * 16;
            mirror[start..start + bytes.len()].copy_from_slice(bytes);
        }
        assert_eq!(mirror.as_slice(), canvas.as_bytes());
    }
}
