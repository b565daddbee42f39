//! Stamp images composited by the stamp brush and shown by the preview cursor.

use image::RgbaImage;

use crate::constants::DEFAULT_BRUSH_TEXTURE_SIZE;
use crate::types::Rgba;

/// An RGBA float image sampled in normalized coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StampImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl StampImage {
    /// Create from row-major pixels. Returns None if the pixel count is wrong
    /// or the image is empty.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Convert an 8-bit image.
    pub fn from_rgba8(image: &RgbaImage) -> Option<Self> {
        let pixels = image
            .pixels()
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                ]
            })
            .collect();
        Self::from_pixels(image.width(), image.height(), pixels)
    }

    /// The procedural round brush: white with alpha `sqrt(1 - d/r)`.
    pub fn soft_round(size: u32) -> Self {
        let size = size.max(1);
        let center = size as f32 / 2.0;
        let radius = size as f32 / 2.0;
        let mut pixels = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let dist = (dx * dx + dy * dy).sqrt();
                let alpha = (1.0 - (dist / radius).clamp(0.0, 1.0)).sqrt();
                pixels.push([1.0, 1.0, 1.0, alpha]);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    pub fn default_brush() -> Self {
        Self::soft_round(DEFAULT_BRUSH_TEXTURE_SIZE)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Bilinear sample at normalized `(u, v)`, clamped to the edges.
    ///
    /// Texel centers sit at `(i + 0.5) / width`.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Rgba {
        let fx = (u * self.width as f32 - 0.5).clamp(0.0, (self.width - 1) as f32);
        let fy = (v * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = lerp_rgba(self.pixel(x0, y0), self.pixel(x1, y0), tx);
        let bottom = lerp_rgba(self.pixel(x0, y1), self.pixel(x1, y1), tx);
        lerp_rgba(top, bottom, ty)
    }
}

/// `a * (1 - t) + b * t` per channel. Exact at `t = 0` and `t = 1`.
#[inline]
pub fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let s = 1.0 - t;
    [
        a[0] * s + b[0] * t,
        a[1] * s + b[1] * t,
        a[2] * s + b[2] * t,
        a[3] * s + b[3] * t,
    ]
}
