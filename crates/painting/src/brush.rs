//! Paint brush settings
//!
//! Radius is in canvas pixels. Setters validate their input and keep the
//! previous value when it is rejected.

use chisel_config::{
    DEFAULT_PAINT_COLOR, DEFAULT_PAINT_FLOW, DEFAULT_PAINT_HARDNESS, DEFAULT_PAINT_RADIUS_PIXELS,
    DEFAULT_STAMP_ROTATION_STEP,
};
use tracing::warn;

use crate::stamp::StampImage;
use crate::types::Rgba;
use crate::validation::{
    normalize_degrees, validate_flow, validate_hardness, validate_radius, BrushParamError,
};

/// Texture brush configuration
#[derive(Debug, Clone)]
pub struct PaintBrush {
    /// Radius in canvas pixels
    radius: f32,
    /// Opacity per dab, 0.0-1.0
    flow: f32,
    /// Hardness: 0.0 = soft, 1.0 = hard
    hardness: f32,
    color: Rgba,
    stamp: Option<StampImage>,
    use_stamp: bool,
    /// Stamp rotation in degrees, [0, 360)
    rotation: f32,
    /// Degrees per scroll unit
    rotation_step: f32,
}

impl Default for PaintBrush {
    fn default() -> Self {
        Self {
            radius: DEFAULT_PAINT_RADIUS_PIXELS,
            flow: DEFAULT_PAINT_FLOW,
            hardness: DEFAULT_PAINT_HARDNESS,
            color: DEFAULT_PAINT_COLOR,
            stamp: None,
            use_stamp: false,
            rotation: 0.0,
            rotation_step: DEFAULT_STAMP_ROTATION_STEP,
        }
    }
}

impl PaintBrush {
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn flow(&self) -> f32 {
        self.flow
    }

    pub fn hardness(&self) -> f32 {
        self.hardness
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn stamp(&self) -> Option<&StampImage> {
        self.stamp.as_ref()
    }

    pub fn use_stamp(&self) -> bool {
        self.use_stamp
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn rotation_step(&self) -> f32 {
        self.rotation_step
    }

    /// Whether a dab would composite the stamp image.
    pub fn stamps(&self) -> bool {
        self.use_stamp && self.stamp.is_some()
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<(), BrushParamError> {
        self.radius = validate_radius(radius).inspect_err(|e| warn!("{}", e))?;
        Ok(())
    }

    pub fn set_flow(&mut self, flow: f32) -> Result<(), BrushParamError> {
        self.flow = validate_flow(flow).inspect_err(|e| warn!("{}", e))?;
        Ok(())
    }

    pub fn set_hardness(&mut self, hardness: f32) -> Result<(), BrushParamError> {
        self.hardness = validate_hardness(hardness).inspect_err(|e| warn!("{}", e))?;
        Ok(())
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color.map(|c| c.clamp(0.0, 1.0));
    }

    pub fn set_stamp(&mut self, stamp: Option<StampImage>) {
        self.stamp = stamp;
    }

    pub fn set_use_stamp(&mut self, use_stamp: bool) {
        self.use_stamp = use_stamp;
    }

    pub fn set_rotation(&mut self, degrees: f32) -> Result<(), BrushParamError> {
        self.rotation = normalize_degrees(degrees).inspect_err(|e| warn!("{}", e))?;
        Ok(())
    }

    pub fn set_rotation_step(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.rotation_step = degrees;
        }
    }

    /// Rotate the stamp by `delta` scroll units. Ignored unless stamp mode is on.
    pub fn scroll(&mut self, delta: f32) {
        if !self.use_stamp || delta == 0.0 {
            return;
        }
        // Non-finite deltas leave the rotation untouched
        let _ = self.set_rotation(self.rotation + delta * self.rotation_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let brush = PaintBrush::default();
        assert_eq!(brush.radius(), 25.0);
        assert_eq!(brush.flow(), 0.5);
        assert_eq!(brush.hardness(), 0.5);
        assert_eq!(brush.color(), [1.0, 0.0, 0.0, 1.0]);
        assert!(!brush.stamps());
    }

    #[test]
    fn test_rejected_radius_keeps_prior() {
        let mut brush = PaintBrush::default();
        brush.set_radius(12.0).unwrap();
        assert!(brush.set_radius(0.0).is_err());
        assert!(brush.set_radius(-3.0).is_err());
        assert_eq!(brush.radius(), 12.0);
    }

    #[test]
    fn test_flow_and_hardness_clamped() {
        let mut brush = PaintBrush::default();
        brush.set_flow(2.0).unwrap();
        brush.set_hardness(-1.0).unwrap();
        assert_eq!(brush.flow(), 1.0);
        assert_eq!(brush.hardness(), 0.0);
        assert!(brush.set_flow(f32::NAN).is_err());
        assert_eq!(brush.flow(), 1.0);
    }

    #[test]
    fn test_scroll_rotates_only_in_stamp_mode() {
        let mut brush = PaintBrush::default();
        brush.scroll(1.0);
        assert_eq!(brush.rotation(), 0.0);

        brush.set_use_stamp(true);
        brush.scroll(2.0);
        assert_eq!(brush.rotation(), 20.0);
        brush.scroll(-3.0);
        assert_eq!(brush.rotation(), 350.0);
        brush.scroll(39.0);
        assert!((brush.rotation() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_stamps_requires_image() {
        let mut brush = PaintBrush::default();
        brush.set_use_stamp(true);
        assert!(!brush.stamps());
        brush.set_stamp(Some(StampImage::soft_round(8)));
        assert!(brush.stamps());
    }
}
