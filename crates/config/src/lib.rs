//! Shared configuration for Chisel
//!
//! This crate provides the single source of truth for brush defaults, preview
//! sizing, canvas resolution and interaction constants. Every section has a
//! `Default`, and missing fields in a JSON file fall back to it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default sculpt brush radius in surface units
pub const DEFAULT_SCULPT_RADIUS: f32 = 0.5;

/// Default sculpt strength (maximum per-stroke displacement)
pub const DEFAULT_SCULPT_STRENGTH: f32 = 0.1;

/// Default sculpt hardness (0.0 = linear cone)
pub const DEFAULT_SCULPT_HARDNESS: f32 = 0.0;

/// Budget spent per second is `strength * carve_rate`
pub const DEFAULT_CARVE_RATE: f32 = 5.0;

/// Fraction of pointer motion applied by Drag
pub const DEFAULT_DRAG_DAMPING: f32 = 0.5;

/// Default paint brush radius in canvas pixels
pub const DEFAULT_PAINT_RADIUS_PIXELS: f32 = 25.0;

/// Default paint flow
pub const DEFAULT_PAINT_FLOW: f32 = 0.5;

/// Default paint hardness
pub const DEFAULT_PAINT_HARDNESS: f32 = 0.5;

/// Default paint color (opaque red)
pub const DEFAULT_PAINT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Stamp rotation per scroll unit, in degrees
pub const DEFAULT_STAMP_ROTATION_STEP: f32 = 10.0;

/// World size of the preview when the UV mapping is unusable
pub const DEFAULT_PREVIEW_BASE_SIZE: f32 = 0.5;

/// Pixel radius at which the fallback preview equals the base size
pub const DEFAULT_REFERENCE_RADIUS_PIXELS: f32 = 25.0;

/// Preview lift along the surface normal, avoids z-fighting
pub const DEFAULT_PREVIEW_SURFACE_OFFSET: f32 = 0.01;

/// Default canvas resolution for surfaces without a texture
pub const DEFAULT_CANVAS_SIZE: u32 = 1024;

/// Maximum raycast distance in world units
pub const DEFAULT_RAYCAST_MAX_DISTANCE: f32 = 100.0;

/// Turntable speed in degrees per pointer axis unit per second
pub const DEFAULT_TURNTABLE_SPEED: f32 = 200.0;

/// Pointer axis units per viewport pixel
pub const DEFAULT_POINTER_SENSITIVITY: f32 = 0.1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Sculpt brush defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SculptConfig {
    pub radius: f32,
    pub strength: f32,
    pub hardness: f32,
    pub carve_rate: f32,
    pub drag_damping: f32,
}

impl Default for SculptConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_SCULPT_RADIUS,
            strength: DEFAULT_SCULPT_STRENGTH,
            hardness: DEFAULT_SCULPT_HARDNESS,
            carve_rate: DEFAULT_CARVE_RATE,
            drag_damping: DEFAULT_DRAG_DAMPING,
        }
    }
}

/// Texture brush defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    /// Radius in canvas pixels
    pub radius_pixels: f32,
    pub flow: f32,
    pub hardness: f32,
    pub color: [f32; 4],
    pub stamp_rotation_step: f32,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            radius_pixels: DEFAULT_PAINT_RADIUS_PIXELS,
            flow: DEFAULT_PAINT_FLOW,
            hardness: DEFAULT_PAINT_HARDNESS,
            color: DEFAULT_PAINT_COLOR,
            stamp_rotation_step: DEFAULT_STAMP_ROTATION_STEP,
        }
    }
}

/// Brush preview sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub show: bool,
    pub base_size: f32,
    pub reference_radius_pixels: f32,
    pub surface_offset: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            show: true,
            base_size: DEFAULT_PREVIEW_BASE_SIZE,
            reference_radius_pixels: DEFAULT_REFERENCE_RADIUS_PIXELS,
            surface_offset: DEFAULT_PREVIEW_SURFACE_OFFSET,
        }
    }
}

/// Resolution of canvases created without a source texture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
        }
    }
}

/// Pointer and camera interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub raycast_max_distance: f32,
    pub turntable_speed: f32,
    /// Scales viewport pixels into pointer axis units
    pub pointer_sensitivity: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            raycast_max_distance: DEFAULT_RAYCAST_MAX_DISTANCE,
            turntable_speed: DEFAULT_TURNTABLE_SPEED,
            pointer_sensitivity: DEFAULT_POINTER_SENSITIVITY,
        }
    }
}

/// Complete workbench configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub sculpt: SculptConfig,
    pub paint: PaintConfig,
    pub preview: PreviewConfig,
    pub canvas: CanvasConfig,
    pub interaction: InteractionConfig,
}

impl WorkbenchConfig {
    /// Parse a JSON document. Missing sections and fields use defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkbenchConfig::default();
        assert_eq!(config.sculpt.radius, DEFAULT_SCULPT_RADIUS);
        assert_eq!(config.sculpt.strength, 0.1);
        assert_eq!(config.sculpt.carve_rate, 5.0);
        assert_eq!(config.paint.radius_pixels, 25.0);
        assert_eq!(config.paint.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(config.canvas.width, 1024);
        assert_eq!(config.interaction.raycast_max_distance, 100.0);
        assert_eq!(config.interaction.turntable_speed, 200.0);
        assert_eq!(config.interaction.pointer_sensitivity, 0.1);
        assert!(config.preview.show);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorkbenchConfig::from_json_str(
            r#"{ "sculpt": { "radius": 1.5 }, "canvas": { "width": 512 } }"#,
        )
        .unwrap();
        assert_eq!(config.sculpt.radius, 1.5);
        assert_eq!(config.sculpt.strength, DEFAULT_SCULPT_STRENGTH);
        assert_eq!(config.canvas.width, 512);
        assert_eq!(config.canvas.height, DEFAULT_CANVAS_SIZE);
        assert_eq!(config.paint, PaintConfig::default());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = WorkbenchConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WorkbenchConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = WorkbenchConfig::default();
        config.paint.flow = 0.75;
        config.preview.show = false;
        let json = config.to_json_string().unwrap();
        assert_eq!(WorkbenchConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = WorkbenchConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = WorkbenchConfig::load("/nonexistent/chisel.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
