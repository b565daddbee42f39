/// Side length of the procedural soft-round brush image.
pub const DEFAULT_BRUSH_TEXTURE_SIZE: u32 = 128;

/// Fade ranges below this are treated as a hard step.
pub const FADE_EPSILON: f32 = 0.001;

/// UV triangle areas below this are treated as a degenerate mapping.
pub const UV_AREA_EPSILON: f32 = 1e-6;

/// Opaque white, the fill for fresh and substituted canvases.
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
