//! Mesh sculpting for Chisel.
//!
//! This crate deforms the vertex buffer of a single bound surface:
//! - Carve/Raise along the hit normal, bounded by a per-stroke budget
//! - Drag vertices with the pointer in the camera's view plane
//! - Sand vertices toward the local mean
//!
//! ## Key Components
//!
//! - **Types**: Modes, step input and commit reports
//! - **Brush**: Radius, strength, hardness and rate settings
//! - **Stroke**: Per-vertex budget and drag anchor
//! - **Deformation**: Vertex displacement algorithms
//! - **Pipeline**: The engine that owns the surface and keeps its collision proxy in sync

pub mod brush;
pub mod deformation;
pub mod pipeline;
pub mod stroke;
pub mod types;

pub use brush::SculptBrush;
pub use pipeline::{SculptEngine, SculptError};
pub use stroke::StrokeState;
pub use types::{GeometryCommit, SculptInput, SculptMode, SculptStepResult};
