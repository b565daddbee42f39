//! Chisel painting core - surfaces, raycasting and texture canvases
//!
//! This crate provides the shared surface model and the texture painting engine:
//! - [`mesh`] - Triangle surface with fixed topology and a revision counter
//! - [`raycast`] - Collision proxy snapshot and ray/surface intersection
//! - [`falloff`] - Brush influence shared by sculpting and painting
//! - [`projection`] - Pixel-to-world brush size normalization
//! - [`canvas`] - Engine-owned RGBA canvas with brush and stamp compositing
//! - [`stamp`] - Stamp images and bilinear sampling
//! - [`brush`] - Paint brush settings
//! - [`pipeline`] - Hit-to-canvas painting pipeline

pub mod brush;
pub mod canvas;
pub mod constants;
pub mod falloff;
pub mod mesh;
pub mod pipeline;
pub mod projection;
pub mod raycast;
pub mod stamp;
pub mod types;
pub mod validation;

pub use brush::*;
pub use canvas::*;
pub use constants::*;
pub use falloff::*;
pub use mesh::*;
pub use pipeline::*;
pub use projection::*;
pub use raycast::*;
pub use stamp::*;
pub use types::*;
pub use validation::*;
