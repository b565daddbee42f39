//! Chisel workbench - the host-facing sculpting and painting session
//!
//! The host feeds one [`PointerSample`] per frame into [`Workbench::step`] and
//! receives mutations through [`SurfaceHost`]. Logging goes through `tracing`;
//! installing a subscriber is left to the host.

pub mod error;
pub mod pointer;
pub mod preview;
pub mod session;
pub mod turntable;

pub use error::WorkbenchError;
pub use pointer::{ButtonState, PointerSample, PointerTracker};
pub use preview::{BrushPreview, PreviewTexture, SculptCursor};
pub use session::{FrameReport, ReleasedSurface, SurfaceHost, Workbench};
pub use turntable::Turntable;

pub use chisel_config::WorkbenchConfig;
pub use painting;
pub use sculpting;
