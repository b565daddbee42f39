//! Core sculpting types.

use glam::Vec3;
use painting::{Aabb, Ray, SurfaceHit};
use serde::{Deserialize, Serialize};

/// Type of sculpting deformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SculptMode {
    /// Geometry is left alone
    Disabled = 0,
    /// Push vertices inward along the hit normal
    #[default]
    Carve = 1,
    /// Push vertices outward along the hit normal
    Raise = 2,
    /// Move vertices with the pointer in the view plane
    Drag = 3,
    /// Relax vertices toward their local mean
    Sand = 4,
}

impl SculptMode {
    /// Whether steps in this mode can mutate geometry
    pub fn deforms(&self) -> bool {
        !matches!(self, SculptMode::Disabled)
    }

    /// Carve and Raise share the per-stroke displacement budget
    pub fn is_budgeted(&self) -> bool {
        matches!(self, SculptMode::Carve | SculptMode::Raise)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SculptMode::Disabled => "disabled",
            SculptMode::Carve => "carve",
            SculptMode::Raise => "raise",
            SculptMode::Drag => "drag",
            SculptMode::Sand => "sand",
        }
    }
}

/// Input for one sculpt step.
#[derive(Debug, Clone, Copy)]
pub struct SculptInput {
    /// Surface hit under the pointer this frame
    pub hit: SurfaceHit,
    /// Camera ray through the pointer (world space)
    pub ray: Ray,
    /// Camera forward direction (world space)
    pub view_direction: Vec3,
    /// Frame time in seconds
    pub dt: f32,
}

/// Announced after the surface has been mutated and the proxy resynced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryCommit {
    /// Surface revision after the mutation
    pub revision: u64,
    /// Local-space bounds after the mutation
    pub bounds: Aabb,
    /// Number of vertices that moved
    pub vertices_modified: usize,
}

/// Result of one sculpt step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SculptStepResult {
    /// Vertices inside the brush footprint
    pub vertices_affected: usize,
    /// Present when geometry changed
    pub commit: Option<GeometryCommit>,
}

impl SculptStepResult {
    pub fn is_noop(&self) -> bool {
        self.commit.is_none()
    }
}
