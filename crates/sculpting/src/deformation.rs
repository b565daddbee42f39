//! Vertex deformation algorithms for sculpting.
//!
//! All functions work on local-space positions of a single surface. The
//! footprint is gathered once per step and shared by the operators. Each
//! operator returns the number of vertices it moved.

use glam::Vec3;
use painting::Falloff;

use crate::stroke::StrokeState;

/// A vertex inside the brush footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffectedVertex {
    pub index: usize,
    /// Falloff influence, 0..1
    pub influence: f32,
}

/// Collect vertices within the brush radius of `center`.
pub fn gather_affected(positions: &[Vec3], center: Vec3, falloff: Falloff) -> Vec<AffectedVertex> {
    positions
        .iter()
        .enumerate()
        .filter_map(|(index, p)| {
            let distance = p.distance(center);
            falloff.contains(distance).then(|| AffectedVertex {
                index,
                influence: falloff.at(distance),
            })
        })
        .collect()
}

/// Carve/Raise: move vertices along `direction`, limited by the stroke budget.
///
/// Every vertex in the footprint, rim included, takes
/// `min(step, strength - accumulated)` per call regardless of its influence,
/// so total displacement within a stroke never exceeds `strength`.
pub fn apply_budgeted_offset(
    positions: &mut [Vec3],
    affected: &[AffectedVertex],
    direction: Vec3,
    step: f32,
    strength: f32,
    stroke: &mut StrokeState,
) -> usize {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO || step <= 0.0 {
        return 0;
    }

    let mut moved = 0;
    for vertex in affected {
        let granted = stroke.spend(vertex.index, step, strength);
        if granted > 0.0 {
            positions[vertex.index] += direction * granted;
            moved += 1;
        }
    }
    moved
}

/// Drag: translate vertices by `delta * influence * damping`.
pub fn apply_drag(
    positions: &mut [Vec3],
    affected: &[AffectedVertex],
    delta: Vec3,
    damping: f32,
) -> usize {
    let mut moved = 0;
    for vertex in affected {
        let weight = vertex.influence * damping;
        if weight <= 0.0 {
            continue;
        }
        positions[vertex.index] += delta * weight;
        moved += 1;
    }
    moved
}

/// Sand: relax vertices toward the mean of the footprint.
///
/// Two-pass: the mean and all targets are computed before any vertex moves,
/// so the result does not depend on iteration order.
pub fn apply_sand(positions: &mut [Vec3], affected: &[AffectedVertex], strength: f32) -> usize {
    if affected.is_empty() {
        return 0;
    }

    let sum: Vec3 = affected.iter().map(|v| positions[v.index]).sum();
    let mean = sum / affected.len() as f32;

    // First pass: calculate target positions without modifying
    let targets: Vec<(usize, Vec3)> = affected
        .iter()
        .filter_map(|v| {
            let t = (strength * v.influence).clamp(0.0, 1.0);
            (t > 0.0).then(|| (v.index, positions[v.index].lerp(mean, t)))
        })
        .collect();

    // Second pass: apply all modifications
    for &(index, target) in &targets {
        positions[index] = target;
    }
    targets.len()
}
