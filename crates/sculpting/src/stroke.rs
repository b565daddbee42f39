//! Per-stroke state: displacement budget and drag anchor.

use glam::Vec3;

/// State tracked during an active stroke.
///
/// `accumulated` is sized once to the surface's vertex count and zeroed at
/// stroke start; it never grows because topology is fixed.
#[derive(Debug, Clone)]
pub struct StrokeState {
    accumulated: Vec<f32>,
    /// Last projected drag point, world space
    anchor: Option<Vec3>,
    active: bool,
}

impl StrokeState {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            accumulated: vec![0.0; vertex_count],
            anchor: None,
            active: false,
        }
    }

    /// Start a stroke: zero the budget and set the anchor.
    pub fn begin(&mut self, anchor: Option<Vec3>) {
        self.accumulated.iter_mut().for_each(|a| *a = 0.0);
        self.anchor = anchor;
        self.active = true;
    }

    /// Stop the stroke. The budget is kept until the next begin.
    pub fn end(&mut self) {
        self.anchor = None;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn anchor(&self) -> Option<Vec3> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = Some(anchor);
    }

    /// Forget the drag anchor but keep the stroke and its budget.
    pub fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// Displacement already spent on a vertex this stroke.
    pub fn accumulated(&self, vertex: usize) -> f32 {
        self.accumulated.get(vertex).copied().unwrap_or(0.0)
    }

    /// Take up to `amount` from the vertex's remaining budget under `limit`.
    ///
    /// Returns the amount granted, 0 once the budget is spent.
    pub fn spend(&mut self, vertex: usize, amount: f32, limit: f32) -> f32 {
        let Some(acc) = self.accumulated.get_mut(vertex) else {
            return 0.0;
        };
        let granted = amount.min(limit - *acc);
        if granted <= 0.0 {
            return 0.0;
        }
        *acc += granted;
        granted
    }
}
