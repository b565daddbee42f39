//! Per-frame pointer and camera sample supplied by the host.

use chisel_config::DEFAULT_POINTER_SENSITIVITY;
use glam::{Vec2, Vec3};
use painting::Ray;

/// Transitions and level of one button for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Went down this frame
    pub pressed: bool,
    /// Is down this frame (includes the pressed frame)
    pub held: bool,
    /// Went up this frame
    pub released: bool,
}

impl ButtonState {
    /// Derive edges from the previous and current level.
    pub fn from_levels(was_down: bool, is_down: bool) -> Self {
        Self {
            pressed: is_down && !was_down,
            held: is_down,
            released: was_down && !is_down,
        }
    }
}

/// Everything the workbench reads from the host in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Viewport position in pixels
    pub position: Vec2,
    /// Motion since the last frame in axis units: viewport pixels times the
    /// pointer sensitivity, with +y pointing up. The turntable speed is in
    /// degrees per axis unit per second.
    pub delta: Vec2,
    pub primary: ButtonState,
    pub secondary: ButtonState,
    /// Scroll wheel delta in notches
    pub scroll: f32,
    /// Camera ray through the pointer, world space
    pub ray: Ray,
    /// Camera forward direction, world space
    pub view_direction: Vec3,
}

impl PointerSample {
    /// A sample with no buttons, motion or scroll.
    pub fn idle(ray: Ray, view_direction: Vec3) -> Self {
        Self {
            position: Vec2::ZERO,
            delta: Vec2::ZERO,
            primary: ButtonState::default(),
            secondary: ButtonState::default(),
            scroll: 0.0,
            ray,
            view_direction,
        }
    }
}

/// Tracks button levels across frames and produces edge-aware samples.
#[derive(Debug, Clone, Copy)]
pub struct PointerTracker {
    /// Axis units per viewport pixel
    sensitivity: f32,
    primary_down: bool,
    secondary_down: bool,
    last_position: Option<Vec2>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_POINTER_SENSITIVITY)
    }
}

impl PointerTracker {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            primary_down: false,
            secondary_down: false,
            last_position: None,
        }
    }


    /// Build this frame's sample from raw button levels and pointer position.
    pub fn sample(
        &mut self,
        position: Vec2,
        primary_down: bool,
        secondary_down: bool,
        scroll: f32,
        ray: Ray,
        view_direction: Vec3,
    ) -> PointerSample {
        // Viewport y grows downward
        let delta = self.last_position.map_or(Vec2::ZERO, |last| {
            let moved = position - last;
            Vec2::new(moved.x, -moved.y) * self.sensitivity
        });
        let sample = PointerSample {
            position,
            delta,
            primary: ButtonState::from_levels(self.primary_down, primary_down),
            secondary: ButtonState::from_levels(self.secondary_down, secondary_down),
            scroll,
            ray,
            view_direction,
        };
        self.primary_down = primary_down;
        self.secondary_down = secondary_down;
        self.last_position = Some(position);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_edges() {
        assert_eq!(
            ButtonState::from_levels(false, true),
            ButtonState {
                pressed: true,
                held: true,
                released: false
            }
        );
        assert_eq!(
            ButtonState::from_levels(true, false),
            ButtonState {
                pressed: false,
                held: false,
                released: true
            }
        );
        assert_eq!(ButtonState::from_levels(false, false), ButtonState::default());
    }

    #[test]
    fn test_tracker_deltas_and_edges() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut tracker = PointerTracker::new(0.5);

        let first = tracker.sample(Vec2::new(10.0, 10.0), true, false, 0.0, ray, Vec3::NEG_Z);
        assert_eq!(first.delta, Vec2::ZERO);
        assert!(first.primary.pressed);

        let second = tracker.sample(Vec2::new(13.0, 8.0), true, false, 0.0, ray, Vec3::NEG_Z);
        assert_eq!(second.delta, Vec2::new(1.5, 1.0));
        assert!(!second.primary.pressed);
        assert!(second.primary.held);

        let third = tracker.sample(Vec2::new(13.0, 8.0), false, false, 0.0, ray, Vec3::NEG_Z);
        assert!(third.primary.released);
    }
}
