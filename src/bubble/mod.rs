//! The bubble - state, positioning, visibility, and orchestration
//!
//! This module provides:
//! - BubbleState: the single authoritative copy of the control's geometry
//!   and visual state
//! - PositionController: drag application, edge snapping, resizing
//! - VisibilityTimer: idle fade-out with generation-guarded cancellation
//! - BubbleController: wires classification to side effects

pub mod controller;
pub mod position;
pub mod visibility;

pub use controller::BubbleController;
pub use position::{PositionController, ScreenBounds};
pub use visibility::{VisibilityConfig, VisibilityTimer};

/// Authoritative in-memory state of the bubble. The rendering surface is
/// only ever a reflection of this; a failed host call leaves it untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleState {
    /// Top-left corner in screen coordinates
    pub x: f64,
    pub y: f64,
    /// The control is circular: width == height == diameter
    pub width: f64,
    pub height: f64,
    /// Current opacity, 0.0..=1.0
    pub opacity: f64,
    /// Dimmed idle state after the inactivity interval
    pub collapsed: bool,
}

impl BubbleState {
    pub fn new(x: f64, y: f64, diameter: f64) -> Self {
        Self {
            x,
            y,
            width: diameter,
            height: diameter,
            opacity: 1.0,
            collapsed: false,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bubble_is_circular_and_visible() {
        let state = BubbleState::new(100.0, 300.0, 56.0);
        assert_eq!(state.width, state.height);
        assert_eq!(state.opacity, 1.0);
        assert!(!state.collapsed);
        assert_eq!(state.center_x(), 128.0);
    }
}
