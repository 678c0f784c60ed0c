//! Bubble positioning - drag application, edge snapping, resizing
//!
//! Position is unconstrained while a drag is active so the bubble tracks
//! the finger responsively; snapping and resizing re-establish the
//! on-screen invariants afterwards.

use crate::bubble::BubbleState;

/// Display area the bubble lives in. Refreshed on orientation or
/// metrics changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub width: f64,
    pub height: f64,
}

impl ScreenBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which screen edge the bubble last snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapEdge {
    Left,
    Right,
}

/// Owns screen bounds, the drag origin, and the last snap decision
pub struct PositionController {
    bounds: ScreenBounds,
    /// Bubble position when the current press went down
    drag_origin: Option<(f64, f64)>,
    snapped: Option<SnapEdge>,
}

impl PositionController {
    pub fn new(bounds: ScreenBounds) -> Self {
        Self {
            bounds,
            drag_origin: None,
            snapped: None,
        }
    }

    pub fn snapped_edge(&self) -> Option<SnapEdge> {
        self.snapped
    }

    /// Record the bubble position at pointer-down; drag deltas apply
    /// relative to it.
    pub fn begin_drag(&mut self, state: &BubbleState) {
        self.drag_origin = Some((state.x, state.y));
    }

    /// Drop the drag origin without snapping (cancelled touch).
    pub fn abort_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Apply a drag delta. Unconstrained: the bubble may leave the screen
    /// mid-drag. No-op if no drag origin was recorded.
    pub fn drag_to(&mut self, state: &mut BubbleState, dx: f64, dy: f64) {
        if let Some((ox, oy)) = self.drag_origin {
            state.x = ox + dx;
            state.y = oy + dy;
        }
    }

    /// Snap to the nearer vertical screen edge. The choice is a pure
    /// function of the bubble center: left of the midline goes left,
    /// the midline itself and everything right of it goes right.
    /// Idempotent; also clamps y back onto the screen.
    pub fn snap_to_edge(&mut self, state: &mut BubbleState) {
        self.drag_origin = None;

        if state.center_x() < self.bounds.width / 2.0 {
            state.x = 0.0;
            self.snapped = Some(SnapEdge::Left);
        } else {
            state.x = self.bounds.width - state.width;
            self.snapped = Some(SnapEdge::Right);
        }

        state.y = state.y.clamp(0.0, (self.bounds.height - state.height).max(0.0));
    }

    /// Apply a new diameter. Keeps the bubble circular, keeps it fully
    /// on screen, and re-sticks it to the previously snapped edge when
    /// one exists.
    pub fn resize(&mut self, state: &mut BubbleState, diameter: f64) {
        state.width = diameter;
        state.height = diameter;

        match self.snapped {
            Some(SnapEdge::Right) => state.x = self.bounds.width - state.width,
            Some(SnapEdge::Left) => state.x = 0.0,
            None => {
                if state.x > self.bounds.width - state.width {
                    state.x = self.bounds.width - state.width;
                }
            }
        }
        state.x = state.x.max(0.0);

        if state.y > self.bounds.height - state.height {
            state.y = self.bounds.height - state.height;
        }
        state.y = state.y.max(0.0);
    }

    /// Refresh screen bounds (orientation change). A snapped bubble
    /// follows its edge; everything is re-clamped onto the new screen.
    pub fn set_bounds(&mut self, state: &mut BubbleState, bounds: ScreenBounds) {
        self.bounds = bounds;

        match self.snapped {
            Some(SnapEdge::Right) => state.x = bounds.width - state.width,
            Some(SnapEdge::Left) => state.x = 0.0,
            None => state.x = state.x.clamp(0.0, (bounds.width - state.width).max(0.0)),
        }
        state.y = state.y.clamp(0.0, (bounds.height - state.height).max(0.0));
    }
}
