//! Gesture classification for the bubble
//!
//! Consumes the raw pointer samples of one touch session and resolves them
//! into exactly one terminal intent:
//! - Tap (quick press and release without movement)
//! - Double tap (second down within the double-tap window)
//! - Long press (held without movement past the timeout)
//! - Drag (threshold exceeded; DragMove per sample, DragEnd on release)
//!
//! The long-press timeout is not measured here; the owner schedules a
//! delayed callback and feeds it back via `on_long_press_timeout`. A
//! per-press sequence token makes a stale callback a silent no-op.

use crate::input::PointerSample;

/// Configuration for gesture classification
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Pointer displacement from the press anchor that turns the session
    /// into a drag (px, per axis)
    pub drag_threshold_px: f64,

    /// Time a press must be held without dragging to count as a long press
    pub long_press_timeout_ms: u64,

    /// Maximum gap between a tap-up and the next down for a double tap
    pub double_tap_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 10.0,
            long_press_timeout_ms: 500,
            double_tap_window_ms: 300,
        }
    }
}

/// Classified intent emitted to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Tap,
    DoubleTap,
    LongPress,
    /// Drag in progress; delta is relative to the touch anchor
    DragMove { dx: f64, dy: f64 },
    /// Drag finished; carries the final touch position
    DragEnd { x: f64, y: f64 },
}

/// State of one touch session, created on down and destroyed on up/cancel
#[derive(Debug)]
struct DragSession {
    anchor_x: f64,
    anchor_y: f64,
    down_ms: u64,
    dragging: bool,
    /// Set once a long press fired; the rest of the session classifies
    /// as nothing, though up still closes it
    consumed: bool,
    /// Token matching this press to its scheduled long-press callback
    seq: u64,
}

/// Gesture classifier state machine
///
/// Tie-break rule: drag detection always wins over long-press once the
/// threshold is exceeded, regardless of elapsed time. Movement below the
/// threshold never cancels a pending long press.
pub struct GestureClassifier {
    config: GestureConfig,
    session: Option<DragSession>,
    /// Timestamp of the last tap-up, carried across sessions for
    /// double-tap detection
    last_tap_ms: Option<u64>,
    press_seq: u64,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: None,
            last_tap_ms: None,
            press_seq: 0,
        }
    }

    /// Handle a pointer-down sample.
    ///
    /// A down within the double-tap window of the previous tap-up fires
    /// `DoubleTap` immediately and consumes both taps; no session opens, so
    /// that touch contributes nothing further. Note the first tap's side
    /// effect has already fired by then - a stricter design would buffer
    /// the first up for the window's duration, trading latency for a single
    /// side effect. We keep the immediate-tap behavior.
    pub fn on_down(&mut self, sample: PointerSample) -> Option<GestureEvent> {
        if self.session.is_some() {
            // Down without a closing up for the previous session; ignore.
            tracing::debug!("pointer down while a session is active, ignoring");
            return None;
        }

        if let Some(last) = self.last_tap_ms {
            if sample.t_ms.saturating_sub(last) < self.config.double_tap_window_ms {
                self.last_tap_ms = None;
                return Some(GestureEvent::DoubleTap);
            }
        }

        self.press_seq += 1;
        self.session = Some(DragSession {
            anchor_x: sample.x,
            anchor_y: sample.y,
            down_ms: sample.t_ms,
            dragging: false,
            consumed: false,
            seq: self.press_seq,
        });
        None
    }

    /// Handle a pointer-move sample. Emits `DragMove` on every sample once
    /// the session is dragging, including the one that crosses the
    /// threshold. Moves without a session are ignored.
    pub fn on_move(&mut self, sample: PointerSample) -> Option<GestureEvent> {
        let session = self.session.as_mut()?;
        if session.consumed {
            return None;
        }

        let dx = sample.x - session.anchor_x;
        let dy = sample.y - session.anchor_y;

        if !session.dragging {
            if dx.abs() > self.config.drag_threshold_px
                || dy.abs() > self.config.drag_threshold_px
            {
                session.dragging = true;
            } else {
                return None;
            }
        }

        Some(GestureEvent::DragMove { dx, dy })
    }

    /// Handle a pointer-up sample, closing the session.
    pub fn on_up(&mut self, sample: PointerSample) -> Option<GestureEvent> {
        let session = self.session.take()?;

        if session.dragging {
            return Some(GestureEvent::DragEnd {
                x: sample.x,
                y: sample.y,
            });
        }
        if session.consumed {
            return None;
        }

        self.last_tap_ms = Some(sample.t_ms);
        Some(GestureEvent::Tap)
    }

    /// Handle a cancel: discard the session, emit nothing. The last-tap
    /// timestamp survives, it belongs to the previous completed tap.
    pub fn on_cancel(&mut self) {
        self.session = None;
    }

    /// Deadline and token for the long-press callback of the current press,
    /// or None when no long press is pending (no session, already dragging,
    /// or already fired).
    pub fn long_press_deadline(&self) -> Option<(u64, u64)> {
        let session = self.session.as_ref()?;
        if session.dragging || session.consumed {
            return None;
        }
        Some((
            session.down_ms + self.config.long_press_timeout_ms,
            session.seq,
        ))
    }

    /// Scheduled long-press callback. Fires only if the matching press is
    /// still held without dragging; anything else (stale token, drag in
    /// progress, session gone) is a no-op.
    pub fn on_long_press_timeout(&mut self, seq: u64) -> Option<GestureEvent> {
        let session = self.session.as_mut()?;
        if session.seq != seq || session.dragging || session.consumed {
            return None;
        }
        session.consumed = true;
        Some(GestureEvent::LongPress)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.as_ref().map(|s| s.dragging).unwrap_or(false)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}
