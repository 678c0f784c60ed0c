//! Idle fade-out for the bubble
//!
//! A single delayed fade: after `hide_delay_ms` without interaction the
//! bubble dims to `dim_opacity`; any interaction restores full opacity and
//! re-arms the delay. Cancellation is by generation token - every reset
//! bumps the generation, so a previously scheduled callback that fires
//! late finds a stale token and does nothing. The same guard makes a
//! callback landing after teardown a silent no-op.

use crate::bubble::BubbleState;

#[derive(Debug, Clone)]
pub struct VisibilityConfig {
    /// Inactivity interval before the bubble dims
    pub hide_delay_ms: u64,
    /// Opacity of the dimmed (collapsed) state
    pub dim_opacity: f64,
    /// Fade duration towards the dimmed state
    pub fade_out_ms: u64,
    /// Fade duration back to full opacity (kept short so the bubble feels
    /// immediately responsive)
    pub fade_in_ms: u64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            hide_delay_ms: 2500,
            dim_opacity: 0.25,
            fade_out_ms: 300,
            fade_in_ms: 200,
        }
    }
}

/// An opacity transition for the overlay host to animate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityChange {
    pub opacity: f64,
    pub fade_ms: u64,
}

/// Single-shot cancellable idle fade
pub struct VisibilityTimer {
    config: VisibilityConfig,
    generation: u64,
    deadline_ms: Option<u64>,
    cancelled: bool,
}

impl VisibilityTimer {
    pub fn new(config: VisibilityConfig) -> Self {
        Self {
            config,
            generation: 0,
            deadline_ms: None,
            cancelled: false,
        }
    }

    /// Cancel any pending fade, restore full opacity if dimmed, and
    /// schedule a fresh fade after the inactivity interval. Returns the
    /// opacity transition the host should animate, if any.
    pub fn reset(&mut self, state: &mut BubbleState, now_ms: u64) -> Option<OpacityChange> {
        if self.cancelled {
            return None;
        }

        self.generation += 1;
        self.deadline_ms = Some(now_ms + self.config.hide_delay_ms);

        if state.collapsed {
            state.collapsed = false;
            state.opacity = 1.0;
            Some(OpacityChange {
                opacity: 1.0,
                fade_ms: self.config.fade_in_ms,
            })
        } else {
            None
        }
    }

    /// The scheduled callback. Dims the bubble only if the token still
    /// matches the latest reset; a stale or post-teardown invocation does
    /// nothing and never errors.
    pub fn fire_if_still_idle(
        &mut self,
        state: &mut BubbleState,
        generation: u64,
    ) -> Option<OpacityChange> {
        if self.cancelled || generation != self.generation || self.deadline_ms.is_none() {
            return None;
        }

        self.deadline_ms = None;
        state.opacity = self.config.dim_opacity;
        state.collapsed = true;
        Some(OpacityChange {
            opacity: self.config.dim_opacity,
            fade_ms: self.config.fade_out_ms,
        })
    }

    /// Pending deadline and its token, for the owner to arm a delayed
    /// callback against.
    pub fn deadline(&self) -> Option<(u64, u64)> {
        self.deadline_ms.map(|d| (d, self.generation))
    }

    /// Teardown: no further fade fires, every later invocation is a no-op.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.deadline_ms = None;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> VisibilityTimer {
        VisibilityTimer::new(VisibilityConfig::default())
    }

    #[test]
    fn test_reset_schedules_fade() {
        let mut t = timer();
        let mut state = BubbleState::new(0.0, 0.0, 56.0);
        assert_eq!(t.reset(&mut state, 1000), None);
        let (deadline, gen) = t.deadline().unwrap();
        assert_eq!(deadline, 3500);
        let change = t.fire_if_still_idle(&mut state, gen).unwrap();
        assert_eq!(change.opacity, 0.25);
        assert_eq!(change.fade_ms, 300);
        assert!(state.collapsed);
        assert_eq!(state.opacity, 0.25);
    }

    #[test]
    fn test_reset_supersedes_pending_fade() {
        let mut t = timer();
        let mut state = BubbleState::new(0.0, 0.0, 56.0);
        t.reset(&mut state, 0);
        let (_, old_gen) = t.deadline().unwrap();
        // Interaction before the delay elapses
        t.reset(&mut state, 1000);
        // The superseded callback lands late and must not dim
        assert_eq!(t.fire_if_still_idle(&mut state, old_gen), None);
        assert!(!state.collapsed);
        // The fresh one still fires
        let (_, gen) = t.deadline().unwrap();
        assert!(t.fire_if_still_idle(&mut state, gen).is_some());
    }

    #[test]
    fn test_fade_fires_exactly_once() {
        let mut t = timer();
        let mut state = BubbleState::new(0.0, 0.0, 56.0);
        t.reset(&mut state, 0);
        let (_, gen) = t.deadline().unwrap();
        assert!(t.fire_if_still_idle(&mut state, gen).is_some());
        assert_eq!(t.fire_if_still_idle(&mut state, gen), None);
    }

    #[test]
    fn test_reset_restores_opacity_when_dimmed() {
        let mut t = timer();
        let mut state = BubbleState::new(0.0, 0.0, 56.0);
        t.reset(&mut state, 0);
        let (_, gen) = t.deadline().unwrap();
        t.fire_if_still_idle(&mut state, gen);
        assert!(state.collapsed);

        let change = t.reset(&mut state, 5000).unwrap();
        assert_eq!(change.opacity, 1.0);
        assert_eq!(change.fade_ms, 200);
        assert!(!state.collapsed);
        assert_eq!(state.opacity, 1.0);
    }

    #[test]
    fn test_reset_while_visible_reports_no_transition() {
        let mut t = timer();
        let mut state = BubbleState::new(0.0, 0.0, 56.0);
        assert_eq!(t.reset(&mut state, 0), None);
        assert_eq!(t.reset(&mut state, 100), None);
    }

    #[test]
    fn test_cancelled_timer_is_inert() {
        let mut t = timer();
        let mut state = BubbleState::new(0.0, 0.0, 56.0);
        t.reset(&mut state, 0);
        let (_, gen) = t.deadline().unwrap();
        t.cancel();
        assert_eq!(t.fire_if_still_idle(&mut state, gen), None);
        assert_eq!(t.reset(&mut state, 100), None);
        assert_eq!(t.deadline(), None);
        assert!(!state.collapsed);
    }
}
