//! Bubble orchestration - classified intents to side effects
//!
//! Receives raw pointer samples, runs them through the gesture classifier,
//! and dispatches the resulting intents:
//! - Tap: reveal when dimmed, otherwise bring up the volume display
//! - Double tap: toggle mute
//! - Long press: open the settings surface
//! - Drag: move the bubble, snap to the nearer edge on release
//!
//! Every intent re-arms the idle fade, except per-sample drag moves
//! (the fade is reset once at drag start and again at drag end).

use crate::bubble::position::PositionController;
use crate::bubble::visibility::VisibilityTimer;
use crate::bubble::{BubbleState, ScreenBounds, VisibilityConfig};
use crate::input::gestures::{GestureClassifier, GestureConfig, GestureEvent};
use crate::input::{PointerPhase, PointerSample};
use crate::overlay::{OverlayError, OverlayHost};
use crate::system::{SettingsLaunch, VolumeControl};

/// Log-and-ignore for overlay host calls; in-memory state stays
/// authoritative and the next successful call re-syncs the surface.
fn host_try(what: &str, result: Result<(), OverlayError>) {
    if let Err(e) = result {
        tracing::warn!("overlay {} failed, keeping in-memory state: {}", what, e);
    }
}

pub struct BubbleController {
    state: BubbleState,
    classifier: GestureClassifier,
    position: PositionController,
    visibility: VisibilityTimer,
    host: Box<dyn OverlayHost>,
    volume: Box<dyn VolumeControl>,
    settings: Box<dyn SettingsLaunch>,
    /// True between the first DragMove of a session and its DragEnd;
    /// gates the once-per-drag visibility reset
    drag_active: bool,
    torn_down: bool,
}

impl BubbleController {
    pub fn new(
        state: BubbleState,
        bounds: ScreenBounds,
        gestures: GestureConfig,
        visibility: VisibilityConfig,
        host: Box<dyn OverlayHost>,
        volume: Box<dyn VolumeControl>,
        settings: Box<dyn SettingsLaunch>,
    ) -> Self {
        Self {
            state,
            classifier: GestureClassifier::new(gestures),
            position: PositionController::new(bounds),
            visibility: VisibilityTimer::new(visibility),
            host,
            volume,
            settings,
            drag_active: false,
            torn_down: false,
        }
    }

    /// Attach the overlay surface and arm the initial idle fade.
    pub fn start(&mut self, now_ms: u64) {
        host_try("attach", self.host.attach(&self.state));
        self.reset_visibility(now_ms);
    }

    /// Feed one raw pointer sample through classification.
    pub fn handle_pointer(&mut self, phase: PointerPhase, sample: PointerSample) {
        if self.torn_down {
            return;
        }

        match phase {
            PointerPhase::Down => {
                let had_session = self.classifier.has_session();
                let event = self.classifier.on_down(sample);
                if !had_session && self.classifier.has_session() {
                    // Fresh session: remember where the bubble was so drag
                    // deltas apply against it
                    self.position.begin_drag(&self.state);
                }
                if let Some(event) = event {
                    self.apply(event, sample.t_ms);
                }
            }
            PointerPhase::Move => {
                if let Some(event) = self.classifier.on_move(sample) {
                    self.apply(event, sample.t_ms);
                }
            }
            PointerPhase::Up => {
                if let Some(event) = self.classifier.on_up(sample) {
                    self.apply(event, sample.t_ms);
                }
            }
            PointerPhase::Cancel => {
                if self.classifier.is_dragging() {
                    tracing::debug!("touch cancelled mid-drag, leaving bubble in place");
                }
                self.classifier.on_cancel();
                self.position.abort_drag();
                self.drag_active = false;
            }
        }
    }

    fn apply(&mut self, event: GestureEvent, now_ms: u64) {
        match event {
            GestureEvent::Tap => {
                let was_collapsed = self.state.collapsed;
                self.reset_visibility(now_ms);
                if !was_collapsed {
                    self.volume.show_volume_ui();
                }
                // A tap on the dimmed bubble only reveals it
            }
            GestureEvent::DoubleTap => {
                self.reset_visibility(now_ms);
                self.volume.toggle_mute();
            }
            GestureEvent::LongPress => {
                self.reset_visibility(now_ms);
                self.settings.open_settings();
            }
            GestureEvent::DragMove { dx, dy } => {
                if !self.drag_active {
                    self.drag_active = true;
                    self.reset_visibility(now_ms);
                }
                self.position.drag_to(&mut self.state, dx, dy);
                host_try(
                    "position update",
                    self.host.update_position(self.state.x, self.state.y),
                );
            }
            GestureEvent::DragEnd { .. } => {
                self.drag_active = false;
                self.position.snap_to_edge(&mut self.state);
                host_try(
                    "position update",
                    self.host.update_position(self.state.x, self.state.y),
                );
                self.reset_visibility(now_ms);
            }
        }
    }

    fn reset_visibility(&mut self, now_ms: u64) {
        if let Some(change) = self.visibility.reset(&mut self.state, now_ms) {
            host_try(
                "opacity update",
                self.host.update_opacity(change.opacity, change.fade_ms),
            );
        }
    }

    /// Scheduled long-press callback; stale tokens are no-ops.
    pub fn on_long_press_timeout(&mut self, seq: u64, now_ms: u64) {
        if self.torn_down {
            return;
        }
        if let Some(event) = self.classifier.on_long_press_timeout(seq) {
            self.apply(event, now_ms);
        }
    }

    /// Scheduled idle-fade callback; stale tokens are no-ops.
    pub fn on_hide_timeout(&mut self, generation: u64) {
        if self.torn_down {
            return;
        }
        if let Some(change) = self.visibility.fire_if_still_idle(&mut self.state, generation) {
            host_try(
                "opacity update",
                self.host.update_opacity(change.opacity, change.fade_ms),
            );
        }
    }

    /// Size-preference push: apply a new diameter, independent of gesture
    /// state.
    pub fn resize(&mut self, diameter: f64) {
        if self.torn_down || diameter <= 0.0 {
            return;
        }
        self.position.resize(&mut self.state, diameter);
        host_try(
            "size update",
            self.host.update_size(self.state.width, self.state.height),
        );
        host_try(
            "position update",
            self.host.update_position(self.state.x, self.state.y),
        );
    }

    /// Screen-metrics push (orientation change).
    pub fn set_screen_bounds(&mut self, bounds: ScreenBounds) {
        if self.torn_down {
            return;
        }
        self.position.set_bounds(&mut self.state, bounds);
        host_try(
            "position update",
            self.host.update_position(self.state.x, self.state.y),
        );
    }

    pub fn long_press_deadline(&self) -> Option<(u64, u64)> {
        self.classifier.long_press_deadline()
    }

    pub fn hide_deadline(&self) -> Option<(u64, u64)> {
        self.visibility.deadline()
    }

    pub fn state(&self) -> &BubbleState {
        &self.state
    }

    /// Best-effort teardown: disarm the long-press classification, cancel
    /// the idle fade, then release the surface. Each step tolerates the
    /// others failing; callbacks landing afterwards are no-ops.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.classifier.on_cancel();
        self.visibility.cancel();
        if let Err(e) = self.host.detach() {
            tracing::warn!("overlay detach failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        volume_ui: usize,
        mute: usize,
        settings: usize,
        host: Vec<String>,
    }

    struct TestHost {
        log: Rc<RefCell<Recorded>>,
        fail: bool,
    }

    impl OverlayHost for TestHost {
        fn attach(&mut self, _state: &BubbleState) -> Result<(), OverlayError> {
            if self.fail {
                return Err(OverlayError::NotAttached);
            }
            self.log.borrow_mut().host.push("attach".into());
            Ok(())
        }
        fn update_position(&mut self, x: f64, y: f64) -> Result<(), OverlayError> {
            if self.fail {
                return Err(OverlayError::NotAttached);
            }
            self.log.borrow_mut().host.push(format!("pos {} {}", x, y));
            Ok(())
        }
        fn update_size(&mut self, w: f64, h: f64) -> Result<(), OverlayError> {
            if self.fail {
                return Err(OverlayError::NotAttached);
            }
            self.log.borrow_mut().host.push(format!("size {} {}", w, h));
            Ok(())
        }
        fn update_opacity(&mut self, opacity: f64, _fade_ms: u64) -> Result<(), OverlayError> {
            if self.fail {
                return Err(OverlayError::NotAttached);
            }
            self.log
                .borrow_mut()
                .host
                .push(format!("opacity {}", opacity));
            Ok(())
        }
        fn detach(&mut self) -> Result<(), OverlayError> {
            if self.fail {
                return Err(OverlayError::NotAttached);
            }
            self.log.borrow_mut().host.push("detach".into());
            Ok(())
        }
    }

    struct TestVolume(Rc<RefCell<Recorded>>);
    impl VolumeControl for TestVolume {
        fn show_volume_ui(&mut self) {
            self.0.borrow_mut().volume_ui += 1;
        }
        fn toggle_mute(&mut self) {
            self.0.borrow_mut().mute += 1;
        }
    }

    struct TestSettings(Rc<RefCell<Recorded>>);
    impl SettingsLaunch for TestSettings {
        fn open_settings(&mut self) {
            self.0.borrow_mut().settings += 1;
        }
    }

    fn controller_with(
        state: BubbleState,
        bounds: ScreenBounds,
        fail_host: bool,
    ) -> (BubbleController, Rc<RefCell<Recorded>>) {
        let log = Rc::new(RefCell::new(Recorded::default()));
        let controller = BubbleController::new(
            state,
            bounds,
            GestureConfig::default(),
            VisibilityConfig::default(),
            Box::new(TestHost {
                log: log.clone(),
                fail: fail_host,
            }),
            Box::new(TestVolume(log.clone())),
            Box::new(TestSettings(log.clone())),
        );
        (controller, log)
    }

    fn controller() -> (BubbleController, Rc<RefCell<Recorded>>) {
        controller_with(
            BubbleState::new(100.0, 100.0, 50.0),
            ScreenBounds::new(400.0, 800.0),
            false,
        )
    }

    fn down(c: &mut BubbleController, x: f64, y: f64, t: u64) {
        c.handle_pointer(PointerPhase::Down, PointerSample::new(x, y, t));
    }
    fn mv(c: &mut BubbleController, x: f64, y: f64, t: u64) {
        c.handle_pointer(PointerPhase::Move, PointerSample::new(x, y, t));
    }
    fn up(c: &mut BubbleController, x: f64, y: f64, t: u64) {
        c.handle_pointer(PointerPhase::Up, PointerSample::new(x, y, t));
    }

    #[test]
    fn test_tap_shows_volume_ui() {
        let (mut c, log) = controller();
        down(&mut c, 0.0, 0.0, 0);
        up(&mut c, 0.0, 0.0, 50);
        assert_eq!(log.borrow().volume_ui, 1);
        assert_eq!(log.borrow().mute, 0);
        assert!(c.hide_deadline().is_some());
    }

    #[test]
    fn test_tap_on_dimmed_bubble_only_reveals() {
        let (mut c, log) = controller();
        c.start(0);
        let (_, generation) = c.hide_deadline().unwrap();
        c.on_hide_timeout(generation);
        assert!(c.state().collapsed);

        down(&mut c, 0.0, 0.0, 3000);
        up(&mut c, 0.0, 0.0, 3050);
        assert!(!c.state().collapsed);
        assert_eq!(c.state().opacity, 1.0);
        // Reveal only, no volume action
        assert_eq!(log.borrow().volume_ui, 0);
        assert!(log
            .borrow()
            .host
            .iter()
            .any(|h| h == "opacity 1"));
    }

    #[test]
    fn test_double_tap_toggles_mute() {
        let (mut c, log) = controller();
        down(&mut c, 0.0, 0.0, 0);
        up(&mut c, 0.0, 0.0, 50);
        down(&mut c, 0.0, 0.0, 200);
        up(&mut c, 0.0, 0.0, 260);
        // Immediate-tap behavior: the first tap's side effect fired too
        assert_eq!(log.borrow().volume_ui, 1);
        assert_eq!(log.borrow().mute, 1);
    }

    #[test]
    fn test_long_press_opens_settings() {
        let (mut c, log) = controller();
        down(&mut c, 0.0, 0.0, 0);
        let (deadline, seq) = c.long_press_deadline().unwrap();
        c.on_long_press_timeout(seq, deadline);
        assert_eq!(log.borrow().settings, 1);
        up(&mut c, 0.0, 0.0, 650);
        // No tap after the long press consumed the session
        assert_eq!(log.borrow().volume_ui, 0);
    }

    #[test]
    fn test_drag_moves_then_snaps_left() {
        let (mut c, log) = controller();
        down(&mut c, 100.0, 100.0, 0);
        mv(&mut c, 130.0, 100.0, 50);
        assert_eq!((c.state().x, c.state().y), (130.0, 100.0));
        up(&mut c, 130.0, 100.0, 100);
        // center was 155 < 200: snaps to the left edge
        assert_eq!(c.state().x, 0.0);
        assert_eq!(c.state().y, 100.0);
        let recorded = log.borrow();
        assert!(recorded.host.iter().any(|h| h == "pos 130 100"));
        assert!(recorded.host.iter().any(|h| h == "pos 0 100"));
        // A drag is never a tap
        assert_eq!(recorded.volume_ui, 0);
    }

    #[test]
    fn test_drag_resets_visibility_at_start_and_end_only() {
        let (mut c, _log) = controller();
        down(&mut c, 100.0, 100.0, 0);
        mv(&mut c, 130.0, 100.0, 50);
        let after_start = c.hide_deadline().unwrap();
        assert_eq!(after_start.0, 50 + 2500);
        mv(&mut c, 140.0, 100.0, 80);
        mv(&mut c, 150.0, 100.0, 90);
        // Mid-drag samples do not thrash the timer
        assert_eq!(c.hide_deadline().unwrap(), after_start);
        up(&mut c, 150.0, 100.0, 120);
        assert_eq!(c.hide_deadline().unwrap().0, 120 + 2500);
    }

    #[test]
    fn test_drag_restores_opacity_on_first_move() {
        let (mut c, log) = controller();
        c.start(0);
        let (_, generation) = c.hide_deadline().unwrap();
        c.on_hide_timeout(generation);
        assert!(c.state().collapsed);

        down(&mut c, 100.0, 100.0, 3000);
        mv(&mut c, 130.0, 100.0, 3050);
        assert!(!c.state().collapsed);
        assert!(log.borrow().host.iter().any(|h| h == "opacity 1"));
    }

    #[test]
    fn test_hide_timeout_dims_once() {
        let (mut c, log) = controller();
        c.start(0);
        let (deadline, generation) = c.hide_deadline().unwrap();
        assert_eq!(deadline, 2500);
        c.on_hide_timeout(generation);
        assert!(c.state().collapsed);
        assert_eq!(c.state().opacity, 0.25);
        assert!(log.borrow().host.iter().any(|h| h == "opacity 0.25"));
        // Stale re-fire is a no-op
        c.on_hide_timeout(generation);
        assert_eq!(
            log.borrow()
                .host
                .iter()
                .filter(|h| h.as_str() == "opacity 0.25")
                .count(),
            1
        );
    }

    #[test]
    fn test_interaction_supersedes_pending_fade() {
        let (mut c, _log) = controller();
        c.start(0);
        let (_, old_generation) = c.hide_deadline().unwrap();
        down(&mut c, 0.0, 0.0, 1000);
        up(&mut c, 0.0, 0.0, 1050);
        c.on_hide_timeout(old_generation);
        assert!(!c.state().collapsed);
    }

    #[test]
    fn test_cancel_discards_drag_without_snap() {
        let (mut c, log) = controller();
        down(&mut c, 100.0, 100.0, 0);
        mv(&mut c, 180.0, 100.0, 50);
        c.handle_pointer(PointerPhase::Cancel, PointerSample::new(180.0, 100.0, 60));
        // Bubble stays where the drag left it; no snap, no side effects
        assert_eq!(c.state().x, 180.0);
        assert_eq!(log.borrow().volume_ui, 0);
        up(&mut c, 180.0, 100.0, 70);
        assert_eq!(log.borrow().volume_ui, 0);
    }

    #[test]
    fn test_resize_updates_host_and_clamps() {
        let (mut c, log) = controller_with(
            BubbleState::new(360.0, 100.0, 40.0),
            ScreenBounds::new(400.0, 800.0),
            false,
        );
        c.resize(72.0);
        assert_eq!(c.state().width, 72.0);
        assert!(c.state().x + c.state().width <= 400.0);
        assert!(log.borrow().host.iter().any(|h| h == "size 72 72"));
    }

    #[test]
    fn test_host_failure_keeps_state_authoritative() {
        let (mut c, log) = controller_with(
            BubbleState::new(100.0, 100.0, 50.0),
            ScreenBounds::new(400.0, 800.0),
            true,
        );
        down(&mut c, 100.0, 100.0, 0);
        mv(&mut c, 130.0, 100.0, 50);
        up(&mut c, 130.0, 100.0, 100);
        // Every host call failed, the in-memory position still snapped
        assert_eq!(c.state().x, 0.0);
        assert!(log.borrow().host.is_empty());
    }

    #[test]
    fn test_teardown_is_idempotent_and_silences_callbacks() {
        let (mut c, log) = controller();
        c.start(0);
        down(&mut c, 0.0, 0.0, 100);
        let long_press = c.long_press_deadline().unwrap();
        let hide = c.hide_deadline().unwrap();

        c.teardown();
        c.teardown();
        assert_eq!(
            log.borrow().host.iter().filter(|h| h.as_str() == "detach").count(),
            1
        );

        // Late callbacks and samples after teardown do nothing
        c.on_long_press_timeout(long_press.1, long_press.0);
        c.on_hide_timeout(hide.1);
        up(&mut c, 0.0, 0.0, 150);
        c.resize(72.0);
        assert_eq!(log.borrow().settings, 0);
        assert_eq!(log.borrow().volume_ui, 0);
        assert!(!c.state().collapsed);
    }

    #[test]
    fn test_teardown_tolerates_host_failure() {
        let (mut c, _log) = controller_with(
            BubbleState::new(0.0, 0.0, 50.0),
            ScreenBounds::new(400.0, 800.0),
            true,
        );
        c.teardown();
    }
}
