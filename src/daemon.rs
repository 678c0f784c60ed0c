//! Daemon runtime - event loop, input transport, timer scheduling
//!
//! Everything runs on one calloop event loop: pointer requests arrive
//! through a channel fed by the stdin reader thread, and the long-press
//! and idle-fade callbacks are one-shot timer sources on the same loop.
//! Timers are never removed early; each carries the token it was armed
//! with, and a stale token makes the callback a silent no-op.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use calloop::channel;
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle};
use tracing::{info, warn};

use crate::bubble::{BubbleController, BubbleState, ScreenBounds};
use crate::config::Settings;
use crate::input::PointerSample;
use crate::ipc::Request;
use crate::overlay::JsonOverlayHost;
use crate::system::{CommandSettings, PactlVolume};

pub struct Daemon {
    controller: BubbleController,
    handle: LoopHandle<'static, Daemon>,
    config_path: Option<PathBuf>,
    running: bool,
    /// Timestamp of the most recent pointer sample. Timer delays are
    /// computed relative to it, so producer and wall clocks only need to
    /// tick at the same rate, not share an epoch.
    last_event_ms: u64,
    armed_press_seq: u64,
    armed_hide_generation: u64,
}

/// Build the controller against the real collaborators and run until the
/// input stream closes or a quit request arrives.
pub fn run(settings: Settings, bounds: ScreenBounds, config_path: Option<PathBuf>) -> Result<()> {
    let mut event_loop: EventLoop<Daemon> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    let (sender, receiver) = channel::channel::<Request>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Request>(&line) {
                Ok(request) => {
                    if sender.send(request).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Ignoring malformed request: {}", e),
            }
        }
        // Dropping the sender closes the channel and ends the loop
    });

    handle
        .insert_source(receiver, |event, _, daemon: &mut Daemon| match event {
            channel::Event::Msg(request) => daemon.handle_request(request),
            channel::Event::Closed => {
                info!("Input stream closed, shutting down");
                daemon.running = false;
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert input source: {}", e))?;

    let controller = BubbleController::new(
        BubbleState::new(
            settings.initial_x,
            settings.initial_y,
            settings.bubble_diameter,
        ),
        bounds,
        settings.gesture_config(),
        settings.visibility_config(),
        Box::new(JsonOverlayHost::stdout()),
        Box::new(PactlVolume),
        Box::new(CommandSettings::new(settings.settings_command.clone())),
    );

    let mut daemon = Daemon {
        controller,
        handle,
        config_path,
        running: true,
        last_event_ms: 0,
        armed_press_seq: 0,
        armed_hide_generation: 0,
    };

    daemon.controller.start(0);
    daemon.arm_timers();
    info!("Bubble attached, entering event loop");

    while daemon.running {
        event_loop
            .dispatch(Some(Duration::from_millis(200)), &mut daemon)
            .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;
    }

    daemon.controller.teardown();
    info!("Bubble detached");
    Ok(())
}

impl Daemon {
    fn handle_request(&mut self, request: Request) {
        match request {
            Request::Pointer { phase, x, y, t_ms } => {
                self.last_event_ms = self.last_event_ms.max(t_ms);
                self.controller
                    .handle_pointer(phase, PointerSample::new(x, y, t_ms));
            }
            Request::Screen { width, height } => {
                info!("Screen bounds now {}x{}", width, height);
                self.controller
                    .set_screen_bounds(ScreenBounds::new(width, height));
            }
            Request::Resize { diameter } => self.controller.resize(diameter),
            Request::Reload => {
                let settings = Settings::load(self.config_path.as_deref());
                info!("Reloaded settings, diameter {}", settings.bubble_diameter);
                self.controller.resize(settings.bubble_diameter);
            }
            Request::Quit => self.running = false,
        }
        self.arm_timers();
    }

    /// Insert one-shot timer sources for any newly armed deadline. The
    /// press sequence / fade generation tokens prevent double-arming and
    /// make superseded timers fire into no-ops.
    fn arm_timers(&mut self) {
        if let Some((deadline, seq)) = self.controller.long_press_deadline() {
            if seq != self.armed_press_seq {
                self.armed_press_seq = seq;
                let delay = deadline.saturating_sub(self.last_event_ms);
                let timer = Timer::from_duration(Duration::from_millis(delay));
                let inserted =
                    self.handle
                        .insert_source(timer, move |_, _, daemon: &mut Daemon| {
                            daemon.controller.on_long_press_timeout(seq, deadline);
                            // A long press may have re-armed the idle fade
                            daemon.arm_timers();
                            TimeoutAction::Drop
                        });
                if let Err(e) = inserted {
                    warn!("Failed to arm long-press timer: {}", e);
                }
            }
        }

        if let Some((deadline, generation)) = self.controller.hide_deadline() {
            if generation != self.armed_hide_generation {
                self.armed_hide_generation = generation;
                let delay = deadline.saturating_sub(self.last_event_ms);
                let timer = Timer::from_duration(Duration::from_millis(delay));
                let inserted =
                    self.handle
                        .insert_source(timer, move |_, _, daemon: &mut Daemon| {
                            daemon.controller.on_hide_timeout(generation);
                            TimeoutAction::Drop
                        });
                if let Err(e) = inserted {
                    warn!("Failed to arm hide timer: {}", e);
                }
            }
        }
    }
}
