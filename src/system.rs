//! System integration - audio control and settings launch
//!
//! Provides the collaborators the bubble fires into:
//! - Volume via pactl (PulseAudio/PipeWire)
//! - Settings surface launch via a configured command
//!
//! All calls are fire-and-forget process spawns. Failures are swallowed
//! here, never surfaced to the bubble controller.

use std::process::Command;

/// Audio-volume collaborator
pub trait VolumeControl {
    /// Bring up the system volume display without changing the level
    fn show_volume_ui(&mut self);
    /// Toggle mute on the default sink
    fn toggle_mute(&mut self);
}

/// Settings-surface collaborator
pub trait SettingsLaunch {
    fn open_settings(&mut self);
}

/// Volume control using pactl against the default sink
pub struct PactlVolume;

impl PactlVolume {
    /// Run a pactl command, fire and forget
    fn run_pactl_async(args: &[&str]) {
        tracing::info!("Running pactl: {:?}", args);
        let _ = Command::new("pactl").args(args).spawn();
    }
}

impl VolumeControl for PactlVolume {
    fn show_volume_ui(&mut self) {
        // Closest analog of a volume panel: a notification showing the
        // current sink volume. The subshell keeps the query off our thread.
        let _ = Command::new("sh")
            .args([
                "-c",
                "notify-send -t 1500 Volume \"$(pactl get-sink-volume @DEFAULT_SINK@ | head -1)\"",
            ])
            .spawn();
    }

    fn toggle_mute(&mut self) {
        Self::run_pactl_async(&["set-sink-mute", "@DEFAULT_SINK@", "toggle"]);
    }
}

/// Launches the configured settings command via the shell
pub struct CommandSettings {
    command: Option<String>,
}

impl CommandSettings {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl SettingsLaunch for CommandSettings {
    fn open_settings(&mut self) {
        match &self.command {
            Some(cmd) => {
                tracing::info!("Launching settings: {}", cmd);
                let _ = Command::new("sh").args(["-c", cmd]).spawn();
            }
            None => tracing::warn!("Long press but no settings_command configured"),
        }
    }
}
