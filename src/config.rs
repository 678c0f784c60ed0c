//! Persisted settings - the bubble's size preference and timing knobs
//!
//! Stored as JSON under `~/.local/state/bubblevol/settings.json`. An
//! external configuration surface edits this file and sends `reload`; the
//! daemon re-reads it and applies the new diameter while running. Missing
//! file or fields fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bubble::VisibilityConfig;
use crate::input::gestures::GestureConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Bubble diameter in logical pixels
    #[serde(default = "default_diameter")]
    pub bubble_diameter: f64,
    /// Initial top-left position
    #[serde(default = "default_initial_x")]
    pub initial_x: f64,
    #[serde(default = "default_initial_y")]
    pub initial_y: f64,
    /// Pointer displacement that turns a press into a drag
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold_px: f64,
    #[serde(default = "default_long_press")]
    pub long_press_timeout_ms: u64,
    #[serde(default = "default_double_tap")]
    pub double_tap_window_ms: u64,
    /// Inactivity interval before the bubble dims
    #[serde(default = "default_hide_delay")]
    pub hide_delay_ms: u64,
    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f64,
    #[serde(default = "default_fade_out")]
    pub fade_out_ms: u64,
    #[serde(default = "default_fade_in")]
    pub fade_in_ms: u64,
    /// Command launched on long press (the configuration surface)
    #[serde(default)]
    pub settings_command: Option<String>,
}

fn default_diameter() -> f64 {
    56.0
}
fn default_initial_x() -> f64 {
    100.0
}
fn default_initial_y() -> f64 {
    300.0
}
fn default_drag_threshold() -> f64 {
    10.0
}
fn default_long_press() -> u64 {
    500
}
fn default_double_tap() -> u64 {
    300
}
fn default_hide_delay() -> u64 {
    2500
}
fn default_dim_opacity() -> f64 {
    0.25
}
fn default_fade_out() -> u64 {
    300
}
fn default_fade_in() -> u64 {
    200
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bubble_diameter: default_diameter(),
            initial_x: default_initial_x(),
            initial_y: default_initial_y(),
            drag_threshold_px: default_drag_threshold(),
            long_press_timeout_ms: default_long_press(),
            double_tap_window_ms: default_double_tap(),
            hide_delay_ms: default_hide_delay(),
            dim_opacity: default_dim_opacity(),
            fade_out_ms: default_fade_out(),
            fade_in_ms: default_fade_in(),
            settings_command: None,
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".local/state/bubblevol/settings.json"))
    }

    /// Load from the given path (or the default location), falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => {
                tracing::warn!("No HOME set, using default settings");
                return Self::default();
            }
        };

        if let Ok(contents) = fs::read_to_string(&path) {
            match serde_json::from_str(&contents) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {:?}", path);
                    return settings;
                }
                Err(e) => tracing::warn!("Invalid settings file {:?}: {}", path, e),
            }
        } else {
            tracing::info!("No settings file at {:?}, using defaults", path);
        }
        Self::default()
    }

    pub fn gesture_config(&self) -> GestureConfig {
        GestureConfig {
            drag_threshold_px: self.drag_threshold_px,
            long_press_timeout_ms: self.long_press_timeout_ms,
            double_tap_window_ms: self.double_tap_window_ms,
        }
    }

    pub fn visibility_config(&self) -> VisibilityConfig {
        VisibilityConfig {
            hide_delay_ms: self.hide_delay_ms,
            dim_opacity: self.dim_opacity,
            fade_out_ms: self.fade_out_ms,
            fade_in_ms: self.fade_in_ms,
        }
    }
}
