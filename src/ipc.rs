//! IPC message types - newline-delimited JSON over stdin/stdout
//!
//! Requests flow in from whatever delivers input (a compositor plugin, a
//! test driver, a debug shell); overlay updates flow out to whatever draws
//! the bubble. The core makes no assumption about either transport.

use serde::{Deserialize, Serialize};

use crate::input::PointerPhase;

/// Inbound request, one JSON object per line on stdin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// One raw pointer sample of the current touch session
    Pointer {
        phase: PointerPhase,
        x: f64,
        y: f64,
        t_ms: u64,
    },
    /// Screen metrics changed (orientation, scale)
    Screen { width: f64, height: f64 },
    /// Apply a new bubble diameter directly
    Resize { diameter: f64 },
    /// Re-read the settings file and apply the configured diameter
    Reload,
    Quit,
}

/// Outbound overlay update, one JSON object per line on stdout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    Attach {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        opacity: f64,
    },
    Position { x: f64, y: f64 },
    Size { width: f64, height: f64 },
    Opacity { opacity: f64, fade_ms: u64 },
    Detach,
}
