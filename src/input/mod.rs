//! Input handling - raw pointer samples and gesture recognition
//!
//! This module provides:
//! - Raw pointer event types as delivered by the transport
//! - Gesture classification (tap, double-tap, drag, long-press)

pub mod gestures;

use serde::{Deserialize, Serialize};

/// Phase of a raw pointer event within one touch session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One raw pointer sample. Timestamps are milliseconds on the
/// producer's monotonic clock; the classifier only ever compares them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub t_ms: u64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64, t_ms: u64) -> Self {
        Self { x, y, t_ms }
    }
}
