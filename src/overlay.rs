//! Overlay host seam - how the bubble reaches its rendering surface
//!
//! The daemon never draws; it describes the bubble to a host and the host
//! renders it. Any host call may fail (surface gone, pipe closed) and the
//! failure is non-fatal: the in-memory BubbleState stays authoritative and
//! the next successful call re-syncs the surface.

use std::io::Write;

use thiserror::Error;

use crate::bubble::BubbleState;
use crate::ipc::Update;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("overlay surface is not attached")]
    NotAttached,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The surface the bubble is drawn on. Implementations must treat every
/// call as best-effort; the caller logs and ignores failures.
pub trait OverlayHost {
    fn attach(&mut self, state: &BubbleState) -> Result<(), OverlayError>;
    fn update_position(&mut self, x: f64, y: f64) -> Result<(), OverlayError>;
    fn update_size(&mut self, width: f64, height: f64) -> Result<(), OverlayError>;
    fn update_opacity(&mut self, opacity: f64, fade_ms: u64) -> Result<(), OverlayError>;
    fn detach(&mut self) -> Result<(), OverlayError>;
}

/// Host that emits one JSON update per line to a writer (stdout in the
/// daemon; a renderer process on the other end).
pub struct JsonOverlayHost<W: Write> {
    out: W,
    attached: bool,
}

impl<W: Write> JsonOverlayHost<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            attached: false,
        }
    }

    fn emit(&mut self, update: &Update) -> Result<(), OverlayError> {
        let line = serde_json::to_string(update)?;
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }
}

impl JsonOverlayHost<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> OverlayHost for JsonOverlayHost<W> {
    fn attach(&mut self, state: &BubbleState) -> Result<(), OverlayError> {
        self.emit(&Update::Attach {
            x: state.x,
            y: state.y,
            width: state.width,
            height: state.height,
            opacity: state.opacity,
        })?;
        self.attached = true;
        Ok(())
    }

    fn update_position(&mut self, x: f64, y: f64) -> Result<(), OverlayError> {
        if !self.attached {
            return Err(OverlayError::NotAttached);
        }
        self.emit(&Update::Position { x, y })
    }

    fn update_size(&mut self, width: f64, height: f64) -> Result<(), OverlayError> {
        if !self.attached {
            return Err(OverlayError::NotAttached);
        }
        self.emit(&Update::Size { width, height })
    }

    fn update_opacity(&mut self, opacity: f64, fade_ms: u64) -> Result<(), OverlayError> {
        if !self.attached {
            return Err(OverlayError::NotAttached);
        }
        self.emit(&Update::Opacity { opacity, fade_ms })
    }

    fn detach(&mut self) -> Result<(), OverlayError> {
        if !self.attached {
            return Ok(());
        }
        self.attached = false;
        self.emit(&Update::Detach)
    }
}
