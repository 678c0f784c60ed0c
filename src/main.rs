//! bubblevol - a floating volume bubble for mobile Linux
//!
//! Features:
//! - Single persistent draggable circular control
//! - Tap to show volume, double tap to mute, long press for settings
//! - Edge snapping after drags, idle fade-out
//! - Transport-agnostic core: pointer samples in, overlay updates out

mod bubble;
mod config;
mod daemon;
mod input;
mod ipc;
mod overlay;
mod system;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::bubble::ScreenBounds;

#[derive(Parser, Debug)]
#[command(name = "bubblevol")]
#[command(about = "Floating volume bubble for mobile Linux", long_about = None)]
struct Args {
    /// Enable verbose debug output
    #[arg(short, long)]
    debug: bool,

    /// Settings file (defaults to ~/.local/state/bubblevol/settings.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Screen width in logical pixels
    #[arg(long, default_value_t = 720.0)]
    screen_width: f64,

    /// Screen height in logical pixels
    #[arg(long, default_value_t = 1440.0)]
    screen_height: f64,
}

fn main() -> Result<()> {
    // Set up panic hook to log panics before crashing
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        if let Ok(home) = std::env::var("HOME") {
            let crash_log = format!("{}/.local/state/bubblevol/crash.log", home);
            if let Ok(mut f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                use std::io::Write;
                let _ = writeln!(f, "[{}] PANIC: {}", chrono::Local::now(), panic_info);
            }
        }
    }));

    // Log directory (~/.local/state/bubblevol or /tmp/bubblevol)
    let log_dir = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local/state")))
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join("bubblevol");

    std::fs::create_dir_all(&log_dir).ok();

    let args = Args::parse();

    // File appender, rotates daily
    let file_appender = rolling::daily(&log_dir, "bubblevol.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Quiet by default, verbose with --debug. Logs go to stderr; stdout
    // carries the overlay update stream.
    let default_filter = if args.debug {
        "debug,bubblevol=debug"
    } else {
        "warn,bubblevol=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!(log_path = %log_dir.display(), "bubblevol starting");

    let settings = config::Settings::load(args.config.as_deref());
    let bounds = ScreenBounds::new(args.screen_width, args.screen_height);

    daemon::run(settings, bounds, args.config)
}
