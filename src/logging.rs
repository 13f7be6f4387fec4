//! File-backed logging for the TUI process.
//!
//! The terminal is owned by the UI, so diagnostics go to a log file under
//! the user data directory. Filtering follows `CURSOCHAT_LOG` (env-filter
//! syntax), defaulting to `info`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CURSOCHAT_LOG";

/// Initialize the global tracing subscriber. Call once, before the TUI
/// takes the terminal.
pub fn init(verbose: bool) -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("Failed to resolve data directory: not found.")?
        .join("cursochat");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let path = dir.join("cursochat.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    tracing::info!("logging to {}", path.display());
    Ok(path)
}
