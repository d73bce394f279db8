//! Log file setup.
//!
//! Stdout belongs to the host protocol, so logs go to a per-player file.
//! `RUST_LOG` overrides the level chosen by the `--verbose` flag.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hlt_core::components::PlayerId;

use crate::error::{BotError, Result};

/// Log file for `player` inside `dir`.
#[must_use]
pub fn log_file_path(dir: &Path, player: PlayerId) -> PathBuf {
    dir.join(format!("bot-{player}.log"))
}

/// Install the global subscriber writing to `bot-<player>.log`.
///
/// Returns the log file path.
///
/// # Errors
/// Fails if the directory or file cannot be created, or a subscriber is
/// already installed.
pub fn init_logging(dir: &Path, player: PlayerId, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = log_file_path(dir, player);
    let file = File::create(&path)?;

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init()
        .map_err(|e| BotError::Logging(e.to_string()))?;

    Ok(path)
}

/// Install a stderr subscriber for offline commands.
///
/// # Errors
/// Fails if a subscriber is already installed.
pub fn init_stderr_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(true))
        .with(LevelFilter::from_level(level))
        .try_init()
        .map_err(|e| BotError::Logging(e.to_string()))
}
