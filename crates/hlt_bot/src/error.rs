//! Error types for the bot process.

use thiserror::Error;

use hlt_core::error::GameError;

use crate::protocol::ProtocolError;

/// Result type alias using [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;

/// Everything that can end a game early.
#[derive(Debug, Error)]
pub enum BotError {
    /// The host sent something unreadable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The decision core rejected its input or configuration.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Reading from the host or writing commands failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The log file could not be set up.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
