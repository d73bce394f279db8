//! Error types for the decision core.

use thiserror::Error;

use crate::components::ShipId;
use crate::position::Position;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all decision core errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Map dimensions are not usable.
    #[error("Invalid map dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Reported width.
        width: i64,
        /// Reported height.
        height: i64,
    },

    /// The snapshot contradicts itself.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A required host constant is absent.
    #[error("Missing game constant: {0}")]
    MissingConstant(String),

    /// A host constant could not be read as an integer in range.
    #[error("Invalid game constant '{key}': {value}")]
    InvalidConstant {
        /// Constant name.
        key: String,
        /// Raw value as reported by the host.
        value: String,
    },

    /// Constants payload is not a JSON object.
    #[error("Failed to parse game constants: {0}")]
    ConstantsParseError(String),

    /// Tuning values are inconsistent.
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Two ships tried to reserve the same destination in one turn.
    #[error("Cell {position} already reserved by ship {holder}, requested by ship {requester}")]
    ReservationConflict {
        /// Contested cell.
        position: Position,
        /// Ship holding the reservation.
        holder: ShipId,
        /// Ship that attempted the second reservation.
        requester: ShipId,
    },

    /// Turn recording could not be saved or restored.
    #[error("Recording error: {0}")]
    RecordingError(String),
}
