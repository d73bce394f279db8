//! Fleet bot process for the Halite III host.
//!
//! The host drives the game over the bot's stdin/stdout with a line-based
//! text protocol:
//!
//! - **stdin**: handshake, then one frame per turn
//! - **stdout**: bot name, then one command line per turn
//! - **log file**: `bot-<player>.log`, since stdout is the protocol channel
//!
//! See the [`protocol`] module for the wire format. All decisions are made
//! by [`hlt_core`]; this crate only moves data between the host and the
//! core.
//!
//! # Example
//!
//! ```bash
//! # Play with a fixed seed and record the game
//! halite --replay-directory replays/ "cargo run -p hlt_bot -- 42 --record game.rec" ...
//!
//! # Check the recording still reproduces
//! cargo run -p hlt_bot -- replay --file game.rec
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod game;
pub mod logging;
pub mod protocol;
pub mod runner;
pub mod shutdown;

pub use error::{BotError, Result};
pub use game::{GameState, PlayerState};
pub use protocol::{Frame, Handshake, LineReader, ProtocolError};
pub use runner::{BotRunner, RunSummary};
pub use shutdown::ShutdownSignal;
