//! # HLT Core
//!
//! Deterministic decision core for the fleet bot.
//!
//! This crate contains **only** turn-local decision logic:
//! - No protocol IO (snapshots in, commands out)
//! - No system randomness (the caller supplies a seeded RNG)
//! - No state carried between turns
//!
//! This separation enables:
//! - Offline replay of recorded games
//! - Determinism testing
//! - Benchmarking the per-turn budget without a game host
//!
//! ## Crate Structure
//!
//! - [`position`] - Toroidal coordinate algebra
//! - [`components`] - Ships, structures, and commands
//! - [`snapshot`] - Per-turn world state and its validation
//! - [`map`] - Grid map and the turn-scoped reservation grid
//! - [`navigation`] - Naive navigator and safe-move fallbacks
//! - [`policy`] - Per-ship move policy
//! - [`production`] - Fleet production rule
//! - [`turn`] - Turn orchestration
//! - [`config`] - Host constants and bot tuning
//! - [`replay`] - Turn recording and verification

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod components;
pub mod config;
pub mod error;
pub mod map;
pub mod navigation;
pub mod policy;
pub mod position;
pub mod production;
pub mod replay;
pub mod snapshot;
pub mod turn;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{BotConfig, Constants, PolicyConfig, RelocationStrategy, Tuning};
    pub use crate::error::{GameError, Result};
    pub use crate::map::{GameMap, MapCell, TurnGrid};
    pub use crate::navigation::{naive_navigate, random_safe_direction, richest_safe_direction};
    pub use crate::policy::{decide, ShipAction};
    pub use crate::position::{Dimensions, Direction, Position};
    pub use crate::production::SpawnRule;
    pub use crate::snapshot::Snapshot;
    pub use crate::turn::{seeded_rng, BotRng, ShipDecision, TurnPlan, TurnPlanner};
}
