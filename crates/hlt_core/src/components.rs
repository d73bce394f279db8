//! Entity and command definitions.
//!
//! Entities are plain data reported by the host each turn. The core never
//! creates or destroys them; it only reads them and emits commands.

use serde::{Deserialize, Serialize};

use crate::position::{Direction, Position};

/// Identifier the host assigns to a player.
pub type PlayerId = u32;

/// Identifier the host assigns to a ship. Unique across all players.
pub type ShipId = u32;

/// A ship as reported in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    /// Host-assigned identifier.
    pub id: ShipId,
    /// Owning player.
    pub owner: PlayerId,
    /// Current cell.
    pub position: Position,
    /// Halite currently carried.
    pub halite: u32,
}

impl Ship {
    /// Create a new ship record.
    #[must_use]
    pub const fn new(id: ShipId, owner: PlayerId, position: Position, halite: u32) -> Self {
        Self {
            id,
            owner,
            position,
            halite,
        }
    }

    /// Whether the cargo hold is at (or above) `max_halite`.
    #[must_use]
    pub const fn is_full(&self, max_halite: u32) -> bool {
        self.halite >= max_halite
    }
}

/// Kind of a fixed structure on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// A player's home base, where new ships appear.
    Shipyard,
    /// An additional deposit point.
    Dropoff,
}

/// A shipyard or dropoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Structure {
    /// Owning player.
    pub owner: PlayerId,
    /// Structure kind.
    pub kind: StructureKind,
    /// Cell the structure sits on.
    pub position: Position,
}

impl Structure {
    /// Create a new structure record.
    #[must_use]
    pub const fn new(owner: PlayerId, kind: StructureKind, position: Position) -> Self {
        Self {
            owner,
            kind,
            position,
        }
    }
}

/// Instructions handed back to the host at the end of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Move a ship one step (or hold with [`Direction::Still`]).
    Move {
        /// Ship being ordered.
        ship: ShipId,
        /// Step to take.
        direction: Direction,
    },
    /// Build a new ship at the home base.
    Spawn,
    /// Convert a ship into a dropoff.
    ConstructDropoff {
        /// Ship being converted.
        ship: ShipId,
    },
}

impl Command {
    /// Ship this command refers to, if any.
    #[must_use]
    pub const fn ship(&self) -> Option<ShipId> {
        match self {
            Self::Move { ship, .. } | Self::ConstructDropoff { ship } => Some(*ship),
            Self::Spawn => None,
        }
    }
}
