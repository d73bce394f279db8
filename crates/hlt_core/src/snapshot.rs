//! World snapshot handed to the core once per turn.
//!
//! A snapshot is the complete, authoritative description of the world at
//! the start of a turn. The protocol layer builds it; the core validates it
//! and never trusts an impossible position by silently wrapping it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::components::{PlayerId, Ship, Structure};
use crate::error::{GameError, Result};
use crate::position::{Dimensions, Position};

/// World state for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current turn number, starting at 1.
    pub turn: u32,
    /// The player this bot controls.
    pub me: PlayerId,
    /// Map width in cells.
    pub width: i32,
    /// Map height in cells.
    pub height: i32,
    /// Halite per cell in row-major order.
    pub halite: Vec<u32>,
    /// Every ship on the map, own and opposing.
    pub ships: Vec<Ship>,
    /// Every shipyard and dropoff on the map.
    pub structures: Vec<Structure>,
    /// The bot's shipyard.
    pub home_base: Position,
    /// The bot's banked halite.
    pub bank: u32,
}

impl Snapshot {
    /// Check internal consistency and return the validated dimensions.
    ///
    /// # Errors
    ///
    /// - `GameError::InvalidDimensions` for non-positive sides.
    /// - `GameError::InvalidSnapshot` if the halite grid has the wrong size,
    ///   an entity sits outside the map, or a ship id repeats.
    pub fn validate(&self) -> Result<Dimensions> {
        let dimensions = Dimensions::new(self.width, self.height)?;

        if self.halite.len() != dimensions.cell_count() {
            return Err(GameError::InvalidSnapshot(format!(
                "halite grid has {} cells, expected {}x{}={}",
                self.halite.len(),
                self.width,
                self.height,
                dimensions.cell_count()
            )));
        }

        if !dimensions.contains(self.home_base) {
            return Err(GameError::InvalidSnapshot(format!(
                "home base {} outside {}x{} map",
                self.home_base, self.width, self.height
            )));
        }

        let mut seen = HashSet::with_capacity(self.ships.len());
        for ship in &self.ships {
            if !dimensions.contains(ship.position) {
                return Err(GameError::InvalidSnapshot(format!(
                    "ship {} at {} outside {}x{} map",
                    ship.id, ship.position, self.width, self.height
                )));
            }
            if !seen.insert(ship.id) {
                return Err(GameError::InvalidSnapshot(format!(
                    "ship id {} reported twice",
                    ship.id
                )));
            }
        }

        for structure in &self.structures {
            if !dimensions.contains(structure.position) {
                return Err(GameError::InvalidSnapshot(format!(
                    "{:?} of player {} at {} outside {}x{} map",
                    structure.kind, structure.owner, structure.position, self.width, self.height
                )));
            }
        }

        Ok(dimensions)
    }

    /// Ships owned by this bot, in snapshot order.
    pub fn my_ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter().filter(move |ship| ship.owner == self.me)
    }
}
