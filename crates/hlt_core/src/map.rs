//! Occupancy-aware grid map.
//!
//! [`GameMap`] holds the cells of the current turn and is rebuilt from every
//! snapshot. [`TurnGrid`] layers the turn-scoped reservation ledger on top:
//! it is created empty at the start of a turn, mutated as ships claim their
//! destinations, and dropped when the turn's commands are assembled. No
//! reservation survives into the next turn.

use serde::{Deserialize, Serialize};

use crate::components::{Ship, ShipId, StructureKind};
use crate::error::{GameError, Result};
use crate::position::{Dimensions, Position};
use crate::snapshot::Snapshot;

/// One cell of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapCell {
    /// Normalized cell position.
    pub position: Position,
    /// Halite on the cell.
    pub halite: u32,
    /// Ship standing on the cell at the start of the turn (any player).
    pub occupant: Option<ShipId>,
    /// Structure built on the cell, if any.
    pub structure: Option<StructureKind>,
}

impl MapCell {
    /// Create an empty cell.
    #[must_use]
    pub const fn new(position: Position, halite: u32) -> Self {
        Self {
            position,
            halite,
            occupant: None,
            structure: None,
        }
    }
}

/// Cells of the current turn, stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMap {
    dimensions: Dimensions,
    cells: Vec<MapCell>,
}

impl GameMap {
    /// Create a map with the given halite grid and no occupants.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidSnapshot` if `halite` does not hold exactly
    /// one value per cell.
    pub fn new(dimensions: Dimensions, halite: &[u32]) -> Result<Self> {
        if halite.len() != dimensions.cell_count() {
            return Err(GameError::InvalidSnapshot(format!(
                "halite grid has {} cells, expected {}",
                halite.len(),
                dimensions.cell_count()
            )));
        }

        let width = dimensions.width();
        let cells = halite
            .iter()
            .enumerate()
            .map(|(index, &amount)| {
                // The index fits in i32 because the dimensions do.
                let index = index as i32;
                MapCell::new(Position::new(index % width, index / width), amount)
            })
            .collect();

        Ok(Self { dimensions, cells })
    }

    /// Rebuild the map for a new turn.
    ///
    /// Validates the snapshot first, then marks every ship's cell occupied
    /// and records structures.
    ///
    /// # Errors
    ///
    /// Propagates [`Snapshot::validate`] failures.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let dimensions = snapshot.validate()?;
        let mut map = Self::new(dimensions, &snapshot.halite)?;

        for structure in &snapshot.structures {
            map.cell_mut(structure.position).structure = Some(structure.kind);
        }
        for ship in &snapshot.ships {
            map.cell_mut(ship.position).occupant = Some(ship.id);
        }

        Ok(map)
    }

    /// Map extent.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Wrap a position onto the map.
    #[must_use]
    pub const fn normalize(&self, position: Position) -> Position {
        self.dimensions.normalize(position)
    }

    /// Cell at `position`, normalizing first.
    #[must_use]
    pub fn at(&self, position: Position) -> &MapCell {
        &self.cells[self.dimensions.index_of(position)]
    }

    /// Cell under `ship`.
    #[must_use]
    pub fn at_ship(&self, ship: &Ship) -> &MapCell {
        self.at(ship.position)
    }

    fn cell_mut(&mut self, position: Position) -> &mut MapCell {
        let index = self.dimensions.index_of(position);
        &mut self.cells[index]
    }
}

/// The map plus this turn's destination reservations.
///
/// Owned by the turn planner and passed by `&mut` into the navigator.
/// Holds at most one reservation per cell.
#[derive(Debug)]
pub struct TurnGrid<'m> {
    map: &'m GameMap,
    reservations: Vec<Option<ShipId>>,
    reserved: Vec<Position>,
}

impl<'m> TurnGrid<'m> {
    /// Start a turn with no reservations.
    #[must_use]
    pub fn new(map: &'m GameMap) -> Self {
        Self {
            map,
            reservations: vec![None; map.cells.len()],
            reserved: Vec::new(),
        }
    }

    /// Underlying map.
    #[must_use]
    pub const fn map(&self) -> &'m GameMap {
        self.map
    }

    /// Map extent.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.map.dimensions
    }

    /// Cell at `position`, normalizing first.
    #[must_use]
    pub fn at(&self, position: Position) -> &'m MapCell {
        self.map.at(position)
    }

    /// Cell under `ship`.
    #[must_use]
    pub fn at_ship(&self, ship: &Ship) -> &'m MapCell {
        self.map.at_ship(ship)
    }

    /// Whether a ship stands on the cell or a ship reserved it this turn.
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        let index = self.map.dimensions.index_of(position);
        self.map.cells[index].occupant.is_some() || self.reservations[index].is_some()
    }

    /// Whether the cell is free to move into.
    #[must_use]
    pub fn is_empty(&self, position: Position) -> bool {
        !self.is_occupied(position)
    }

    /// Ship holding this turn's reservation on the cell.
    #[must_use]
    pub fn reserved_by(&self, position: Position) -> Option<ShipId> {
        self.reservations[self.map.dimensions.index_of(position)]
    }

    /// Record that `ship` will end the turn on the cell at `position`.
    ///
    /// Calling this again for the same ship is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ReservationConflict` if another ship already
    /// holds the cell.
    pub fn mark_unsafe(&mut self, position: Position, ship: ShipId) -> Result<()> {
        let position = self.map.normalize(position);
        let index = self.map.dimensions.index_of(position);
        match self.reservations[index] {
            Some(holder) if holder == ship => Ok(()),
            Some(holder) => Err(GameError::ReservationConflict {
                position,
                holder,
                requester: ship,
            }),
            None => {
                self.reservations[index] = Some(ship);
                self.reserved.push(position);
                Ok(())
            }
        }
    }

    /// Reserve the cell for `ship` if it is empty.
    ///
    /// Returns whether the reservation was made.
    pub fn claim(&mut self, position: Position, ship: ShipId) -> bool {
        if self.is_occupied(position) {
            return false;
        }
        self.mark_unsafe(position, ship).is_ok()
    }

    /// Number of reservations made this turn.
    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.reserved.len()
    }

    /// Reserved cells in the order they were claimed.
    #[must_use]
    pub fn reserved_cells(&self) -> &[Position] {
        &self.reserved
    }

    /// Consume the grid, keeping the list of reserved cells.
    #[must_use]
    pub fn into_reserved_cells(self) -> Vec<Position> {
        self.reserved
    }
}
