//! Per-ship move policy.

use serde::{Deserialize, Serialize};

use crate::components::Ship;
use crate::config::PolicyConfig;
use crate::map::MapCell;

/// What a ship does this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipAction {
    /// Carry cargo back to the home base.
    Return,
    /// Leave a depleted cell for a neighbor.
    Relocate,
    /// Stay and mine the current cell.
    Harvest,
}

/// Decide a ship's action. Rules are checked in order, first match wins:
///
/// 1. cargo full or past the return fraction: [`ShipAction::Return`]
/// 2. current cell below the depletion threshold: [`ShipAction::Relocate`]
/// 3. otherwise: [`ShipAction::Harvest`]
#[must_use]
pub fn decide(ship: &Ship, cell: &MapCell, policy: &PolicyConfig) -> ShipAction {
    if ship.is_full(policy.max_halite) || policy.should_return(ship.halite) {
        ShipAction::Return
    } else if cell.halite < policy.depletion_threshold() {
        ShipAction::Relocate
    } else {
        ShipAction::Harvest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    const POLICY: PolicyConfig = PolicyConfig {
        max_halite: 1000,
        return_numerator: 3,
        return_denominator: 4,
        depleted_divisor: 10,
    };

    fn cell(halite: u32) -> MapCell {
        MapCell::new(Position::new(0, 0), halite)
    }

    fn ship(halite: u32) -> Ship {
        Ship::new(1, 0, Position::new(0, 0), halite)
    }

    #[test]
    fn test_full_ship_returns() {
        assert_eq!(decide(&ship(1000), &cell(900), &POLICY), ShipAction::Return);
        assert_eq!(decide(&ship(750), &cell(0), &POLICY), ShipAction::Return);
    }

    #[test]
    fn test_depleted_cell_relocates() {
        assert_eq!(decide(&ship(0), &cell(0), &POLICY), ShipAction::Relocate);
        assert_eq!(decide(&ship(749), &cell(99), &POLICY), ShipAction::Relocate);
    }

    #[test]
    fn test_rich_cell_harvests() {
        assert_eq!(decide(&ship(0), &cell(100), &POLICY), ShipAction::Harvest);
        assert_eq!(decide(&ship(500), &cell(800), &POLICY), ShipAction::Harvest);
    }

    #[test]
    fn test_custom_return_fraction() {
        let eager = PolicyConfig {
            return_numerator: 1,
            return_denominator: 2,
            ..POLICY
        };
        assert_eq!(decide(&ship(500), &cell(800), &eager), ShipAction::Return);
        assert_eq!(decide(&ship(499), &cell(800), &eager), ShipAction::Harvest);
    }
}
