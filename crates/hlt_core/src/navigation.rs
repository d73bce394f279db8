//! Single-step navigation with local collision avoidance.
//!
//! Every search here is myopic: one step, no lookahead, no global
//! assignment. Contested cells go to whichever ship asks first, so callers
//! control priority through the order in which they navigate ships.
//!
//! A successful search reserves its destination in the [`TurnGrid`].
//! [`Direction::Still`] is never reserved: a ship that holds its cell
//! already occupies it in the snapshot.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::components::Ship;
use crate::map::TurnGrid;
use crate::position::{Direction, Position};

/// Greedy step toward `target`.
///
/// Tries the direction along the axis with the larger remaining distance
/// (vertical on ties), then the other improving direction, then the
/// remaining cardinals in [`Direction::ALL_CARDINALS`] order. The first
/// direction leading to an empty cell is reserved and returned. Returns
/// `Still` when the ship is already on the target or every neighbor is
/// occupied.
pub fn naive_navigate(ship: &Ship, target: Position, grid: &mut TurnGrid<'_>) -> Direction {
    let dimensions = grid.dimensions();
    let target = dimensions.normalize(target);
    let (dx, dy) = dimensions.toroidal_delta(ship.position, target);

    if dx == 0 && dy == 0 {
        return Direction::Still;
    }

    for direction in candidate_order(dx, dy) {
        let destination = ship.position.directional_offset(direction);
        if grid.claim(destination, ship.id) {
            trace!(ship = ship.id, ?direction, %target, "navigating");
            return direction;
        }
    }

    debug!(ship = ship.id, position = %ship.position, "all neighbors blocked, holding");
    Direction::Still
}

/// Directions to try for a delta, most useful first. Contains each
/// cardinal exactly once.
fn candidate_order(dx: i32, dy: i32) -> [Direction; 4] {
    let horizontal = match dx.signum() {
        1 => Some(Direction::East),
        -1 => Some(Direction::West),
        _ => None,
    };
    let vertical = match dy.signum() {
        1 => Some(Direction::South),
        -1 => Some(Direction::North),
        _ => None,
    };

    let improving = if dy.unsigned_abs() >= dx.unsigned_abs() {
        [vertical, horizontal]
    } else {
        [horizontal, vertical]
    };

    let mut order = [Direction::Still; 4];
    let mut len = 0;
    for direction in improving
        .into_iter()
        .flatten()
        .chain(Direction::ALL_CARDINALS)
    {
        if !order[..len].contains(&direction) {
            order[len] = direction;
            len += 1;
        }
    }
    order
}

/// Uniformly random step into an empty neighbor.
///
/// Draws cardinals in a random order without replacement, at most
/// `max_attempts` times, and reserves the first empty destination. Returns
/// `Still` when the draws run out, which always happens once every
/// neighbor is occupied.
pub fn random_safe_direction<R: Rng + ?Sized>(
    ship: &Ship,
    grid: &mut TurnGrid<'_>,
    rng: &mut R,
    max_attempts: u32,
) -> Direction {
    let mut directions = Direction::ALL_CARDINALS;
    directions.shuffle(rng);

    for direction in directions.into_iter().take(max_attempts as usize) {
        let destination = ship.position.directional_offset(direction);
        if grid.claim(destination, ship.id) {
            trace!(ship = ship.id, ?direction, "random safe move");
            return direction;
        }
    }

    debug!(
        ship = ship.id,
        position = %ship.position,
        max_attempts,
        "no safe move found, holding"
    );
    Direction::Still
}

/// Step into the empty neighbor holding the most halite.
///
/// Ties go to the earlier direction in [`Direction::ALL_CARDINALS`].
/// Returns `Still`, reserving nothing, when no empty neighbor has any
/// halite.
pub fn richest_safe_direction(ship: &Ship, grid: &mut TurnGrid<'_>) -> Direction {
    let mut best: Option<(Direction, u32)> = None;

    for direction in Direction::ALL_CARDINALS {
        let destination = ship.position.directional_offset(direction);
        if grid.is_occupied(destination) {
            continue;
        }
        let halite = grid.at(destination).halite;
        if halite > 0 && best.map_or(true, |(_, most)| halite > most) {
            best = Some((direction, halite));
        }
    }

    let Some((direction, halite)) = best else {
        return Direction::Still;
    };
    if !grid.claim(ship.position.directional_offset(direction), ship.id) {
        return Direction::Still;
    }
    trace!(ship = ship.id, ?direction, halite, "moving to richest neighbor");
    direction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GameMap;
    use crate::position::Dimensions;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_map(width: i32, height: i32) -> GameMap {
        let dims = Dimensions::new(width, height).unwrap();
        GameMap::new(dims, &vec![0; dims.cell_count()]).unwrap()
    }

    fn ship_at(id: u32, x: i32, y: i32) -> Ship {
        Ship::new(id, 0, Position::new(x, y), 0)
    }

    fn block_neighbors(grid: &mut TurnGrid<'_>, center: Position) {
        for (blocker, neighbor) in (100..).zip(center.surrounding_cardinals()) {
            grid.mark_unsafe(neighbor, blocker).unwrap();
        }
    }

    #[test]
    fn test_candidate_order_covers_all_cardinals() {
        for (dx, dy) in [(3, -1), (-1, 3), (2, 2), (0, -4), (5, 0), (-2, -2)] {
            let order = candidate_order(dx, dy);
            for direction in Direction::ALL_CARDINALS {
                assert_eq!(order.iter().filter(|d| **d == direction).count(), 1);
            }
        }
    }

    #[test]
    fn test_candidate_order_priority() {
        assert_eq!(
            candidate_order(3, -1),
            [
                Direction::East,
                Direction::North,
                Direction::South,
                Direction::West
            ]
        );
        assert_eq!(
            candidate_order(-2, -2),
            [
                Direction::North,
                Direction::West,
                Direction::South,
                Direction::East
            ]
        );
        assert_eq!(
            candidate_order(0, 4),
            [
                Direction::South,
                Direction::North,
                Direction::East,
                Direction::West
            ]
        );
    }

    #[test]
    fn test_navigate_full_ship_home_tie() {
        let map = open_map(10, 10);
        let mut grid = TurnGrid::new(&map);
        let ship = ship_at(1, 5, 5);

        let direction = naive_navigate(&ship, Position::new(0, 0), &mut grid);

        assert_eq!(direction, Direction::North);
        assert_eq!(grid.reserved_by(Position::new(5, 4)), Some(1));
        assert_eq!(grid.reservation_count(), 1);
    }

    #[test]
    fn test_navigate_wraps_across_edge() {
        let map = open_map(10, 10);
        let mut grid = TurnGrid::new(&map);
        let ship = ship_at(1, 9, 3);

        let direction = naive_navigate(&ship, Position::new(1, 3), &mut grid);

        assert_eq!(direction, Direction::East);
        assert_eq!(grid.reserved_by(Position::new(0, 3)), Some(1));
    }

    #[test]
    fn test_navigate_on_target_is_still() {
        let map = open_map(6, 6);
        let mut grid = TurnGrid::new(&map);
        let ship = ship_at(1, 2, 2);

        assert_eq!(
            naive_navigate(&ship, Position::new(8, -4), &mut grid),
            Direction::Still
        );
        assert_eq!(grid.reservation_count(), 0);
    }

    #[test]
    fn test_navigate_falls_back_to_other_axis() {
        let map = open_map(10, 10);
        let mut grid = TurnGrid::new(&map);
        grid.mark_unsafe(Position::new(3, 2), 50).unwrap();
        let ship = ship_at(1, 2, 2);

        let direction = naive_navigate(&ship, Position::new(6, 3), &mut grid);

        assert_eq!(direction, Direction::South);
    }

    #[test]
    fn test_navigate_sidesteps_when_improving_blocked() {
        let map = open_map(10, 10);
        let mut grid = TurnGrid::new(&map);
        grid.mark_unsafe(Position::new(3, 2), 50).unwrap();
        let ship = ship_at(1, 2, 2);

        let direction = naive_navigate(&ship, Position::new(6, 2), &mut grid);

        assert_eq!(direction, Direction::North);
        assert_eq!(grid.reserved_by(Position::new(2, 1)), Some(1));
    }

    #[test]
    fn test_navigate_deadlock_is_still() {
        let map = open_map(8, 8);
        let mut grid = TurnGrid::new(&map);
        let ship = ship_at(1, 4, 4);
        block_neighbors(&mut grid, ship.position);

        assert_eq!(
            naive_navigate(&ship, Position::new(0, 0), &mut grid),
            Direction::Still
        );
        assert_eq!(grid.reservation_count(), 4);
    }

    #[test]
    fn test_random_safe_deadlock_terminates() {
        let map = open_map(8, 8);
        let mut grid = TurnGrid::new(&map);
        let ship = ship_at(1, 0, 0);
        block_neighbors(&mut grid, ship.position);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        assert_eq!(
            random_safe_direction(&ship, &mut grid, &mut rng, 1000),
            Direction::Still
        );
    }

    #[test]
    fn test_random_safe_finds_only_free_neighbor() {
        let map = open_map(8, 8);
        let ship = ship_at(1, 3, 3);
        for seed in 0..20 {
            let mut grid = TurnGrid::new(&map);
            for (blocker, direction) in [
                (100, Direction::North),
                (101, Direction::East),
                (102, Direction::West),
            ] {
                grid.mark_unsafe(ship.position.directional_offset(direction), blocker)
                    .unwrap();
            }
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            assert_eq!(
                random_safe_direction(&ship, &mut grid, &mut rng, 4),
                Direction::South
            );
            assert_eq!(grid.reserved_by(Position::new(3, 4)), Some(1));
        }
    }

    #[test]
    fn test_random_safe_respects_attempt_cap() {
        let map = open_map(8, 8);
        let mut grid = TurnGrid::new(&map);
        let ship = ship_at(1, 3, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(
            random_safe_direction(&ship, &mut grid, &mut rng, 0),
            Direction::Still
        );
        assert_eq!(grid.reservation_count(), 0);
    }

    #[test]
    fn test_random_safe_same_seed_same_choice() {
        let map = open_map(8, 8);
        let ship = ship_at(1, 3, 3);
        let pick = |seed| {
            let mut grid = TurnGrid::new(&map);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            random_safe_direction(&ship, &mut grid, &mut rng, 16)
        };
        assert_eq!(pick(42), pick(42));
        assert_ne!(pick(42), Direction::Still);
    }

    #[test]
    fn test_richest_picks_most_halite() {
        let dims = Dimensions::new(5, 5).unwrap();
        let mut halite = vec![0; 25];
        halite[dims.index_of(Position::new(2, 1))] = 40;
        halite[dims.index_of(Position::new(3, 2))] = 90;
        halite[dims.index_of(Position::new(2, 3))] = 90;
        let map = GameMap::new(dims, &halite).unwrap();
        let mut grid = TurnGrid::new(&map);
        let ship = ship_at(1, 2, 2);

        // South and East tie; South comes first.
        assert_eq!(richest_safe_direction(&ship, &mut grid), Direction::South);
        assert_eq!(grid.reserved_by(Position::new(2, 3)), Some(1));
    }

    #[test]
    fn test_richest_skips_occupied_and_empty_cells() {
        let dims = Dimensions::new(5, 5).unwrap();
        let mut halite = vec![0; 25];
        halite[dims.index_of(Position::new(3, 2))] = 90;
        let map = GameMap::new(dims, &halite).unwrap();
        let mut grid = TurnGrid::new(&map);
        grid.mark_unsafe(Position::new(3, 2), 9).unwrap();
        let ship = ship_at(1, 2, 2);

        assert_eq!(richest_safe_direction(&ship, &mut grid), Direction::Still);
        assert_eq!(grid.reservation_count(), 1);
    }
}
