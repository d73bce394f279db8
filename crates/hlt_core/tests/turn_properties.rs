//! Property tests for the turn planner over random fleets.

use std::collections::{HashMap, HashSet};

use hlt_core::components::{Command, ShipId};
use hlt_core::config::{RelocationStrategy, Tuning};
use hlt_core::policy::ShipAction;
use hlt_core::position::{Direction, Position};
use hlt_core::snapshot::Snapshot;
use hlt_core::turn::{seeded_rng, TurnPlanner};
use hlt_test_utils::determinism::strategies::{arb_dimensions, arb_position, arb_snapshot};
use hlt_test_utils::determinism::{
    find_first_divergence, run_parallel_games, verify_planner_determinism,
};
use hlt_test_utils::fixtures::{blockade, test_config, test_config_with, SnapshotBuilder};
use proptest::prelude::*;

fn planner() -> TurnPlanner {
    TurnPlanner::new(test_config())
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent_and_in_range(
        dims in arb_dimensions(),
        position in arb_position(),
    ) {
        let once = dims.normalize(position);
        prop_assert!(dims.contains(once));
        prop_assert_eq!(dims.normalize(once), once);
    }

    #[test]
    fn prop_toroidal_delta_is_shortest_and_consistent(
        dims in arb_dimensions(),
        from in arb_position(),
        to in arb_position(),
    ) {
        let (dx, dy) = dims.toroidal_delta(from, to);
        prop_assert!(2 * dx >= -dims.width() && 2 * dx < dims.width());
        prop_assert!(2 * dy >= -dims.height() && 2 * dy < dims.height());

        let arrived = Position::new(from.x + dx, from.y + dy);
        prop_assert_eq!(dims.normalize(arrived), dims.normalize(to));
    }

    #[test]
    fn prop_every_owned_ship_gets_exactly_one_move(
        snapshot in arb_snapshot(),
        seed in any::<u64>(),
    ) {
        let plan = planner().plan_turn(&snapshot, &mut seeded_rng(seed)).unwrap();

        let mut owned: Vec<ShipId> = snapshot.my_ships().map(|ship| ship.id).collect();
        owned.sort_unstable();
        let moved: Vec<ShipId> = plan
            .commands
            .iter()
            .filter(|command| matches!(command, Command::Move { .. }))
            .filter_map(Command::ship)
            .collect();
        prop_assert_eq!(moved, owned);

        let spawns = plan.commands.iter().filter(|c| **c == Command::Spawn).count();
        prop_assert!(spawns <= 1);
        if spawns == 1 {
            prop_assert_eq!(plan.commands.last(), Some(&Command::Spawn));
        }
    }

    #[test]
    fn prop_no_cell_reserved_twice(
        snapshot in arb_snapshot(),
        seed in any::<u64>(),
    ) {
        let plan = planner().plan_turn(&snapshot, &mut seeded_rng(seed)).unwrap();
        let dims = snapshot.validate().unwrap();

        let distinct: HashSet<Position> = plan.reserved.iter().copied().collect();
        prop_assert_eq!(distinct.len(), plan.reserved.len());
        prop_assert_eq!(plan.reserved.len(), plan.moving_ships());

        let occupied: HashSet<Position> = snapshot.ships.iter().map(|ship| ship.position).collect();
        let positions: HashMap<ShipId, Position> = snapshot
            .ships
            .iter()
            .map(|ship| (ship.id, ship.position))
            .collect();

        let mut destinations = HashSet::new();
        for decision in plan.decisions.iter().filter(|d| d.direction != Direction::Still) {
            let destination = dims.normalize(positions[&decision.ship].directional_offset(decision.direction));
            prop_assert!(!occupied.contains(&destination));
            prop_assert!(destinations.insert(destination));
        }
        prop_assert_eq!(destinations, distinct);
    }

    #[test]
    fn prop_spawn_only_onto_free_base(
        snapshot in arb_snapshot(),
        seed in any::<u64>(),
    ) {
        let plan = planner().plan_turn(&snapshot, &mut seeded_rng(seed)).unwrap();
        if plan.spawn {
            prop_assert!(snapshot.turn <= 200);
            prop_assert!(snapshot.bank >= 1000);
            prop_assert!(snapshot.ships.iter().all(|ship| ship.position != snapshot.home_base));
            prop_assert!(!plan.reserved.contains(&snapshot.home_base));
        }
    }

    #[test]
    fn prop_harvesting_ships_never_move(
        snapshot in arb_snapshot(),
        seed in any::<u64>(),
    ) {
        let plan = planner().plan_turn(&snapshot, &mut seeded_rng(seed)).unwrap();
        for decision in &plan.decisions {
            if decision.action == ShipAction::Harvest {
                prop_assert_eq!(decision.direction, Direction::Still);
            }
        }
    }

    #[test]
    fn prop_snapshot_ship_order_does_not_matter(
        snapshot in arb_snapshot(),
        seed in any::<u64>(),
    ) {
        let mut reordered = snapshot.clone();
        reordered.ships.reverse();

        let a = planner().plan_turn(&snapshot, &mut seeded_rng(seed)).unwrap();
        let b = planner().plan_turn(&reordered, &mut seeded_rng(seed)).unwrap();
        prop_assert_eq!(a.commands, b.commands);
    }

    #[test]
    fn prop_same_seed_same_game(
        snapshots in prop::collection::vec(arb_snapshot(), 1..6),
        seed in any::<u64>(),
    ) {
        let result = verify_planner_determinism(&planner(), &snapshots, seed, 3);
        prop_assert!(result.is_deterministic);
        prop_assert_eq!(find_first_divergence(&planner(), &snapshots, seed, seed), None);
    }

    #[test]
    fn prop_deadlocked_ship_holds(
        x in 1i32..9,
        y in 1i32..9,
        cargo in 0u32..=1000,
        seed in any::<u64>(),
    ) {
        let mut snapshot = SnapshotBuilder::new(10, 10)
            .uniform_halite(0)
            .ship(1, x, y, cargo)
            .build();
        snapshot.ships.extend(blockade(100, x, y));

        let plan = planner().plan_turn(&snapshot, &mut seeded_rng(seed)).unwrap();
        prop_assert_eq!(plan.decisions[0].direction, Direction::Still);
        prop_assert!(plan.reserved.is_empty());
    }
}

#[test]
fn test_full_ship_at_center_goes_north() {
    let snapshot = SnapshotBuilder::new(10, 10)
        .ship(1, 5, 5, 1000)
        .build();

    let plan = planner().plan_turn(&snapshot, &mut seeded_rng(0)).unwrap();

    assert_eq!(
        plan.commands,
        vec![Command::Move {
            ship: 1,
            direction: Direction::North
        }]
    );
    assert_eq!(plan.reserved, vec![Position::new(5, 4)]);
}

#[test]
fn test_production_scenarios() {
    let mut rng = seeded_rng(5);
    let late = SnapshotBuilder::new(8, 8).turn(201).bank(1_000_000).build();
    let poor = SnapshotBuilder::new(8, 8).turn(50).bank(999).build();
    let ready = SnapshotBuilder::new(8, 8).turn(50).bank(1000).build();

    assert!(!planner().plan_turn(&late, &mut rng).unwrap().spawn);
    assert!(!planner().plan_turn(&poor, &mut rng).unwrap().spawn);
    assert_eq!(
        planner().plan_turn(&ready, &mut rng).unwrap().commands,
        vec![Command::Spawn]
    );
}

#[test]
fn test_richest_strategy_falls_back_to_random() {
    let tuning = Tuning {
        relocation: RelocationStrategy::Richest,
        ..Tuning::default()
    };
    let planner = TurnPlanner::new(test_config_with(tuning));
    let snapshot = SnapshotBuilder::new(10, 10)
        .uniform_halite(0)
        .ship(1, 4, 4, 0)
        .build();

    let plan = planner.plan_turn(&snapshot, &mut seeded_rng(3)).unwrap();

    assert_eq!(plan.decisions[0].action, ShipAction::Relocate);
    assert_ne!(plan.decisions[0].direction, Direction::Still);
}

#[test]
fn test_parallel_games_agree() {
    let snapshots: Vec<Snapshot> = (1..=20)
        .map(|turn| {
            SnapshotBuilder::new(12, 12)
                .turn(turn)
                .bank(2000)
                .uniform_halite(50)
                .ship(1, 3, 3, 0)
                .ship(2, 4, 3, 0)
                .ship(3, 3, 4, 800)
                .ship_of(1, 9, 5, 5, 0)
                .build()
        })
        .collect();

    let result = run_parallel_games(&planner(), &snapshots, 1234, 4);
    result.assert_deterministic();
    assert_eq!(result.turns, 20);
}

#[test]
fn test_different_seeds_diverge() {
    let snapshots: Vec<Snapshot> = (1..=30)
        .map(|turn| {
            SnapshotBuilder::new(16, 16)
                .turn(turn)
                .uniform_halite(0)
                .ship(1, 8, 8, 0)
                .build()
        })
        .collect();

    assert!(find_first_divergence(&planner(), &snapshots, 1, 2).is_some());
}
