//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the turn planner produces
//! identical commands given identical snapshots and seeds.
//!
//! # Testing Strategy
//!
//! Replay verification only works if planning is a pure function of the
//! snapshot, the configuration, and the RNG state. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Ships are always processed in sorted id order.
//!
//! - **System randomness**: All random choices draw from the seeded
//!   [`hlt_core::turn::BotRng`].
//!
//! - **Snapshot order**: The host may list ships in any order; the planner
//!   must not depend on it.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use hlt_core::components::Command;
use hlt_core::snapshot::Snapshot;
use hlt_core::turn::{seeded_rng, BotRng, TurnPlanner};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns planned per run.
    pub turns: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic planner).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that planning was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Turn planning is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stepped process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `turns` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Plan `snapshots` in order from a fresh RNG and return every batch.
///
/// # Panics
///
/// Panics if a snapshot fails validation.
#[must_use]
pub fn plan_game(planner: &TurnPlanner, snapshots: &[Snapshot], seed: u64) -> Vec<Vec<Command>> {
    let mut rng = seeded_rng(seed);
    snapshots
        .iter()
        .map(|snapshot| {
            planner
                .plan_turn(snapshot, &mut rng)
                .expect("snapshot is valid")
                .commands
        })
        .collect()
}

/// A game in progress: the RNG, the next snapshot to plan, and every
/// batch planned so far.
struct GameRun {
    rng: BotRng,
    next: usize,
    batches: Vec<Vec<Command>>,
}

/// Plan the same game `runs` times with the same seed and compare.
///
/// Each step of the harness plans one snapshot, so the RNG is threaded
/// through the game exactly as the bot threads it through real turns.
///
/// # Example
///
/// ```ignore
/// use hlt_test_utils::determinism::verify_planner_determinism;
///
/// let result = verify_planner_determinism(&planner, &snapshots, 42, 5);
/// result.assert_deterministic();
/// ```
///
/// # Panics
///
/// Panics if a snapshot fails validation.
#[must_use]
pub fn verify_planner_determinism(
    planner: &TurnPlanner,
    snapshots: &[Snapshot],
    seed: u64,
    runs: usize,
) -> DeterminismResult {
    verify_determinism(
        runs,
        snapshots.len() as u64,
        || GameRun {
            rng: seeded_rng(seed),
            next: 0,
            batches: Vec::with_capacity(snapshots.len()),
        },
        |game| {
            let plan = planner
                .plan_turn(&snapshots[game.next], &mut game.rng)
                .expect("snapshot is valid");
            game.batches.push(plan.commands);
            game.next += 1;
        },
        |game| compute_hash(&game.batches),
    )
}

/// Plan the same game on `threads` scoped threads and collect the hashes.
///
/// Catches state accidentally shared between planner instances.
#[must_use]
pub fn run_parallel_games(
    planner: &TurnPlanner,
    snapshots: &[Snapshot],
    seed: u64,
    threads: usize,
) -> DeterminismResult {
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| compute_hash(&plan_game(planner, snapshots, seed))))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        turns: snapshots.len() as u64,
    }
}

/// Compare two seeds turn by turn and return the first turn index whose
/// commands differ.
#[must_use]
pub fn find_first_divergence(
    planner: &TurnPlanner,
    snapshots: &[Snapshot],
    seed_a: u64,
    seed_b: u64,
) -> Option<usize> {
    let a = plan_game(planner, snapshots, seed_a);
    let b = plan_game(planner, snapshots, seed_b);
    a.iter().zip(&b).position(|(x, y)| x != y)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for planner testing.
///
/// These strategies generate random but internally consistent snapshots:
/// dimensions are positive, the halite grid matches, and ships sit on
/// distinct in-bounds cells.
pub mod strategies {
    use proptest::prelude::*;
    use proptest::sample::subsequence;

    use hlt_core::components::{Ship, Structure, StructureKind};
    use hlt_core::position::{Dimensions, Position};
    use hlt_core::snapshot::Snapshot;

    /// Maximum number of ships placed by [`arb_snapshot`].
    pub const MAX_SHIPS: usize = 24;

    /// Generate map dimensions.
    ///
    /// Range: 1 to 64 per side
    pub fn arb_dimensions() -> impl Strategy<Value = Dimensions> {
        (1i32..=64, 1i32..=64).prop_filter_map("positive dimensions", |(w, h)| {
            Dimensions::new(w, h).ok()
        })
    }

    /// Generate an unnormalized position, including negatives.
    ///
    /// Range: -1000 to 1000 per axis
    pub fn arb_position() -> impl Strategy<Value = Position> {
        (-1000i32..=1000, -1000i32..=1000).prop_map(|(x, y)| Position::new(x, y))
    }

    /// Generate a consistent snapshot for player 0.
    ///
    /// Maps are 4 to 16 cells per side. Roughly half the ships belong to
    /// player 0, the rest to player 1. Ships are listed in descending id
    /// order so the planner's own ordering is exercised.
    pub fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
        (4i32..=16, 4i32..=16)
            .prop_flat_map(|(width, height)| {
                let cells = (width * height) as usize;
                let indices: Vec<usize> = (0..cells).collect();
                (
                    Just((width, height)),
                    prop::collection::vec(0u32..=1000, cells),
                    subsequence(indices, 0..=MAX_SHIPS.min(cells)),
                    prop::collection::vec((any::<bool>(), 0u32..=1000), MAX_SHIPS),
                    0..cells,
                    1u32..=400,
                    0u32..=5000,
                )
            })
            .prop_map(
                |((width, height), halite, occupied, traits, base, turn, bank)| {
                    let at = |index: usize| {
                        // Index is below width * height, which fits in i32.
                        let index = index as i32;
                        Position::new(index % width, index / width)
                    };
                    let mut ships: Vec<Ship> = occupied
                        .iter()
                        .zip(&traits)
                        .map(|(&index, &(mine, cargo))| {
                            let owner = if mine { 0 } else { 1 };
                            Ship::new(index as u32, owner, at(index), cargo)
                        })
                        .collect();
                    ships.reverse();

                    let home_base = at(base);
                    Snapshot {
                        turn,
                        me: 0,
                        width,
                        height,
                        halite,
                        ships,
                        structures: vec![Structure::new(0, StructureKind::Shipyard, home_base)],
                        home_base,
                        bank,
                    }
                },
            )
    }
}
