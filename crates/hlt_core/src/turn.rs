//! Turn orchestration.
//!
//! [`TurnPlanner::plan_turn`] turns one [`Snapshot`] into the command batch
//! for that turn:
//!
//! 1. Validate the snapshot and rebuild the [`GameMap`].
//! 2. Open a fresh [`TurnGrid`]; no reservation carries over from earlier
//!    turns.
//! 3. Walk owned ships in ascending [`ShipId`] order. Lower ids navigate
//!    first and therefore win contested cells.
//! 4. Emit exactly one `Move` per ship, then at most one `Spawn`.
//!
//! All randomness comes from the caller's RNG, so the same seed and the
//! same snapshots always produce the same commands.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{Command, Ship, ShipId};
use crate::config::{BotConfig, RelocationStrategy};
use crate::error::Result;
use crate::map::{GameMap, TurnGrid};
use crate::navigation::{naive_navigate, random_safe_direction, richest_safe_direction};
use crate::policy::{decide, ShipAction};
use crate::position::{Direction, Position};
use crate::snapshot::Snapshot;

/// RNG used for every random decision the bot makes.
pub type BotRng = ChaCha8Rng;

/// Create the bot RNG from a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> BotRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Outcome for one ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipDecision {
    /// Ship the decision applies to.
    pub ship: ShipId,
    /// Policy branch taken.
    pub action: ShipAction,
    /// Direction ordered.
    pub direction: Direction,
}

/// Everything decided for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPlan {
    /// Turn the plan was made for.
    pub turn: u32,
    /// Commands to send, moves in ascending ship order, spawn last.
    pub commands: Vec<Command>,
    /// Per-ship decisions in processing order.
    pub decisions: Vec<ShipDecision>,
    /// Cells reserved this turn, in claim order.
    pub reserved: Vec<Position>,
    /// Whether a spawn was ordered.
    pub spawn: bool,
}

impl TurnPlan {
    /// Number of ships ordered to move somewhere other than `Still`.
    #[must_use]
    pub fn moving_ships(&self) -> usize {
        self.decisions
            .iter()
            .filter(|decision| decision.direction != Direction::Still)
            .count()
    }
}

/// Plans turns for one game.
#[derive(Debug, Clone)]
pub struct TurnPlanner {
    config: BotConfig,
}

impl TurnPlanner {
    /// Create a planner for a resolved configuration.
    #[must_use]
    pub const fn new(config: BotConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Plan one turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot fails validation. No commands are
    /// produced in that case.
    pub fn plan_turn<R: Rng + ?Sized>(&self, snapshot: &Snapshot, rng: &mut R) -> Result<TurnPlan> {
        let map = GameMap::from_snapshot(snapshot)?;
        let mut grid = TurnGrid::new(&map);
        let policy = self.config.policy();

        let mut ships: Vec<&Ship> = snapshot.my_ships().collect();
        ships.sort_by_key(|ship| ship.id);

        let mut commands = Vec::with_capacity(ships.len() + 1);
        let mut decisions = Vec::with_capacity(ships.len());

        for ship in ships {
            let action = decide(ship, grid.at_ship(ship), &policy);
            let direction = match action {
                ShipAction::Return => naive_navigate(ship, snapshot.home_base, &mut grid),
                ShipAction::Relocate => self.relocate(ship, &mut grid, rng),
                ShipAction::Harvest => Direction::Still,
            };

            debug!(
                turn = snapshot.turn,
                ship = ship.id,
                cargo = ship.halite,
                ?action,
                ?direction,
                "ship decision"
            );

            commands.push(Command::Move {
                ship: ship.id,
                direction,
            });
            decisions.push(ShipDecision {
                ship: ship.id,
                action,
                direction,
            });
        }

        let base_occupied = grid.is_occupied(snapshot.home_base);
        let spawn = self
            .config
            .spawn_rule()
            .should_spawn(snapshot.turn, snapshot.bank, base_occupied);
        if spawn {
            commands.push(Command::Spawn);
        }

        debug!(
            turn = snapshot.turn,
            ships = decisions.len(),
            reserved = grid.reservation_count(),
            bank = snapshot.bank,
            base_occupied,
            spawn,
            "turn planned"
        );

        Ok(TurnPlan {
            turn: snapshot.turn,
            commands,
            decisions,
            reserved: grid.into_reserved_cells(),
            spawn,
        })
    }

    fn relocate<R: Rng + ?Sized>(&self, ship: &Ship, grid: &mut TurnGrid<'_>, rng: &mut R) -> Direction {
        let attempts = self.config.tuning.safe_move_attempts;
        match self.config.tuning.relocation {
            RelocationStrategy::RandomSafe => random_safe_direction(ship, grid, rng, attempts),
            RelocationStrategy::Richest => match richest_safe_direction(ship, grid) {
                Direction::Still => random_safe_direction(ship, grid, rng, attempts),
                direction => direction,
            },
        }
    }
}
