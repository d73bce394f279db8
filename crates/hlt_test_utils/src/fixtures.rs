//! Test fixtures and helpers.
//!
//! Sample host constants and a builder for consistent snapshots.

use hlt_core::components::{PlayerId, Ship, ShipId, Structure, StructureKind};
use hlt_core::config::{BotConfig, Constants, Tuning};
use hlt_core::position::Position;
use hlt_core::snapshot::Snapshot;

/// Constants line as sent by a real host at the start of a game.
pub const SAMPLE_CONSTANTS_JSON: &str = r#"{"CAPTURE_ENABLED":false,"CAPTURE_RADIUS":3,"DEFAULT_MAP_HEIGHT":32,"DEFAULT_MAP_WIDTH":32,"DROPOFF_COST":4000,"DROPOFF_PENALTY_RATIO":4,"EXTRACT_RATIO":4,"FACTOR_EXP_1":2.0,"FACTOR_EXP_2":2.0,"INITIAL_ENERGY":5000,"INSPIRATION_ENABLED":true,"INSPIRATION_RADIUS":4,"INSPIRATION_SHIP_COUNT":2,"INSPIRED_BONUS_MULTIPLIER":2.0,"INSPIRED_EXTRACT_RATIO":4,"INSPIRED_MOVE_COST_RATIO":10,"MAX_CELL_PRODUCTION":1000,"MAX_ENERGY":1000,"MAX_PLAYERS":16,"MAX_TURNS":400,"MAX_TURN_THRESHOLD":64,"MIN_CELL_PRODUCTION":900,"MIN_TURNS":400,"MIN_TURN_THRESHOLD":32,"MOVE_COST_RATIO":10,"NEW_ENTITY_ENERGY_COST":1000,"PERSISTENCE":0.7,"SHIPS_ABOVE_FOR_CAPTURE":3,"STRICT_ERRORS":false,"game_seed":1538924851}"#;

/// Parsed [`SAMPLE_CONSTANTS_JSON`].
///
/// # Panics
///
/// Never in practice; the sample is valid JSON.
#[must_use]
pub fn sample_constants() -> Constants {
    Constants::from_json(SAMPLE_CONSTANTS_JSON).expect("sample constants are valid")
}

/// Configuration with stock host values (cargo 1000, ship cost 1000) and
/// default tuning.
///
/// # Panics
///
/// Never in practice; the values are valid.
#[must_use]
pub fn test_config() -> BotConfig {
    test_config_with(Tuning::default())
}

/// Stock host values with custom tuning.
///
/// # Panics
///
/// Panics if `tuning` is invalid.
#[must_use]
pub fn test_config_with(tuning: Tuning) -> BotConfig {
    BotConfig::new(1000, 1000, tuning).expect("test tuning is valid")
}

/// Builder for snapshots.
///
/// Defaults: turn 1, player 0, home base at the origin with a shipyard,
/// bank 0, every cell holding 500 halite.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    /// Start a snapshot on a `width` x `height` map.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let cells = usize::try_from(width.max(0) * height.max(0)).unwrap_or(0);
        Self {
            snapshot: Snapshot {
                turn: 1,
                me: 0,
                width,
                height,
                halite: vec![500; cells],
                ships: Vec::new(),
                structures: Vec::new(),
                home_base: Position::new(0, 0),
                bank: 0,
            },
        }
    }

    /// Set the turn number.
    #[must_use]
    pub fn turn(mut self, turn: u32) -> Self {
        self.snapshot.turn = turn;
        self
    }

    /// Set the controlling player.
    #[must_use]
    pub fn me(mut self, player: PlayerId) -> Self {
        self.snapshot.me = player;
        self
    }

    /// Set the bank balance.
    #[must_use]
    pub fn bank(mut self, bank: u32) -> Self {
        self.snapshot.bank = bank;
        self
    }

    /// Move the home base.
    #[must_use]
    pub fn home_base(mut self, x: i32, y: i32) -> Self {
        self.snapshot.home_base = Position::new(x, y);
        self
    }

    /// Put the same amount of halite on every cell.
    #[must_use]
    pub fn uniform_halite(mut self, halite: u32) -> Self {
        self.snapshot.halite.fill(halite);
        self
    }

    /// Set the halite on one cell.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the map.
    #[must_use]
    pub fn halite_at(mut self, x: i32, y: i32, halite: u32) -> Self {
        let index = usize::try_from(y * self.snapshot.width + x).expect("cell inside map");
        self.snapshot.halite[index] = halite;
        self
    }

    /// Add a ship owned by the controlling player.
    #[must_use]
    pub fn ship(self, id: ShipId, x: i32, y: i32, cargo: u32) -> Self {
        let owner = self.snapshot.me;
        self.ship_of(owner, id, x, y, cargo)
    }

    /// Add a ship owned by `owner`.
    #[must_use]
    pub fn ship_of(mut self, owner: PlayerId, id: ShipId, x: i32, y: i32, cargo: u32) -> Self {
        self.snapshot
            .ships
            .push(Ship::new(id, owner, Position::new(x, y), cargo));
        self
    }

    /// Add a dropoff.
    #[must_use]
    pub fn dropoff(mut self, owner: PlayerId, x: i32, y: i32) -> Self {
        self.snapshot.structures.push(Structure::new(
            owner,
            StructureKind::Dropoff,
            Position::new(x, y),
        ));
        self
    }

    /// Finish the snapshot, adding the controlling player's shipyard.
    #[must_use]
    pub fn build(mut self) -> Snapshot {
        self.snapshot.structures.insert(
            0,
            Structure::new(
                self.snapshot.me,
                StructureKind::Shipyard,
                self.snapshot.home_base,
            ),
        );
        self.snapshot
    }
}

/// Ships standing on every neighbor of `(x, y)`, owned by player 1.
///
/// Ids start at `first_id`. Positions are not wrapped, so keep the center
/// off the map edge.
#[must_use]
pub fn blockade(first_id: ShipId, x: i32, y: i32) -> Vec<Ship> {
    (first_id..)
        .zip(Position::new(x, y).surrounding_cardinals())
        .map(|(id, position)| Ship::new(id, 1, position, 0))
        .collect()
}
