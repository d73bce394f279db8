//! Runtime configuration.
//!
//! Two sources feed the core:
//! - [`Constants`]: the host's game constants, looked up by name. A missing
//!   or malformed constant is fatal and surfaces before the first turn.
//! - [`Tuning`]: the bot's own policy knobs, optionally loaded from a RON
//!   file. Defaults reproduce the stock behavior.
//!
//! [`BotConfig::resolve`] combines both into the read-only values the turn
//! planner consults.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GameError, Result};
use crate::production::SpawnRule;

/// Well-known constant names published by the host.
pub mod keys {
    /// Maximum halite a ship can carry.
    pub const MAX_HALITE: &str = "MAX_ENERGY";
    /// Cost of building a new ship.
    pub const SHIP_COST: &str = "NEW_ENTITY_ENERGY_COST";
}

/// Host game constants, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constants {
    values: BTreeMap<String, Value>,
}

impl Constants {
    /// Parse the constants object sent in the first handshake line.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ConstantsParseError` if `json` is not an object.
    pub fn from_json(json: &str) -> Result<Self> {
        let values: BTreeMap<String, Value> = serde_json::from_str(json)
            .map_err(|e| GameError::ConstantsParseError(e.to_string()))?;
        Ok(Self { values })
    }

    /// Build constants from integer pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), Value::from(value)))
            .collect();
        Self { values }
    }

    /// Number of constants present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no constants were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up an integer constant.
    ///
    /// Accepts JSON integers and strings holding an integer.
    ///
    /// # Errors
    ///
    /// `GameError::MissingConstant` if the key is absent,
    /// `GameError::InvalidConstant` if the value is not an integer.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| GameError::MissingConstant(key.to_string()))?;

        let invalid = || GameError::InvalidConstant {
            key: key.to_string(),
            value: value.to_string(),
        };

        match value {
            Value::Number(number) => number.as_i64().ok_or_else(invalid),
            Value::String(text) => text.trim().parse().map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    /// Look up a constant that must fit in a `u32`.
    ///
    /// # Errors
    ///
    /// As [`Constants::get_int`], plus `GameError::InvalidConstant` when the
    /// value is negative or too large.
    pub fn get_u32(&self, key: &str) -> Result<u32> {
        let value = self.get_int(key)?;
        u32::try_from(value).map_err(|_| GameError::InvalidConstant {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// How a ship on a depleted cell picks its next cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelocationStrategy {
    /// Uniformly random free neighbor.
    #[default]
    RandomSafe,
    /// Free neighbor holding the most halite, random when none holds any.
    Richest,
}

/// Policy knobs. All ratios are integer fractions to keep decisions exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Cargo fraction (numerator) at which a ship heads home.
    pub return_numerator: u32,
    /// Cargo fraction (denominator) at which a ship heads home.
    pub return_denominator: u32,
    /// A cell is depleted below `max_halite / depleted_divisor`.
    pub depleted_divisor: u32,
    /// Last turn on which a ship may be spawned.
    pub spawn_turn_cutoff: u32,
    /// Cap on random draws when searching for a safe move.
    pub safe_move_attempts: u32,
    /// Relocation behavior for ships on depleted cells.
    pub relocation: RelocationStrategy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            return_numerator: 3,
            return_denominator: 4,
            depleted_divisor: 10,
            spawn_turn_cutoff: 200,
            safe_move_attempts: 16,
            relocation: RelocationStrategy::RandomSafe,
        }
    }
}

impl Tuning {
    /// Parse tuning from RON text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DataParseError` on malformed RON and
    /// `GameError::InvalidTuning` on inconsistent values.
    pub fn from_ron_str(contents: &str) -> Result<Self> {
        Self::parse(contents, "<inline>")
    }

    /// Load tuning from a RON file.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DataParseError` if the file cannot be read or
    /// parsed, and `GameError::InvalidTuning` on inconsistent values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    fn parse(contents: &str, source: &str) -> Result<Self> {
        let tuning: Self = ron::from_str(contents).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidTuning` describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.return_denominator == 0 {
            return Err(GameError::InvalidTuning(
                "return_denominator must be positive".into(),
            ));
        }
        if self.return_numerator > self.return_denominator {
            return Err(GameError::InvalidTuning(format!(
                "return fraction {}/{} exceeds 1",
                self.return_numerator, self.return_denominator
            )));
        }
        if self.depleted_divisor == 0 {
            return Err(GameError::InvalidTuning(
                "depleted_divisor must be positive".into(),
            ));
        }
        if self.safe_move_attempts == 0 {
            return Err(GameError::InvalidTuning(
                "safe_move_attempts must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Thresholds consulted by the move policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Ship cargo capacity.
    pub max_halite: u32,
    /// Return fraction numerator.
    pub return_numerator: u32,
    /// Return fraction denominator.
    pub return_denominator: u32,
    /// Depletion divisor.
    pub depleted_divisor: u32,
}

impl PolicyConfig {
    /// Whether `cargo` is enough to head home.
    #[must_use]
    pub fn should_return(&self, cargo: u32) -> bool {
        cargo >= self.max_halite
            || u64::from(cargo) * u64::from(self.return_denominator)
                >= u64::from(self.max_halite) * u64::from(self.return_numerator)
    }

    /// Cells holding less than this are considered depleted.
    #[must_use]
    pub const fn depletion_threshold(&self) -> u32 {
        self.max_halite / self.depleted_divisor
    }
}

/// Everything the turn planner needs, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotConfig {
    /// Ship cargo capacity.
    pub max_halite: u32,
    /// Ship construction cost.
    pub ship_cost: u32,
    /// Policy knobs.
    pub tuning: Tuning,
}

impl BotConfig {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidTuning` for bad tuning and
    /// `GameError::InvalidConstant` if `max_halite` is zero.
    pub fn new(max_halite: u32, ship_cost: u32, tuning: Tuning) -> Result<Self> {
        tuning.validate()?;
        if max_halite == 0 {
            return Err(GameError::InvalidConstant {
                key: keys::MAX_HALITE.to_string(),
                value: "0".to_string(),
            });
        }
        Ok(Self {
            max_halite,
            ship_cost,
            tuning,
        })
    }

    /// Resolve host constants and tuning into a configuration.
    ///
    /// # Errors
    ///
    /// Fails if a required constant is missing or malformed, or the tuning
    /// is invalid. Callers treat this as fatal.
    pub fn resolve(constants: &Constants, tuning: Tuning) -> Result<Self> {
        let max_halite = constants.get_u32(keys::MAX_HALITE)?;
        let ship_cost = constants.get_u32(keys::SHIP_COST)?;
        Self::new(max_halite, ship_cost, tuning)
    }

    /// Thresholds for the move policy.
    #[must_use]
    pub const fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            max_halite: self.max_halite,
            return_numerator: self.tuning.return_numerator,
            return_denominator: self.tuning.return_denominator,
            depleted_divisor: self.tuning.depleted_divisor,
        }
    }

    /// Fleet production rule.
    #[must_use]
    pub const fn spawn_rule(&self) -> SpawnRule {
        SpawnRule::new(self.tuning.spawn_turn_cutoff, self.ship_cost)
    }
}
