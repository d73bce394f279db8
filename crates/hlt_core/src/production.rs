//! Fleet production rule.
//!
//! One ship at most per turn, built at the home base.

use serde::{Deserialize, Serialize};

/// When to build a new ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnRule {
    /// Last turn on which spawning is allowed.
    pub turn_cutoff: u32,
    /// Halite charged per ship.
    pub ship_cost: u32,
}

impl SpawnRule {
    /// Create a spawn rule.
    #[must_use]
    pub const fn new(turn_cutoff: u32, ship_cost: u32) -> Self {
        Self {
            turn_cutoff,
            ship_cost,
        }
    }

    /// Whether to spawn this turn.
    ///
    /// `base_occupied` must cover both ships standing on the base and
    /// destinations reserved there this turn.
    #[must_use]
    pub const fn should_spawn(&self, turn: u32, bank: u32, base_occupied: bool) -> bool {
        turn <= self.turn_cutoff && bank >= self.ship_cost && !base_occupied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: SpawnRule = SpawnRule::new(200, 1000);

    #[test]
    fn test_spawn_allowed() {
        assert!(RULE.should_spawn(50, 1000, false));
        assert!(RULE.should_spawn(200, 5000, false));
    }

    #[test]
    fn test_no_spawn_after_cutoff() {
        assert!(!RULE.should_spawn(201, u32::MAX, false));
    }

    #[test]
    fn test_no_spawn_when_poor() {
        assert!(!RULE.should_spawn(50, 999, false));
    }

    #[test]
    fn test_no_spawn_on_occupied_base() {
        assert!(!RULE.should_spawn(50, 5000, true));
    }
}
