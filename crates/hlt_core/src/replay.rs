//! Turn recording and offline verification.
//!
//! A recording stores the seed, the resolved configuration, and every
//! snapshot the bot saw together with the commands it sent. Because all
//! randomness flows from the seed, re-planning the snapshots in order must
//! reproduce the recorded commands exactly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::Command;
use crate::config::BotConfig;
use crate::error::{GameError, Result};
use crate::snapshot::Snapshot;
use crate::turn::{seeded_rng, TurnPlanner};

/// Recording file format version.
pub const RECORDING_VERSION: u32 = 1;

/// One turn as the bot saw and answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedTurn {
    /// World state at the start of the turn.
    pub snapshot: Snapshot,
    /// Commands sent for the turn.
    pub commands: Vec<Command>,
}

/// A complete game recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecording {
    /// Recording format version.
    pub version: u32,
    /// Name the bot reported in the handshake.
    pub bot_name: String,
    /// Seed of the bot RNG.
    pub seed: u64,
    /// Configuration the planner ran with.
    pub config: BotConfig,
    /// Turns in play order.
    pub turns: Vec<RecordedTurn>,
}

impl TurnRecording {
    /// Start an empty recording.
    pub fn new(bot_name: impl Into<String>, seed: u64, config: BotConfig) -> Self {
        Self {
            version: RECORDING_VERSION,
            bot_name: bot_name.into(),
            seed,
            config,
            turns: Vec::new(),
        }
    }

    /// Append a turn.
    pub fn record(&mut self, snapshot: Snapshot, commands: Vec<Command>) {
        self.turns.push(RecordedTurn { snapshot, commands });
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Save the recording to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::RecordingError(format!("failed to serialize recording: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::RecordingError(format!("failed to write recording: {e}")))?;
        Ok(())
    }

    /// Load a recording from a file.
    ///
    /// # Errors
    /// Returns an error if reading or deserialization fails, or the file
    /// was written by a different format version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::RecordingError(format!("failed to read recording: {e}")))?;
        let recording: Self = bincode::deserialize(&bytes).map_err(|e| {
            GameError::RecordingError(format!("failed to deserialize recording: {e}"))
        })?;

        if recording.version != RECORDING_VERSION {
            return Err(GameError::RecordingError(format!(
                "recording version mismatch: expected {RECORDING_VERSION}, got {}",
                recording.version
            )));
        }

        Ok(recording)
    }

    /// Re-plan every turn and compare with the recorded commands.
    ///
    /// Returns the number of the first turn whose commands differ, or
    /// `None` when the whole game reproduces.
    ///
    /// # Errors
    /// Returns an error if a recorded snapshot no longer validates.
    pub fn verify(&self) -> Result<Option<u32>> {
        let planner = TurnPlanner::new(self.config);
        let mut rng = seeded_rng(self.seed);

        for recorded in &self.turns {
            let plan = planner.plan_turn(&recorded.snapshot, &mut rng)?;
            if plan.commands != recorded.commands {
                return Ok(Some(recorded.snapshot.turn));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Ship;
    use crate::config::Tuning;
    use crate::position::{Direction, Position};

    fn snapshot(turn: u32) -> Snapshot {
        Snapshot {
            turn,
            me: 0,
            width: 8,
            height: 8,
            halite: vec![0; 64],
            ships: vec![
                Ship::new(1, 0, Position::new(2, 2), 0),
                Ship::new(2, 0, Position::new(5, 5), 900),
            ],
            structures: Vec::new(),
            home_base: Position::new(0, 0),
            bank: 0,
        }
    }

    fn recorded_game(turns: u32) -> TurnRecording {
        let config = BotConfig::new(1000, 1000, Tuning::default()).unwrap();
        let planner = TurnPlanner::new(config);
        let mut rng = seeded_rng(11);
        let mut recording = TurnRecording::new("test-bot", 11, config);
        for turn in 1..=turns {
            let snap = snapshot(turn);
            let plan = planner.plan_turn(&snap, &mut rng).unwrap();
            recording.record(snap, plan.commands);
        }
        recording
    }

    #[test]
    fn test_recording_verifies() {
        let recording = recorded_game(5);
        assert_eq!(recording.turn_count(), 5);
        assert_eq!(recording.verify().unwrap(), None);
    }

    #[test]
    fn test_tampered_recording_reports_turn() {
        let mut recording = recorded_game(5);
        recording.turns[2].commands = vec![Command::Move {
            ship: 1,
            direction: Direction::Still,
        }];
        assert_eq!(recording.verify().unwrap(), Some(3));
    }

    #[test]
    fn test_bincode_encoding() {
        let recording = recorded_game(3);
        let bytes = bincode::serialize(&recording).unwrap();
        let decoded: TurnRecording = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, recording);
    }
}
