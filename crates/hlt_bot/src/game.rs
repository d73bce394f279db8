//! Game state tracked across frames.
//!
//! The host only sends halite for cells that changed, so the halite grid
//! is the one piece of state that persists between turns. Ships and
//! dropoffs are replaced wholesale every frame: a ship missing from a
//! frame no longer exists.

use std::collections::BTreeMap;

use hlt_core::components::{PlayerId, Ship, Structure, StructureKind};
use hlt_core::config::Constants;
use hlt_core::position::Position;
use hlt_core::snapshot::Snapshot;

use crate::protocol::{Frame, Handshake, ProtocolError, ProtocolResult};

/// One player's state as of the latest frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// Player id.
    pub id: PlayerId,
    /// Shipyard position.
    pub shipyard: Position,
    /// Banked halite.
    pub halite: u32,
    /// Ships alive this turn.
    pub ships: Vec<Ship>,
    /// Dropoff positions.
    pub dropoffs: Vec<Position>,
}

/// Everything the bot knows about the game.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Host constants from the handshake.
    pub constants: Constants,
    /// The player this bot controls.
    pub me: PlayerId,
    /// Map width.
    pub width: i32,
    /// Map height.
    pub height: i32,
    /// Current halite per cell, row-major.
    pub halite: Vec<u32>,
    /// Players keyed by id.
    pub players: BTreeMap<PlayerId, PlayerState>,
    /// Turn number of the latest frame, 0 before the first.
    pub turn: u32,
}

impl GameState {
    /// Initial state from the handshake.
    #[must_use]
    pub fn from_handshake(handshake: Handshake) -> Self {
        let players = handshake
            .shipyards
            .iter()
            .map(|&(id, shipyard)| {
                (
                    id,
                    PlayerState {
                        id,
                        shipyard,
                        halite: 0,
                        ships: Vec::new(),
                        dropoffs: Vec::new(),
                    },
                )
            })
            .collect();

        Self {
            constants: handshake.constants,
            me: handshake.my_id,
            width: handshake.width,
            height: handshake.height,
            halite: handshake.halite,
            players,
            turn: 0,
        }
    }

    /// Number of players announced in the handshake.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// This bot's player state, if the handshake announced it.
    #[must_use]
    pub fn my_player(&self) -> Option<&PlayerState> {
        self.players.get(&self.me)
    }

    /// Apply a frame.
    ///
    /// # Errors
    /// Fails if the frame names a player the handshake did not announce, or
    /// updates a cell outside the map. The state is left unchanged on error.
    pub fn apply_frame(&mut self, frame: Frame) -> ProtocolResult<()> {
        for player in &frame.players {
            if !self.players.contains_key(&player.id) {
                return Err(ProtocolError::UnknownPlayer(player.id));
            }
        }

        let mut updates = Vec::with_capacity(frame.cell_updates.len());
        for &(position, halite) in &frame.cell_updates {
            let index = self.cell_index(position).ok_or(ProtocolError::CellOutOfBounds {
                position,
                width: self.width,
                height: self.height,
            })?;
            updates.push((index, halite));
        }

        for (index, halite) in updates {
            self.halite[index] = halite;
        }

        for update in frame.players {
            if let Some(player) = self.players.get_mut(&update.id) {
                player.halite = update.halite;
                player.ships = update.ships;
                player.dropoffs = update
                    .dropoffs
                    .into_iter()
                    .map(|(_, position)| position)
                    .collect();
            }
        }

        self.turn = frame.turn;
        Ok(())
    }

    /// Build the snapshot handed to the decision core.
    ///
    /// Positions are passed through as reported; the core rejects any that
    /// lie outside the map.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        let mut ships = Vec::new();
        let mut structures = Vec::new();
        for player in self.players.values() {
            ships.extend(player.ships.iter().copied());
            structures.push(Structure::new(
                player.id,
                StructureKind::Shipyard,
                player.shipyard,
            ));
            structures.extend(
                player
                    .dropoffs
                    .iter()
                    .map(|&position| Structure::new(player.id, StructureKind::Dropoff, position)),
            );
        }

        let me = self.my_player();
        Snapshot {
            turn: self.turn,
            me: self.me,
            width: self.width,
            height: self.height,
            halite: self.halite.clone(),
            ships,
            structures,
            home_base: me.map_or(Position::new(-1, -1), |player| player.shipyard),
            bank: me.map_or(0, |player| player.halite),
        }
    }

    fn cell_index(&self, position: Position) -> Option<usize> {
        let inside = position.x >= 0 && position.x < self.width && position.y >= 0 && position.y < self.height;
        if !inside {
            return None;
        }
        usize::try_from(position.y * self.width + position.x).ok()
    }
}
