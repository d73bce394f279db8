//! Game loop.
//!
//! The runner owns both ends of the host connection. One turn is:
//! read frame, update [`GameState`], plan with the core, write commands.
//! The shutdown flag is only checked between turns, so a turn that has
//! started is always answered.

use std::io::{BufRead, Write};
use std::time::Instant;

use tracing::{debug, info};

use hlt_core::components::PlayerId;
use hlt_core::config::{BotConfig, Tuning};
use hlt_core::replay::TurnRecording;
use hlt_core::turn::{seeded_rng, BotRng, TurnPlan, TurnPlanner};

use crate::error::Result;
use crate::game::GameState;
use crate::protocol::{read_frame, read_handshake, write_commands, write_name, LineReader, ProtocolError};
use crate::shutdown::ShutdownSignal;

/// Totals for a finished game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Turns answered.
    pub turns: u32,
    /// Move commands sent, summed over turns.
    pub moves: usize,
    /// Spawn commands sent.
    pub spawns: u32,
    /// Whether the loop stopped because of a shutdown request.
    pub interrupted: bool,
}

/// Plays one game over a host connection.
#[derive(Debug)]
pub struct BotRunner<R, W> {
    reader: LineReader<R>,
    output: W,
    state: GameState,
    planner: TurnPlanner,
    rng: BotRng,
    seed: u64,
    recording: Option<TurnRecording>,
}

impl<R: BufRead, W: Write> BotRunner<R, W> {
    /// Read the handshake and resolve the configuration.
    ///
    /// Nothing is written to the host yet; call [`BotRunner::ready`] once
    /// start-up work is done.
    ///
    /// # Errors
    /// Fails on a malformed handshake, missing or invalid constants, bad
    /// tuning, or a handshake that does not announce this bot's player.
    pub fn connect(input: R, output: W, tuning: Tuning, seed: u64) -> Result<Self> {
        let mut reader = LineReader::new(input);
        let handshake = read_handshake(&mut reader)?;
        let config = BotConfig::resolve(&handshake.constants, tuning)?;
        let state = GameState::from_handshake(handshake);
        if state.my_player().is_none() {
            return Err(ProtocolError::UnknownPlayer(state.me).into());
        }

        Ok(Self {
            reader,
            output,
            state,
            planner: TurnPlanner::new(config),
            rng: seeded_rng(seed),
            seed,
            recording: None,
        })
    }

    /// The player this bot controls.
    #[must_use]
    pub const fn player_id(&self) -> PlayerId {
        self.state.me
    }

    /// Current game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &BotConfig {
        self.planner.config()
    }

    /// Start recording every turn under `bot_name`.
    pub fn record_as(&mut self, bot_name: &str) {
        self.recording = Some(TurnRecording::new(bot_name, self.seed, *self.planner.config()));
    }

    /// Take the recording, leaving recording disabled.
    pub fn take_recording(&mut self) -> Option<TurnRecording> {
        self.recording.take()
    }

    /// Send the bot name. The host starts the turn clock after this.
    ///
    /// # Errors
    /// Returns any write error.
    pub fn ready(&mut self, name: &str) -> Result<()> {
        write_name(&mut self.output, name)?;
        info!(
            player = self.state.me,
            seed = self.seed,
            width = self.state.width,
            height = self.state.height,
            players = self.state.num_players(),
            "Successfully created bot {name}"
        );
        Ok(())
    }

    /// Play one turn. Returns `None` when the host has closed the stream.
    ///
    /// # Errors
    /// Fails on malformed frames, snapshots the core rejects, or write
    /// errors.
    pub fn play_turn(&mut self) -> Result<Option<TurnPlan>> {
        let Some(frame) = read_frame(&mut self.reader, self.state.num_players())? else {
            return Ok(None);
        };
        let started = Instant::now();

        self.state.apply_frame(frame)?;
        let snapshot = self.state.to_snapshot();
        let plan = self.planner.plan_turn(&snapshot, &mut self.rng)?;
        write_commands(&mut self.output, &plan.commands)?;

        if let Some(recording) = self.recording.as_mut() {
            recording.record(snapshot, plan.commands.clone());
        }

        debug!(
            turn = plan.turn,
            ships = plan.decisions.len(),
            moving = plan.moving_ships(),
            spawn = plan.spawn,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Turn answered"
        );
        Ok(Some(plan))
    }

    /// Play until the host closes the stream or shutdown is requested.
    ///
    /// # Errors
    /// Stops at the first failing turn.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        loop {
            if shutdown.is_requested() {
                info!(turn = self.state.turn, "Stopping before next turn");
                summary.interrupted = true;
                break;
            }

            let Some(plan) = self.play_turn()? else {
                info!(turn = self.state.turn, "Host closed the connection");
                break;
            };

            summary.turns += 1;
            summary.moves += plan.decisions.len();
            if plan.spawn {
                summary.spawns += 1;
            }
        }

        Ok(summary)
    }
}
