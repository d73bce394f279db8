//! Line-based text protocol spoken with the game host.
//!
//! # Handshake (host -> bot, once)
//!
//! ```text
//! {"MAX_ENERGY":1000,"NEW_ENTITY_ENERGY_COST":1000,...}   constants
//! 2 0                                                    num_players my_id
//! 0 8 8                                                  player_id shipyard_x shipyard_y
//! 1 23 8
//! 32 32                                                  width height
//! 10 0 231 ...                                           height rows of width values
//! ```
//!
//! The bot answers with its name on one line.
//!
//! # Frame (host -> bot, every turn)
//!
//! ```text
//! 17                                                     turn number
//! 0 2 1 4000                                             player_id ships dropoffs halite
//! 3 8 9 120                                              ship_id x y halite
//! 5 10 8 0
//! 1 20 20                                                dropoff_id x y
//! 1 0 0 0                                                (next player...)
//! 2                                                      updated cells
//! 8 9 362                                                x y halite
//! 10 8 0
//! ```
//!
//! # Commands (bot -> host, every turn)
//!
//! ```text
//! m 3 n m 5 o g
//! ```
//!
//! `m <ship> <n|s|e|w|o>` moves, `g` spawns, `c <ship>` builds a dropoff.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use thiserror::Error;

use hlt_core::components::{Command, PlayerId, Ship, ShipId};
use hlt_core::config::Constants;
use hlt_core::position::Position;

/// Malformed or truncated host input.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The host closed the stream in the middle of a message.
    #[error("Unexpected end of input while reading {expected} (line {line})")]
    UnexpectedEof {
        /// What the reader was waiting for.
        expected: &'static str,
        /// Line number where input ended.
        line: usize,
    },

    /// A line did not have the expected shape.
    #[error("Malformed {expected} on line {line}: {found:?}")]
    Malformed {
        /// What the reader was parsing.
        expected: &'static str,
        /// Offending line number.
        line: usize,
        /// Offending line text.
        found: String,
    },

    /// The constants line was not a JSON object.
    #[error("Invalid constants line: {0}")]
    InvalidConstants(String),

    /// A player id in a frame was not announced in the handshake.
    #[error("Unknown player {0} in frame")]
    UnknownPlayer(PlayerId),

    /// A cell update points outside the map.
    #[error("Cell update at {position} outside {width}x{height} map")]
    CellOutOfBounds {
        /// Reported position.
        position: Position,
        /// Map width.
        width: i32,
        /// Map height.
        height: i32,
    },

    /// Reading from the host failed.
    #[error("Failed to read from host: {0}")]
    Io(#[from] io::Error),
}

/// Protocol result alias.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Reads host input one line at a time and keeps track of line numbers
/// for error messages.
#[derive(Debug)]
pub struct LineReader<R> {
    input: R,
    line: usize,
    buffer: String,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered reader.
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            buffer: String::new(),
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line
    }

    /// Read the next line, or `None` at end of input.
    ///
    /// # Errors
    /// Returns `ProtocolError::Io` if the read fails.
    pub fn try_next_line(&mut self) -> ProtocolResult<Option<&str>> {
        self.buffer.clear();
        if self.input.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(self.buffer.trim_end_matches(['\r', '\n'])))
    }

    /// Read the next line, treating end of input as an error.
    ///
    /// # Errors
    /// Returns `ProtocolError::UnexpectedEof` at end of input.
    pub fn next_line(&mut self, expected: &'static str) -> ProtocolResult<&str> {
        let line = self.line;
        self.try_next_line()?
            .ok_or(ProtocolError::UnexpectedEof {
                expected,
                line: line + 1,
            })
    }

    /// Read a line of exactly `N` whitespace-separated values.
    ///
    /// # Errors
    /// Returns `ProtocolError::Malformed` if the count or a value is wrong.
    pub fn next_values<T: FromStr, const N: usize>(
        &mut self,
        expected: &'static str,
    ) -> ProtocolResult<[T; N]> {
        let text = self.next_line(expected)?.to_owned();
        let line = self.line;
        let values: Vec<T> = parse_values(&text, expected, line)?;
        values.try_into().map_err(|_| ProtocolError::Malformed {
            expected,
            line,
            found: text,
        })
    }

    /// Read a line of whitespace-separated values of any length.
    ///
    /// # Errors
    /// Returns `ProtocolError::Malformed` if a value does not parse.
    pub fn next_row<T: FromStr>(&mut self, expected: &'static str) -> ProtocolResult<Vec<T>> {
        let text = self.next_line(expected)?.to_owned();
        parse_values(&text, expected, self.line)
    }
}

fn parse_values<T: FromStr>(text: &str, expected: &'static str, line: usize) -> ProtocolResult<Vec<T>> {
    text.split_whitespace()
        .map(|token| token.parse::<T>())
        .collect::<Result<Vec<T>, _>>()
        .map_err(|_| ProtocolError::Malformed {
            expected,
            line,
            found: text.to_string(),
        })
}

/// Initial game description.
#[derive(Debug, Clone)]
pub struct Handshake {
    /// Host game constants.
    pub constants: Constants,
    /// The player this bot controls.
    pub my_id: PlayerId,
    /// Every player's shipyard, in announcement order.
    pub shipyards: Vec<(PlayerId, Position)>,
    /// Map width.
    pub width: i32,
    /// Map height.
    pub height: i32,
    /// Initial halite per cell, row-major.
    pub halite: Vec<u32>,
}

/// Read the handshake.
///
/// # Errors
/// Fails on truncated input, malformed lines, a non-object constants line,
/// or a halite grid that does not match the announced size.
pub fn read_handshake<R: BufRead>(reader: &mut LineReader<R>) -> ProtocolResult<Handshake> {
    let constants_line = reader.next_line("constants")?;
    let constants = Constants::from_json(constants_line)
        .map_err(|e| ProtocolError::InvalidConstants(e.to_string()))?;

    let [num_players, my_id]: [PlayerId; 2] = reader.next_values("player count and id")?;

    let mut shipyards = Vec::new();
    for _ in 0..num_players {
        let [player, x, y]: [i64; 3] = reader.next_values("player shipyard")?;
        let line = reader.line_number();
        shipyards.push((
            to_id(player, "player shipyard", line)?,
            Position::new(
                to_coord(x, "player shipyard", line)?,
                to_coord(y, "player shipyard", line)?,
            ),
        ));
    }

    let [width, height]: [i32; 2] = reader.next_values("map size")?;
    let rows = usize::try_from(height).unwrap_or(0);
    let columns = usize::try_from(width).unwrap_or(0);

    let mut halite = Vec::new();
    for _ in 0..rows {
        let row: Vec<u32> = reader.next_row("halite row")?;
        if row.len() != columns {
            return Err(ProtocolError::Malformed {
                expected: "halite row",
                line: reader.line_number(),
                found: format!("{} values, expected {columns}", row.len()),
            });
        }
        halite.extend(row);
    }

    Ok(Handshake {
        constants,
        my_id,
        shipyards,
        width,
        height,
        halite,
    })
}

/// One player's entities in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerFrame {
    /// Player id.
    pub id: PlayerId,
    /// Banked halite.
    pub halite: u32,
    /// Ships alive this turn.
    pub ships: Vec<Ship>,
    /// Dropoffs as `(id, position)`.
    pub dropoffs: Vec<(u32, Position)>,
}

/// One turn of host input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Turn number.
    pub turn: u32,
    /// Per-player entities, in host order.
    pub players: Vec<PlayerFrame>,
    /// Changed cells as `(position, new halite)`.
    pub cell_updates: Vec<(Position, u32)>,
}

/// Read one frame. Returns `None` if the host closed the stream between
/// turns, which is how a game ends.
///
/// # Errors
/// Fails on input that ends mid-frame or malformed lines.
pub fn read_frame<R: BufRead>(
    reader: &mut LineReader<R>,
    num_players: usize,
) -> ProtocolResult<Option<Frame>> {
    let Some(text) = reader.try_next_line()?.map(|text| text.trim().to_owned()) else {
        return Ok(None);
    };
    let turn: u32 = text.parse().map_err(|_| ProtocolError::Malformed {
        expected: "turn number",
        line: reader.line_number(),
        found: text,
    })?;

    let mut players = Vec::with_capacity(num_players);
    for _ in 0..num_players {
        let [id, num_ships, num_dropoffs, halite]: [u32; 4] = reader.next_values("player header")?;

        let mut ships = Vec::new();
        for _ in 0..num_ships {
            let [ship_id, x, y, cargo]: [i64; 4] = reader.next_values("ship")?;
            let line = reader.line_number();
            ships.push(Ship::new(
                to_id(ship_id, "ship", line)?,
                id,
                Position::new(to_coord(x, "ship", line)?, to_coord(y, "ship", line)?),
                to_id(cargo, "ship", line)?,
            ));
        }

        let mut dropoffs = Vec::new();
        for _ in 0..num_dropoffs {
            let [dropoff_id, x, y]: [i64; 3] = reader.next_values("dropoff")?;
            let line = reader.line_number();
            dropoffs.push((
                to_id(dropoff_id, "dropoff", line)?,
                Position::new(to_coord(x, "dropoff", line)?, to_coord(y, "dropoff", line)?),
            ));
        }

        players.push(PlayerFrame {
            id,
            halite,
            ships,
            dropoffs,
        });
    }

    let [num_updates]: [u32; 1] = reader.next_values("cell update count")?;
    let mut cell_updates = Vec::new();
    for _ in 0..num_updates {
        let [x, y, halite]: [i64; 3] = reader.next_values("cell update")?;
        let line = reader.line_number();
        cell_updates.push((
            Position::new(to_coord(x, "cell update", line)?, to_coord(y, "cell update", line)?),
            to_id(halite, "cell update", line)?,
        ));
    }

    Ok(Some(Frame {
        turn,
        players,
        cell_updates,
    }))
}

fn to_id(value: i64, expected: &'static str, line: usize) -> ProtocolResult<u32> {
    u32::try_from(value).map_err(|_| ProtocolError::Malformed {
        expected,
        line,
        found: value.to_string(),
    })
}

fn to_coord(value: i64, expected: &'static str, line: usize) -> ProtocolResult<i32> {
    i32::try_from(value).map_err(|_| ProtocolError::Malformed {
        expected,
        line,
        found: value.to_string(),
    })
}

/// Wire form of one command.
#[must_use]
pub fn encode_command(command: &Command) -> String {
    match command {
        Command::Move { ship, direction } => format!("m {ship} {}", direction.to_char()),
        Command::Spawn => "g".to_string(),
        Command::ConstructDropoff { ship } => format!("c {ship}"),
    }
}

/// Wire form of a turn's commands, without the trailing newline.
#[must_use]
pub fn encode_commands(commands: &[Command]) -> String {
    commands
        .iter()
        .map(encode_command)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Send a turn's commands and flush.
///
/// # Errors
/// Returns any write error.
pub fn write_commands<W: Write>(output: &mut W, commands: &[Command]) -> io::Result<()> {
    writeln!(output, "{}", encode_commands(commands))?;
    output.flush()
}

/// Send the bot name and flush.
///
/// # Errors
/// Returns any write error.
pub fn write_name<W: Write>(output: &mut W, name: &str) -> io::Result<()> {
    writeln!(output, "{name}")?;
    output.flush()
}

/// Parse one wire command. Used when checking logs and in tests.
#[must_use]
pub fn decode_command(tokens: &[&str]) -> Option<Command> {
    match tokens {
        ["g"] => Some(Command::Spawn),
        ["m", ship, direction] => {
            let ship: ShipId = ship.parse().ok()?;
            let mut chars = direction.chars();
            let direction = hlt_core::position::Direction::from_char(chars.next()?)?;
            chars.next().is_none().then_some(Command::Move { ship, direction })
        }
        ["c", ship] => Some(Command::ConstructDropoff {
            ship: ship.parse().ok()?,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlt_core::position::Direction;
    use std::io::Cursor;

    const HANDSHAKE: &str = "{\"MAX_ENERGY\":1000,\"NEW_ENTITY_ENERGY_COST\":1000}\n\
                             2 1\n\
                             0 1 1\n\
                             1 2 2\n\
                             4 3\n\
                             1 2 3 4\n\
                             5 6 7 8\n\
                             9 10 11 12\n";

    fn reader(text: &str) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_read_handshake() {
        let mut input = reader(HANDSHAKE);
        let handshake = read_handshake(&mut input).unwrap();

        assert_eq!(handshake.my_id, 1);
        assert_eq!(
            handshake.shipyards,
            vec![(0, Position::new(1, 1)), (1, Position::new(2, 2))]
        );
        assert_eq!((handshake.width, handshake.height), (4, 3));
        assert_eq!(handshake.halite.len(), 12);
        assert_eq!(handshake.halite[11], 12);
        assert_eq!(handshake.constants.get_int("MAX_ENERGY").unwrap(), 1000);
    }

    #[test]
    fn test_handshake_short_row_rejected() {
        let text = HANDSHAKE.replace("5 6 7 8", "5 6 7");
        let err = read_handshake(&mut reader(&text)).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { line: 7, .. }));
    }

    #[test]
    fn test_handshake_truncated() {
        let text = HANDSHAKE.lines().take(5).collect::<Vec<_>>().join("\n");
        assert!(matches!(
            read_handshake(&mut reader(&text)),
            Err(ProtocolError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_handshake_bad_constants() {
        let text = HANDSHAKE.replacen("{", "[", 1);
        assert!(matches!(
            read_handshake(&mut reader(&text)),
            Err(ProtocolError::InvalidConstants(_))
        ));
    }

    #[test]
    fn test_read_frame() {
        let mut input = reader("7\n0 2 1 3000\n4 1 1 100\n6 2 1 0\n9 3 0\n1 0 0 5000\n1\n2 1 40\n");
        let frame = read_frame(&mut input, 2).unwrap().unwrap();

        assert_eq!(frame.turn, 7);
        assert_eq!(frame.players[0].ships.len(), 2);
        assert_eq!(frame.players[0].ships[1], Ship::new(6, 0, Position::new(2, 1), 0));
        assert_eq!(frame.players[0].dropoffs, vec![(9, Position::new(3, 0))]);
        assert_eq!(frame.players[1].halite, 5000);
        assert!(frame.players[1].ships.is_empty());
        assert_eq!(frame.cell_updates, vec![(Position::new(2, 1), 40)]);
    }

    #[test]
    fn test_frame_end_of_game() {
        assert_eq!(read_frame(&mut reader(""), 2).unwrap(), None);
    }

    #[test]
    fn test_frame_truncated_mid_turn() {
        assert!(matches!(
            read_frame(&mut reader("7\n0 2 0 3000\n4 1 1 100\n"), 1),
            Err(ProtocolError::UnexpectedEof { expected: "ship", .. })
        ));
    }

    #[test]
    fn test_frame_garbage_turn() {
        assert!(matches!(
            read_frame(&mut reader("seven\n"), 1),
            Err(ProtocolError::Malformed { expected: "turn number", line: 1, .. })
        ));
    }

    #[test]
    fn test_frame_huge_counts_are_errors() {
        assert!(matches!(
            read_frame(&mut reader("1\n0 4000000000 0 0\n"), 1),
            Err(ProtocolError::UnexpectedEof { expected: "ship", .. })
        ));
        assert!(matches!(
            read_frame(&mut reader("1\n0 0 4000000000 0\n"), 1),
            Err(ProtocolError::UnexpectedEof { expected: "dropoff", .. })
        ));
        assert!(matches!(
            read_frame(&mut reader("1\n0 0 0 0\n4000000000\n"), 1),
            Err(ProtocolError::UnexpectedEof { expected: "cell update", .. })
        ));
    }

    #[test]
    fn test_handshake_huge_counts_are_errors() {
        let text = HANDSHAKE.replace("2 1\n", "4000000000 1\n");
        assert!(matches!(
            read_handshake(&mut reader(&text)),
            Err(ProtocolError::Malformed { .. } | ProtocolError::UnexpectedEof { .. })
        ));

        let text = HANDSHAKE.replace("4 3\n", "2000000000 2000000000\n");
        assert!(matches!(
            read_handshake(&mut reader(&text)),
            Err(ProtocolError::Malformed { expected: "halite row", .. })
        ));
    }

    #[test]
    fn test_encode_commands() {
        let commands = [
            Command::Move {
                ship: 3,
                direction: Direction::North,
            },
            Command::Move {
                ship: 5,
                direction: Direction::Still,
            },
            Command::ConstructDropoff { ship: 8 },
            Command::Spawn,
        ];
        assert_eq!(encode_commands(&commands), "m 3 n m 5 o c 8 g");
        assert_eq!(encode_commands(&[]), "");
    }

    #[test]
    fn test_write_commands_terminates_line() {
        let mut out = Vec::new();
        write_commands(&mut out, &[Command::Spawn]).unwrap();
        assert_eq!(out, b"g\n");
    }

    #[test]
    fn test_decode_command() {
        assert_eq!(
            decode_command(&["m", "12", "w"]),
            Some(Command::Move {
                ship: 12,
                direction: Direction::West
            })
        );
        assert_eq!(decode_command(&["g"]), Some(Command::Spawn));
        assert_eq!(decode_command(&["m", "1", "x"]), None);
        assert_eq!(decode_command(&["m", "1", "nn"]), None);
    }
}
