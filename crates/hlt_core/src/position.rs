//! Toroidal coordinate algebra.
//!
//! Every axis wraps around: stepping off the east edge arrives on the
//! west edge. Positions are unbounded integers until they are normalized
//! against a [`Dimensions`] value, which is the only form the map accepts
//! as a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Cell coordinates in the unbounded logical plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing eastward.
    pub x: i32,
    /// Row, growing southward.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position one step away in `direction`, without wrapping.
    ///
    /// Callers must normalize the result before using it as a map key.
    #[must_use]
    pub const fn directional_offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four neighboring positions in [`Direction::ALL_CARDINALS`] order.
    #[must_use]
    pub fn surrounding_cardinals(self) -> [Self; 4] {
        Direction::ALL_CARDINALS.map(|direction| self.directional_offset(direction))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement directions, including the no-op [`Direction::Still`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    North,
    /// Toward increasing rows.
    South,
    /// Toward increasing columns.
    East,
    /// Toward decreasing columns.
    West,
    /// Stay in place.
    Still,
}

impl Direction {
    /// The four cardinal directions in their stable enumeration order.
    ///
    /// This order is the tie-break order used by every movement search.
    pub const ALL_CARDINALS: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Unit offset `(dx, dy)` for this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::Still => (0, 0),
        }
    }

    /// Wire character used by the host protocol.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::North => 'n',
            Self::South => 's',
            Self::East => 'e',
            Self::West => 'w',
            Self::Still => 'o',
        }
    }

    /// Parse a wire character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Self::North),
            's' => Some(Self::South),
            'e' => Some(Self::East),
            'w' => Some(Self::West),
            'o' => Some(Self::Still),
            _ => None,
        }
    }
}

/// Validated map extent. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: i32,
    height: i32,
}

impl Dimensions {
    /// Create map dimensions.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidDimensions` if either side is not positive.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(GameError::InvalidDimensions {
                width: i64::from(width),
                height: i64::from(height),
            });
        }
        Ok(Self { width, height })
    }

    /// Map width in cells.
    #[must_use]
    pub const fn width(self) -> i32 {
        self.width
    }

    /// Map height in cells.
    #[must_use]
    pub const fn height(self) -> i32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(self) -> usize {
        // Both sides are positive, so the casts are lossless.
        (self.width as usize) * (self.height as usize)
    }

    /// Whether `position` already lies inside `[0, width) x [0, height)`.
    #[must_use]
    pub const fn contains(self, position: Position) -> bool {
        position.x >= 0 && position.x < self.width && position.y >= 0 && position.y < self.height
    }

    /// Wrap `position` into `[0, width) x [0, height)`.
    ///
    /// Uses Euclidean remainder so negative inputs wrap correctly.
    #[must_use]
    pub const fn normalize(self, position: Position) -> Position {
        Position {
            x: position.x.rem_euclid(self.width),
            y: position.y.rem_euclid(self.height),
        }
    }

    /// Row-major index of `position` after normalization.
    #[must_use]
    pub fn index_of(self, position: Position) -> usize {
        let normalized = self.normalize(position);
        (normalized.y as usize) * (self.width as usize) + (normalized.x as usize)
    }

    /// Signed per-axis step count from `from` to `to` along the shorter wrap.
    ///
    /// When both ways around are equally long the negative direction is
    /// returned, so each component lies in `[-extent / 2, extent / 2)`.
    #[must_use]
    pub const fn toroidal_delta(self, from: Position, to: Position) -> (i32, i32) {
        (
            wrap_axis(to.x - from.x, self.width),
            wrap_axis(to.y - from.y, self.height),
        )
    }

    /// Toroidal Manhattan distance.
    #[must_use]
    pub const fn distance(self, from: Position, to: Position) -> u32 {
        let (dx, dy) = self.toroidal_delta(from, to);
        dx.unsigned_abs() + dy.unsigned_abs()
    }
}

const fn wrap_axis(delta: i32, extent: i32) -> i32 {
    let forward = delta.rem_euclid(extent);
    if forward >= extent - forward {
        forward - extent
    } else {
        forward
    }
}
