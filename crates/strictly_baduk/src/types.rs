//! Core domain types for Go.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Column letters used by the text coordinate form (no `I`).
const COLUMN_LETTERS: &[u8; 25] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Stone color.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stone {
    /// Black (moves first in even games).
    Black,
    /// White (receives komi).
    White,
}

impl Stone {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }
}

/// A single intersection on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intersection {
    /// No stone.
    Empty,
    /// A stone of the given color.
    Occupied(Stone),
}

impl Intersection {
    /// Returns the stone on this intersection, if any.
    pub fn stone(self) -> Option<Stone> {
        match self {
            Intersection::Empty => None,
            Intersection::Occupied(stone) => Some(stone),
        }
    }
}

/// Supported board sizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum BoardSize {
    /// 9x9 board.
    Nine,
    /// 13x13 board.
    Thirteen,
    /// 19x19 board.
    #[default]
    Nineteen,
}

impl BoardSize {
    /// Number of intersections along one side.
    pub fn side(self) -> u8 {
        match self {
            BoardSize::Nine => 9,
            BoardSize::Thirteen => 13,
            BoardSize::Nineteen => 19,
        }
    }

    /// Total number of intersections.
    pub fn area(self) -> usize {
        let side = usize::from(self.side());
        side * side
    }

    /// Star-point lines (low, middle, high) used for handicap placement.
    pub(crate) fn star_lines(self) -> (u8, u8, u8) {
        match self {
            BoardSize::Nine => (2, 4, 6),
            BoardSize::Thirteen => (3, 6, 9),
            BoardSize::Nineteen => (3, 9, 15),
        }
    }
}

impl TryFrom<u8> for BoardSize {
    type Error = ValidationError;

    fn try_from(side: u8) -> Result<Self, Self::Error> {
        match side {
            9 => Ok(BoardSize::Nine),
            13 => Ok(BoardSize::Thirteen),
            19 => Ok(BoardSize::Nineteen),
            other => Err(ValidationError::UnsupportedBoardSize { size: other }),
        }
    }
}

impl From<BoardSize> for u8 {
    fn from(size: BoardSize) -> Self {
        size.side()
    }
}

impl std::fmt::Display for BoardSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0}x{0}", self.side())
    }
}

/// A board coordinate: zero-based row (top to bottom) and column (left to right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Row index, 0 is the top edge.
    pub row: u8,
    /// Column index, 0 is the left edge.
    pub col: u8,
}

impl Coord {
    /// Creates a coordinate.
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Whether this coordinate lies on a board of the given size.
    pub fn is_on(self, size: BoardSize) -> bool {
        self.row < size.side() && self.col < size.side()
    }

    /// Orthogonal neighbors that lie on a board with `side` lines.
    pub fn neighbors(self, side: u8) -> impl Iterator<Item = Coord> {
        let Coord { row, col } = self;
        [
            (row > 0).then(|| Coord::new(row - 1, col)),
            (row + 1 < side).then(|| Coord::new(row + 1, col)),
            (col > 0).then(|| Coord::new(row, col - 1)),
            (col + 1 < side).then(|| Coord::new(row, col + 1)),
        ]
        .into_iter()
        .flatten()
    }

    /// Parses the text form (`D4`, `q16`) for a board of the given size.
    ///
    /// The number counts rows from the bottom edge; letters skip `I`.
    #[instrument]
    pub fn parse(text: &str, size: BoardSize) -> Result<Self, ValidationError> {
        let malformed = || ValidationError::MalformedCoordinate {
            input: text.to_string(),
        };
        let trimmed = text.trim();
        let mut chars = trimmed.chars();
        let letter = chars.next().ok_or_else(malformed)?.to_ascii_uppercase();
        let col = COLUMN_LETTERS
            .iter()
            .position(|&c| char::from(c) == letter)
            .ok_or_else(malformed)?;
        let number: u8 = chars.as_str().parse().map_err(|_| malformed())?;
        let side = size.side();
        if number == 0 || number > side || col >= usize::from(side) {
            return Err(ValidationError::MalformedCoordinate {
                input: text.to_string(),
            });
        }
        // col < side <= 19, so the cast is lossless
        Ok(Coord::new(side - number, col as u8))
    }

    /// Renders the text form for a board of the given size.
    pub fn to_text(self, size: BoardSize) -> String {
        let letter = COLUMN_LETTERS
            .get(usize::from(self.col))
            .map(|&c| char::from(c))
            .unwrap_or('?');
        format!("{}{}", letter, size.side().saturating_sub(self.row))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Stones captured by each color so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Captures {
    /// Stones black has taken off the board.
    pub black: u32,
    /// Stones white has taken off the board.
    pub white: u32,
}

impl Captures {
    /// Returns the count credited to `stone`.
    pub fn of(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
        }
    }

    /// Credits `count` captured stones to `stone`.
    pub fn credit(&mut self, stone: Stone, count: usize) {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        match stone {
            Stone::Black => self.black = self.black.saturating_add(count),
            Stone::White => self.white = self.white.saturating_add(count),
        }
    }
}
