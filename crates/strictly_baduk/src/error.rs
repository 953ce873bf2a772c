//! Error taxonomy for the rules engine.
//!
//! Every rejection carries a stable reason code so callers can branch on
//! the exact cause without parsing messages.

use crate::types::{Coord, Stone};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

/// Broad class of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed input or phase mismatch; retry with corrected input.
    Validation,
    /// A game-legal refusal (occupied, suicide, ko, out of turn).
    RuleViolation,
    /// Session lookup or roster problem.
    SessionFault,
    /// Internal state broke an invariant; the operation was aborted.
    Invariant,
}

/// Caller error: malformed coordinates or unsupported settings.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationError {
    /// Coordinate lies off the board.
    #[display("Coordinate {coord} is outside the {size}x{size} board")]
    OutOfBounds {
        /// Offending coordinate.
        coord: Coord,
        /// Board side length.
        size: u8,
    },

    /// Coordinate text could not be parsed.
    #[display("Malformed coordinate '{input}'")]
    MalformedCoordinate {
        /// Raw input.
        input: String,
    },

    /// Board side other than 9, 13 or 19.
    #[display("Unsupported board size {size}")]
    UnsupportedBoardSize {
        /// Requested side length.
        size: u8,
    },

    /// Handicap must be 0 or between 2 and 9.
    #[display("Invalid handicap of {stones} stones")]
    InvalidHandicap {
        /// Requested stone count.
        stones: u8,
    },

    /// Komi must be a finite number.
    #[display("Invalid komi {komi}")]
    InvalidKomi {
        /// Requested komi.
        komi: f64,
    },
}

impl std::error::Error for ValidationError {}

/// Game-legal rejection of a move.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleViolation {
    /// The intersection already holds a stone.
    #[display("Intersection {coord} is already occupied")]
    Occupied {
        /// Target intersection.
        coord: Coord,
    },

    /// The move would leave its own group without liberties.
    #[display("Playing at {coord} would be suicide")]
    SuicideMove {
        /// Target intersection.
        coord: Coord,
    },

    /// The move would repeat an earlier position.
    #[display("Playing at {coord} repeats an earlier position")]
    KoViolation {
        /// Target intersection.
        coord: Coord,
    },

    /// The other color holds the turn.
    #[display("It is {expected}'s turn, not {attempted}'s")]
    NotYourTurn {
        /// Color holding the turn.
        expected: Stone,
        /// Color that tried to move.
        attempted: Stone,
    },
}

impl std::error::Error for RuleViolation {}

/// An internal invariant failed after a move; the move was not committed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("Invariant violation: {description}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Any rejection produced by the rules engine.
#[derive(Debug, Clone, PartialEq, Display, Error, From)]
pub enum EngineError {
    /// Malformed input.
    #[display("{_0}")]
    Validation(ValidationError),
    /// Illegal move.
    #[display("{_0}")]
    Rule(RuleViolation),
    /// Corrupted state detected.
    #[display("{_0}")]
    Invariant(InvariantViolation),
}

impl EngineError {
    /// Broad category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::Validation(_) => ErrorCategory::Validation,
            EngineError::Rule(_) => ErrorCategory::RuleViolation,
            EngineError::Invariant(_) => ErrorCategory::Invariant,
        }
    }

    /// Stable SCREAMING_SNAKE_CASE reason code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(e) => e.into(),
            EngineError::Rule(e) => e.into(),
            EngineError::Invariant(_) => "INVARIANT_VIOLATION",
        }
    }
}
