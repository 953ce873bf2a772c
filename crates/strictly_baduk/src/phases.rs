//! Game outcomes.

use crate::rules::Score;
use crate::types::Stone;
use serde::{Deserialize, Serialize};

/// Who won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The given color won.
    Winner(Stone),
    /// Equal scores.
    Draw,
    /// The game was abandoned without a result.
    NoResult,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Stone> {
        match self {
            Outcome::Winner(stone) => Some(*stone),
            Outcome::Draw | Outcome::NoResult => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(stone) => write!(f, "{} wins", stone),
            Outcome::Draw => write!(f, "Draw"),
            Outcome::NoResult => write!(f, "No result"),
        }
    }
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndReason {
    /// Both players passed in succession.
    DoublePass,
    /// A player asked for the game to be counted.
    Scored,
    /// A player resigned.
    Resignation,
    /// A player ran out of time or was timed out by the host.
    Timeout,
    /// The session was torn down.
    Abandoned,
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Winner or draw.
    pub outcome: Outcome,
    /// Point difference, when the game was counted.
    pub margin: Option<f64>,
    /// How the game ended.
    pub reason: EndReason,
    /// Full count, when the game was counted.
    pub score: Option<Score>,
}

impl MatchResult {
    /// Result of a counted game.
    pub fn counted(score: Score, reason: EndReason) -> Self {
        Self {
            outcome: score.outcome(),
            margin: Some(score.margin()),
            reason,
            score: Some(score),
        }
    }

    /// Result where `winner` won without counting.
    pub fn forfeit(winner: Stone, reason: EndReason) -> Self {
        Self {
            outcome: Outcome::Winner(winner),
            margin: None,
            reason,
            score: None,
        }
    }

    /// Result of an abandoned game.
    pub fn abandoned() -> Self {
        Self {
            outcome: Outcome::NoResult,
            margin: None,
            reason: EndReason::Abandoned,
            score: None,
        }
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.margin {
            Some(margin) if !self.outcome.is_draw() => {
                write!(f, "{} by {} ({})", self.outcome, margin, self.reason)
            }
            _ => write!(f, "{} ({})", self.outcome, self.reason),
        }
    }
}
