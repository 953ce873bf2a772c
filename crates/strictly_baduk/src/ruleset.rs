//! Game settings fixed at session creation.

use crate::error::ValidationError;
use crate::types::{BoardSize, Stone};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Position-repetition rule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KoRule {
    /// Only immediate recapture reproducing the position before the
    /// opponent's last move is forbidden.
    #[default]
    Standard,
    /// No earlier whole-board position (with the same color to move) may recur.
    Superko,
}

/// How the final score is counted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoringMethod {
    /// Stones, surrounded territory and prisoners.
    #[default]
    Territory,
    /// Stones and surrounded territory only.
    Area,
}

/// Complete rule configuration for one game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    /// Board side length.
    pub board_size: BoardSize,
    /// Number of black handicap stones (0, or 2 through 9).
    pub handicap: u8,
    /// Points added to white's score.
    pub komi: f64,
    /// Whether a move that kills its own group is allowed.
    pub suicide_allowed: bool,
    /// Repetition rule.
    pub ko_rule: KoRule,
    /// Counting method.
    pub scoring: ScoringMethod,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            board_size: BoardSize::Nineteen,
            handicap: 0,
            komi: 6.5,
            suicide_allowed: false,
            ko_rule: KoRule::Standard,
            scoring: ScoringMethod::Territory,
        }
    }
}

impl Ruleset {
    /// Default rules on a board of the given size.
    pub fn with_size(board_size: BoardSize) -> Self {
        Self {
            board_size,
            ..Self::default()
        }
    }

    /// Checks handicap and komi.
    #[instrument]
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.handicap == 1 || self.handicap > 9 {
            return Err(ValidationError::InvalidHandicap {
                stones: self.handicap,
            });
        }
        if !self.komi.is_finite() {
            return Err(ValidationError::InvalidKomi { komi: self.komi });
        }
        Ok(())
    }

    /// Color that makes the first move: white when black received handicap stones.
    pub fn first_to_move(&self) -> Stone {
        if self.handicap >= 2 {
            Stone::White
        } else {
            Stone::Black
        }
    }
}
