//! Recorded moves.
//!
//! Moves are domain events: once appended to the history they are never
//! modified, and replaying them in order reproduces the game.

use crate::types::{Coord, Stone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a player did on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// A stone placed on an intersection.
    Place(Coord),
    /// The player passed.
    Pass,
}

/// A move as recorded in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// 1-based position in the game.
    pub sequence: u32,
    /// Color that moved.
    pub color: Stone,
    /// Placement or pass.
    pub kind: MoveKind,
    /// Opposing stones removed by this move.
    pub captured: Vec<Coord>,
    /// Own stones removed by an allowed suicide.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub self_captured: Vec<Coord>,
    /// When the move was committed.
    pub played_at: DateTime<Utc>,
}

impl Move {
    /// Whether this move was a pass.
    pub fn is_pass(&self) -> bool {
        self.kind == MoveKind::Pass
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MoveKind::Place(coord) => write!(f, "#{} {} {}", self.sequence, self.color, coord),
            MoveKind::Pass => write!(f, "#{} {} pass", self.sequence, self.color),
        }
    }
}
