//! Move history and position digests.
//!
//! The ledger holds the digest of the starting position followed by one
//! digest per applied move, in order. It is append-only.

use crate::action::Move;
use crate::board::Board;
use crate::types::{BoardSize, Intersection, Stone};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Zobrist hash of a stone layout plus the color to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionDigest(pub u64);

impl std::fmt::Display for PositionDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

struct ZobristTable {
    /// Two keys per intersection of the largest board.
    stones: Vec<[u64; 2]>,
    white_to_move: u64,
}

fn zobrist() -> &'static ZobristTable {
    static TABLE: OnceLock<ZobristTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);
        let stones = (0..BoardSize::Nineteen.area())
            .map(|_| [rng.u64(..), rng.u64(..)])
            .collect();
        ZobristTable {
            stones,
            white_to_move: rng.u64(..),
        }
    })
}

/// Computes the digest of `board` with `to_move` holding the turn.
pub fn digest(board: &Board, to_move: Stone) -> PositionDigest {
    let table = zobrist();
    let mut hash = match to_move {
        Stone::Black => 0,
        Stone::White => table.white_to_move,
    };
    for (idx, cell) in board.cells().iter().enumerate() {
        match cell {
            Intersection::Empty => {}
            Intersection::Occupied(Stone::Black) => hash ^= table.stones[idx][0],
            Intersection::Occupied(Stone::White) => hash ^= table.stones[idx][1],
        }
    }
    PositionDigest(hash)
}

/// Ordered moves and the digest of every position they produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    moves: Vec<Move>,
    digests: Vec<PositionDigest>,
}

impl MoveHistory {
    /// Starts a ledger at the given initial position.
    pub fn new(initial: PositionDigest) -> Self {
        Self {
            moves: Vec::new(),
            digests: vec![initial],
        }
    }

    /// Recorded moves in order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Position digests: the initial position, then one per move.
    pub fn digests(&self) -> &[PositionDigest] {
        &self.digests
    }

    /// Number of recorded moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no moves were recorded.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Most recent move.
    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Digest of the current position.
    pub fn current(&self) -> Option<PositionDigest> {
        self.digests.last().copied()
    }

    /// Sequence number the next move will carry.
    pub fn next_sequence(&self) -> u32 {
        u32::try_from(self.moves.len() + 1).unwrap_or(u32::MAX)
    }

    /// Whether `digest` occurred anywhere in the game.
    pub fn contains(&self, digest: PositionDigest) -> bool {
        self.digests.contains(&digest)
    }

    /// The position before the opponent's last move, if there was one.
    pub fn before_last_reply(&self) -> Option<PositionDigest> {
        self.digests
            .len()
            .checked_sub(2)
            .and_then(|idx| self.digests.get(idx))
            .copied()
    }

    pub(crate) fn record(&mut self, mv: Move, digest: PositionDigest) {
        self.moves.push(mv);
        self.digests.push(digest);
    }
}
