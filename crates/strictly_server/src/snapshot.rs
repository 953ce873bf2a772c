//! Serializable session state for persistence and broadcast.

use crate::session::{LogEntry, Phase, Seat, SessionId};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strictly_baduk::{Board, Captures, MatchResult, Move, Ruleset, Stone};

/// Complete view of one session at one point in time.
///
/// Taking a snapshot never mutates the session, so two snapshots with no
/// operation in between are equal and serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct SessionSnapshot {
    /// Session identifier.
    id: SessionId,
    /// Lifecycle phase.
    phase: Phase,
    /// Rules in force.
    ruleset: Ruleset,
    /// Seated players, black first.
    seats: Vec<Seat>,
    /// Current board. Empty before the game starts.
    board: Board,
    /// Color holding the turn while a game is in progress.
    to_move: Option<Stone>,
    /// Passes in a row.
    consecutive_passes: u8,
    /// Prisoners taken by each color.
    captures: Captures,
    /// Moves in order.
    moves: Vec<Move>,
    /// Result once the game ended.
    result: Option<MatchResult>,
    /// Chat lines and system notes, oldest first.
    log: Vec<LogEntry>,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// When both players became ready.
    started_at: Option<DateTime<Utc>>,
    /// When the session reached a terminal phase.
    ended_at: Option<DateTime<Utc>>,
    /// Last event sequence number stamped.
    event_sequence: u64,
    /// Invariant failures seen by the session.
    invariant_faults: u32,
}

impl SessionSnapshot {
    /// Seat bound to `color`, if taken.
    pub fn seat(&self, color: Stone) -> Option<&Seat> {
        self.seats.iter().find(|seat| *seat.color() == color)
    }

    /// Board rendered as text.
    pub fn board_text(&self) -> String {
        self.board.display()
    }
}

#[cfg(test)]
mod tests {
    use crate::session::{DEFAULT_CHAT_LIMIT, GameSession};
    use strictly_baduk::{BoardSize, Coord, Ruleset, Stone};

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut session = GameSession::new(
            "g1".to_string(),
            Ruleset::with_size(BoardSize::Nine),
            DEFAULT_CHAT_LIMIT,
        )
        .expect("valid rules");
        session.add_player("alice".to_string()).expect("seat");
        session.add_player("bob".to_string()).expect("seat");
        session.set_ready("alice").expect("ready");
        session.set_ready("bob").expect("ready");
        session
            .submit_move("alice", Coord::new(2, 2))
            .expect("legal");

        let first = session.snapshot();
        let second = session.snapshot();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("serializable"),
            serde_json::to_string(&second).expect("serializable")
        );
        assert_eq!(first.seat(Stone::White).map(|s| s.player_id().as_str()), Some("bob"));
    }

    #[test]
    fn test_snapshot_survives_json() {
        let session = GameSession::new(
            "g1".to_string(),
            Ruleset::with_size(BoardSize::Thirteen),
            DEFAULT_CHAT_LIMIT,
        )
        .expect("valid rules");
        let snapshot = session.snapshot();
        let json = serde_json::to_string(&snapshot).expect("serializable");
        let back: super::SessionSnapshot = serde_json::from_str(&json).expect("parsable");
        assert_eq!(back.board().size(), BoardSize::Thirteen);
        assert_eq!(back.phase(), snapshot.phase());
    }
}
