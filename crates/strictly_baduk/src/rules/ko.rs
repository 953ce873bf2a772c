//! Position-repetition checks.

use crate::ledger::{MoveHistory, PositionDigest};
use crate::ruleset::KoRule;
use tracing::{debug, instrument};

/// Whether a move producing `candidate` repeats a forbidden position.
///
/// Under [`KoRule::Standard`] only the position before the opponent's last
/// move is forbidden, which catches immediate recapture. Under
/// [`KoRule::Superko`] every earlier position is.
#[instrument(skip(history), fields(moves = history.len()))]
pub fn check_repetition(rule: KoRule, history: &MoveHistory, candidate: PositionDigest) -> bool {
    let repeats = match rule {
        KoRule::Standard => history.before_last_reply() == Some(candidate),
        KoRule::Superko => history.contains(candidate),
    };
    if repeats {
        debug!(%candidate, ?rule, "Position repetition detected");
    }
    repeats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Move, MoveKind};
    use crate::types::Stone;

    fn pass(sequence: u32, color: Stone) -> Move {
        Move {
            sequence,
            color,
            kind: MoveKind::Pass,
            captured: Vec::new(),
            self_captured: Vec::new(),
            played_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_standard_only_checks_two_back() {
        let mut history = MoveHistory::new(PositionDigest(10));
        history.record(pass(1, Stone::Black), PositionDigest(11));
        history.record(pass(2, Stone::White), PositionDigest(12));

        assert!(check_repetition(KoRule::Standard, &history, PositionDigest(11)));
        assert!(!check_repetition(KoRule::Standard, &history, PositionDigest(10)));
        assert!(check_repetition(KoRule::Superko, &history, PositionDigest(10)));
        assert!(!check_repetition(KoRule::Superko, &history, PositionDigest(13)));
    }
}
