//! Ledger consistency invariant: the history accounts for the position.

use super::Invariant;
use crate::ledger::digest;
use crate::typestate::{GameInProgress, PASSES_TO_END};
use crate::types::Captures;

/// Invariant: the position ledger agrees with the live game.
///
/// - one digest per move plus the starting position
/// - the last digest is the digest of the current board and turn
/// - prisoner counts equal the captures recorded in the moves
/// - the pass counter equals the run of trailing passes
pub struct LedgerConsistentInvariant;

impl Invariant<GameInProgress> for LedgerConsistentInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let history = game.history();
        if history.digests().len() != history.len() + 1 {
            return false;
        }
        if history.current() != Some(digest(game.board(), game.to_move())) {
            return false;
        }

        let mut tally = Captures::default();
        for mv in history.moves() {
            tally.credit(mv.color, mv.captured.len());
            tally.credit(mv.color.opponent(), mv.self_captured.len());
        }
        if tally != game.captures() {
            return false;
        }

        let trailing_passes = history
            .moves()
            .iter()
            .rev()
            .take_while(|mv| mv.is_pass())
            .count();
        trailing_passes.min(usize::from(PASSES_TO_END)) == usize::from(game.consecutive_passes())
    }

    fn description() -> &'static str {
        "Ledger digests, capture counts and pass counter match the game"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::Ruleset;
    use crate::typestate::GameSetup;
    use crate::types::{BoardSize, Coord, Stone};

    fn nine() -> GameInProgress {
        GameSetup::new(Ruleset::with_size(BoardSize::Nine))
            .and_then(GameSetup::start)
            .expect("valid rules")
    }

    #[test]
    fn test_fresh_game_holds() {
        assert!(LedgerConsistentInvariant::holds(&nine()));
    }

    #[test]
    fn test_after_move_holds() {
        let game = nine().play(Stone::Black, Coord::new(4, 4)).expect("legal");
        assert!(LedgerConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_tampered_captures_violate() {
        let mut game = nine().play(Stone::Black, Coord::new(4, 4)).expect("legal");
        game.captures.credit(Stone::Black, 1);
        assert!(!LedgerConsistentInvariant::holds(&game));
    }
}
