//! Alternating turn invariant: colors alternate from the first mover.

use super::Invariant;
use crate::typestate::GameInProgress;

/// Invariant: moves alternate colors, numbered 1, 2, 3, ...
///
/// The first move belongs to the ruleset's first mover (white after
/// handicap stones, black otherwise), and the color to move follows the
/// last recorded move.
pub struct AlternatingTurnInvariant;

impl Invariant<GameInProgress> for AlternatingTurnInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let moves = game.history().moves();
        let mut expected = game.ruleset().first_to_move();

        for (idx, mv) in moves.iter().enumerate() {
            if mv.color != expected || usize::try_from(mv.sequence).ok() != Some(idx + 1) {
                return false;
            }
            expected = expected.opponent();
        }

        game.to_move() == expected
    }

    fn description() -> &'static str {
        "Colors alternate from the first mover with consecutive sequence numbers"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::Ruleset;
    use crate::typestate::{GameResult, GameSetup};
    use crate::types::{BoardSize, Coord, Stone};

    fn nine() -> GameInProgress {
        GameSetup::new(Ruleset::with_size(BoardSize::Nine))
            .and_then(GameSetup::start)
            .expect("valid rules")
    }

    #[test]
    fn test_empty_game_holds() {
        assert!(AlternatingTurnInvariant::holds(&nine()));
    }

    #[test]
    fn test_moves_and_passes_hold() {
        let game = nine().play(Stone::Black, Coord::new(3, 3)).expect("legal");
        let game = match game.pass(Stone::White).expect("legal pass") {
            GameResult::InProgress(g) => g,
            GameResult::Finished(_) => panic!("single pass cannot finish"),
        };
        assert!(AlternatingTurnInvariant::holds(&game));
        assert_eq!(game.to_move(), Stone::Black);
    }

    #[test]
    fn test_wrong_turn_holder_violates() {
        let mut game = nine().play(Stone::Black, Coord::new(3, 3)).expect("legal");
        game.to_move = Stone::Black;
        assert!(!AlternatingTurnInvariant::holds(&game));
    }
}
