//! Living groups invariant: no group sits on the board without liberties.

use super::Invariant;
use crate::typestate::GameInProgress;

/// Invariant: every group on the board has at least one liberty.
///
/// A zero-liberty group must have been captured (or the move rejected)
/// before the move resolved.
pub struct LivingGroupsInvariant;

impl Invariant<GameInProgress> for LivingGroupsInvariant {
    fn holds(game: &GameInProgress) -> bool {
        game.board()
            .groups()
            .iter()
            .all(|group| group.liberty_count() >= 1)
    }

    fn description() -> &'static str {
        "Every group on the board has at least one liberty"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::Ruleset;
    use crate::typestate::GameSetup;
    use crate::types::{BoardSize, Coord, Intersection, Stone};

    #[test]
    fn test_dead_stone_violates() {
        let mut game = GameSetup::new(Ruleset::with_size(BoardSize::Nine))
            .and_then(GameSetup::start)
            .expect("valid rules");
        assert!(LivingGroupsInvariant::holds(&game));

        game.board.set(Coord::new(0, 0), Intersection::Occupied(Stone::Black));
        game.board.set(Coord::new(0, 1), Intersection::Occupied(Stone::White));
        assert!(LivingGroupsInvariant::holds(&game));

        game.board.set(Coord::new(1, 0), Intersection::Occupied(Stone::White));
        assert!(!LivingGroupsInvariant::holds(&game));
    }
}
