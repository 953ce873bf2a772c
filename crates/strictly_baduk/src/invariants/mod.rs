//! First-class invariants for Go games.
//!
//! Invariants are logical properties that must hold after every committed
//! move. They are testable independently and are checked by the move
//! contract on every transition.

use crate::error::InvariantViolation;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// A set of invariants that can be checked together.
///
/// Implemented for three-invariant tuples such as [`GoInvariants`].
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

pub mod alternating_turn;
pub mod ledger_consistent;
pub mod living_groups;

pub use alternating_turn::AlternatingTurnInvariant;
pub use ledger_consistent::LedgerConsistentInvariant;
pub use living_groups::LivingGroupsInvariant;

/// All Go invariants as a composable set.
pub type GoInvariants = (
    LivingGroupsInvariant,
    AlternatingTurnInvariant,
    LedgerConsistentInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::Ruleset;
    use crate::typestate::{GameInProgress, GameSetup};
    use crate::types::{BoardSize, Coord, Intersection, Stone};

    fn nine() -> GameInProgress {
        GameSetup::new(Ruleset::with_size(BoardSize::Nine))
            .and_then(GameSetup::start)
            .expect("valid rules")
    }

    #[test]
    fn test_invariant_set_holds_for_new_game() {
        assert!(GoInvariants::check_all(&nine()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let game = nine()
            .play(Stone::Black, Coord::new(2, 2))
            .and_then(|g| g.play(Stone::White, Coord::new(2, 3)))
            .and_then(|g| g.play(Stone::Black, Coord::new(6, 6)))
            .expect("legal moves");
        assert!(GoInvariants::check_all(&game).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let mut game = nine();
        // Surround a white stone completely without removing it.
        game.board.set(Coord::new(0, 0), Intersection::Occupied(Stone::White));
        game.board.set(Coord::new(0, 1), Intersection::Occupied(Stone::Black));
        game.board.set(Coord::new(1, 0), Intersection::Occupied(Stone::Black));

        let violations = GoInvariants::check_all(&game).expect_err("corrupted board");
        assert!(violations.len() >= 2);
    }
}
