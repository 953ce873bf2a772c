//! Contract-based validation for Go moves.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} action {Q}. Unlike debug assertions, both sides are checked on every
//! move; a failed postcondition aborts the move instead of persisting a
//! corrupted position.

use crate::action::MoveKind;
use crate::error::{EngineError, InvariantViolation, RuleViolation, ValidationError};
use crate::invariants::{GoInvariants, InvariantSet};
use crate::typestate::GameInProgress;
use crate::types::Stone;
use tracing::{error, instrument};

/// A move a player wants to make, before it is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// Color trying to move.
    pub color: Stone,
    /// Placement or pass.
    pub kind: MoveKind,
}

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), EngineError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), EngineError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the attempting color holds the turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Checks the turn.
    #[instrument(skip(game))]
    pub fn check(attempt: &Attempt, game: &GameInProgress) -> Result<(), EngineError> {
        if attempt.color != game.to_move() {
            return Err(RuleViolation::NotYourTurn {
                expected: game.to_move(),
                attempted: attempt.color,
            }
            .into());
        }
        Ok(())
    }
}

/// Precondition: a placement targets an empty intersection on the board.
pub struct TargetIsOpen;

impl TargetIsOpen {
    /// Checks the target intersection. Passes always satisfy it.
    #[instrument(skip(game))]
    pub fn check(attempt: &Attempt, game: &GameInProgress) -> Result<(), EngineError> {
        let MoveKind::Place(coord) = attempt.kind else {
            return Ok(());
        };
        let board = game.board();
        if !board.contains(coord) {
            return Err(ValidationError::OutOfBounds {
                coord,
                size: board.size().side(),
            }
            .into());
        }
        if !board.is_empty_at(coord) {
            return Err(RuleViolation::Occupied { coord }.into());
        }
        Ok(())
    }
}

/// Composite precondition: turn first, then the target.
pub struct LegalAttempt;

impl LegalAttempt {
    /// Validates all preconditions for an attempt.
    #[instrument(skip(game))]
    pub fn check(attempt: &Attempt, game: &GameInProgress) -> Result<(), EngineError> {
        PlayersTurn::check(attempt, game)?;
        TargetIsOpen::check(attempt, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for moves and passes.
///
/// Preconditions:
/// - The attempting color holds the turn
/// - A placement targets an open intersection
///
/// Postconditions:
/// - Exactly one move was appended
/// - Every group on the board has a liberty
/// - Turns alternate
/// - The ledger matches the board and the capture counts
pub struct MoveContract;

impl Contract<GameInProgress, Attempt> for MoveContract {
    fn pre(game: &GameInProgress, attempt: &Attempt) -> Result<(), EngineError> {
        LegalAttempt::check(attempt, game)
    }

    fn post(before: &GameInProgress, after: &GameInProgress) -> Result<(), EngineError> {
        let mut problems = Vec::new();
        if after.history().len() != before.history().len() + 1 {
            problems.push("Exactly one move is appended per transition".to_string());
        }
        if let Err(violations) = GoInvariants::check_all(after) {
            problems.extend(violations.into_iter().map(|v| v.description));
        }
        if problems.is_empty() {
            return Ok(());
        }
        let description = format!("Postcondition failed: {}", problems.join("; "));
        error!(%description, "Move aborted on invariant failure");
        Err(InvariantViolation::new(description).into())
    }
}
