//! Move legality: turn, bounds, occupancy, suicide and ko.

use super::ko::check_repetition;
use crate::board::Board;
use crate::error::{EngineError, RuleViolation};
use crate::ledger::{MoveHistory, PositionDigest, digest};
use crate::ruleset::Ruleset;
use crate::types::{Coord, Stone};
use std::collections::BTreeSet;
use tracing::{debug, instrument, warn};

/// An accepted placement, not yet committed.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Board after captures.
    pub board: Board,
    /// Opposing stones removed.
    pub captured: BTreeSet<Coord>,
    /// Own stones removed by an allowed suicide.
    pub self_captured: BTreeSet<Coord>,
    /// Digest of the resulting position, opponent to move.
    pub digest: PositionDigest,
}

/// Evaluates `color` playing at `coord`.
///
/// Checks run in order: turn, bounds and occupancy, suicide, repetition.
/// The first failing check decides the rejection.
#[instrument(skip(board, history, ruleset), fields(ko = %ruleset.ko_rule))]
pub fn evaluate_move(
    board: &Board,
    history: &MoveHistory,
    ruleset: &Ruleset,
    to_move: Stone,
    color: Stone,
    coord: Coord,
) -> Result<Evaluation, EngineError> {
    if color != to_move {
        warn!(expected = %to_move, attempted = %color, "Move out of turn");
        return Err(RuleViolation::NotYourTurn {
            expected: to_move,
            attempted: color,
        }
        .into());
    }

    let (mut next, captured, group) = board.place(color, coord)?.into_parts();

    let mut self_captured = BTreeSet::new();
    if group.liberty_count() == 0 && captured.is_empty() {
        if !ruleset.suicide_allowed {
            debug!("Suicide rejected");
            return Err(RuleViolation::SuicideMove { coord }.into());
        }
        next.clear(group.stones());
        self_captured = group.stones().clone();
        debug!(lost = self_captured.len(), "Suicide allowed, own group removed");
    }

    let candidate = digest(&next, color.opponent());
    if check_repetition(ruleset.ko_rule, history, candidate) {
        return Err(RuleViolation::KoViolation { coord }.into());
    }

    Ok(Evaluation {
        board: next,
        captured,
        self_captured,
        digest: candidate,
    })
}
