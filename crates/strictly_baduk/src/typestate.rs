//! Phase-specific typestate structs for a Go game.
//!
//! Each phase is its own type with phase-specific fields. A finished game
//! always has a result; a game in progress never does.

use crate::action::{Move, MoveKind};
use crate::board::Board;
use crate::contracts::{Attempt, Contract, MoveContract};
use crate::error::EngineError;
use crate::ledger::{MoveHistory, digest};
use crate::phases::{EndReason, MatchResult};
use crate::rules::{evaluate_move, score};
use crate::ruleset::Ruleset;
use crate::types::{Captures, Coord, Stone};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// Passes in a row that end the game.
pub const PASSES_TO_END: u8 = 2;

// ─────────────────────────────────────────────────────────────
//  Setup Phase
// ─────────────────────────────────────────────────────────────

/// Game in setup phase: rules chosen, board not yet laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSetup {
    ruleset: Ruleset,
}

impl GameSetup {
    /// Creates a game in setup phase.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid handicap or komi.
    #[instrument]
    pub fn new(ruleset: Ruleset) -> Result<Self, EngineError> {
        ruleset.validate()?;
        Ok(Self { ruleset })
    }

    /// The rules this game will be played under.
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Lays out the board (placing handicap stones) and starts play.
    #[instrument(skip(self), fields(size = %self.ruleset.board_size, handicap = self.ruleset.handicap))]
    pub fn start(self) -> Result<GameInProgress, EngineError> {
        let board = Board::with_handicap(self.ruleset.board_size, self.ruleset.handicap)?;
        let to_move = self.ruleset.first_to_move();
        let history = MoveHistory::new(digest(&board, to_move));
        info!(first = %to_move, "Game started");
        Ok(GameInProgress {
            ruleset: self.ruleset,
            board,
            history,
            to_move,
            consecutive_passes: 0,
            captures: Captures::default(),
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// Game in progress: accepts moves and passes.
#[derive(Debug, Clone, PartialEq)]
pub struct GameInProgress {
    pub(crate) ruleset: Ruleset,
    pub(crate) board: Board,
    pub(crate) history: MoveHistory,
    pub(crate) to_move: Stone,
    pub(crate) consecutive_passes: u8,
    pub(crate) captures: Captures,
}

impl GameInProgress {
    /// Places a stone for `color`, consuming the game.
    ///
    /// Preconditions are checked always; the post-move invariants are
    /// checked always as well, and a violation aborts the move.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]: wrong turn, off the board, occupied, suicide,
    /// ko, or an invariant violation.
    #[instrument(skip(self), fields(to_move = %self.to_move, sequence = self.history.next_sequence()))]
    pub fn play(self, color: Stone, coord: Coord) -> Result<GameInProgress, EngineError> {
        match self.apply(color, MoveKind::Place(coord), Utc::now())? {
            GameResult::InProgress(game) => Ok(game),
            // A placement resets the pass counter, so it never ends the game.
            GameResult::Finished(_) => Err(crate::error::InvariantViolation::new(
                "Placement finished the game",
            )
            .into()),
        }
    }

    /// Passes for `color`, consuming the game.
    ///
    /// The second pass in a row counts the board and finishes the game.
    #[instrument(skip(self), fields(to_move = %self.to_move, passes = self.consecutive_passes))]
    pub fn pass(self, color: Stone) -> Result<GameResult, EngineError> {
        self.apply(color, MoveKind::Pass, Utc::now())
    }

    fn apply(
        self,
        color: Stone,
        kind: MoveKind,
        played_at: DateTime<Utc>,
    ) -> Result<GameResult, EngineError> {
        let before = self.clone();
        MoveContract::pre(&self, &Attempt { color, kind })?;

        let mut game = self;
        let sequence = game.history.next_sequence();
        match kind {
            MoveKind::Place(coord) => {
                let eval = evaluate_move(
                    &game.board,
                    &game.history,
                    &game.ruleset,
                    game.to_move,
                    color,
                    coord,
                )?;
                game.captures.credit(color, eval.captured.len());
                game.captures
                    .credit(color.opponent(), eval.self_captured.len());
                game.board = eval.board;
                game.history.record(
                    Move {
                        sequence,
                        color,
                        kind,
                        captured: eval.captured.into_iter().collect(),
                        self_captured: eval.self_captured.into_iter().collect(),
                        played_at,
                    },
                    eval.digest,
                );
                game.consecutive_passes = 0;
            }
            MoveKind::Pass => {
                let next_digest = digest(&game.board, color.opponent());
                game.history.record(
                    Move {
                        sequence,
                        color,
                        kind,
                        captured: Vec::new(),
                        self_captured: Vec::new(),
                        played_at,
                    },
                    next_digest,
                );
                game.consecutive_passes = game.consecutive_passes.saturating_add(1);
            }
        }
        game.to_move = color.opponent();

        MoveContract::post(&before, &game)?;

        if game.consecutive_passes >= PASSES_TO_END {
            debug!("Consecutive passes end the game");
            return Ok(GameResult::Finished(game.finish_by_count(EndReason::DoublePass)));
        }
        Ok(GameResult::InProgress(game))
    }

    /// Counts the board now and finishes the game (explicit end request).
    #[instrument(skip(self))]
    pub fn count(self) -> GameFinished {
        self.finish_by_count(EndReason::Scored)
    }

    /// `color` resigns; the opponent wins.
    #[instrument(skip(self))]
    pub fn resign(self, color: Stone) -> GameFinished {
        self.finish(MatchResult::forfeit(color.opponent(), EndReason::Resignation))
    }

    /// `color` loses on time; the opponent wins without counting.
    #[instrument(skip(self))]
    pub fn time_out(self, color: Stone) -> GameFinished {
        self.finish(MatchResult::forfeit(color.opponent(), EndReason::Timeout))
    }

    /// Ends the game without a result.
    #[instrument(skip(self))]
    pub fn abandon(self) -> GameFinished {
        self.finish(MatchResult::abandoned())
    }

    fn finish_by_count(self, reason: EndReason) -> GameFinished {
        let score = score(&self.board, self.captures, &self.ruleset);
        self.finish(MatchResult::counted(score, reason))
    }

    fn finish(self, result: MatchResult) -> GameFinished {
        info!(%result, moves = self.history.len(), "Game finished");
        GameFinished {
            ruleset: self.ruleset,
            board: self.board,
            history: self.history,
            captures: self.captures,
            result,
        }
    }

    /// Color holding the turn.
    pub fn to_move(&self) -> Stone {
        self.to_move
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Move history and position ledger.
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Rules in force.
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Passes in a row so far.
    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    /// Prisoners taken by each color.
    pub fn captures(&self) -> Captures {
        self.captures
    }

    /// Every intersection where the player to move may legally play.
    #[instrument(skip(self))]
    pub fn legal_moves(&self) -> Vec<Coord> {
        self.board
            .coords()
            .filter(|coord| self.board.is_empty_at(*coord))
            .filter(|coord| {
                evaluate_move(
                    &self.board,
                    &self.history,
                    &self.ruleset,
                    self.to_move,
                    self.to_move,
                    *coord,
                )
                .is_ok()
            })
            .collect()
    }

    /// Rebuilds a game by replaying `moves` from the start.
    ///
    /// Recorded timestamps are kept, so replaying a game's own history
    /// reproduces it exactly.
    #[instrument(skip(moves), fields(count = moves.len()))]
    pub fn replay(ruleset: Ruleset, moves: &[Move]) -> Result<GameResult, EngineError> {
        let mut game = GameSetup::new(ruleset)?.start()?;
        for mv in moves {
            match game.apply(mv.color, mv.kind, mv.played_at)? {
                GameResult::InProgress(next) => game = next,
                GameResult::Finished(done) => return Ok(GameResult::Finished(done)),
            }
        }
        Ok(GameResult::InProgress(game))
    }

    /// The game as it was before the last move.
    ///
    /// Returns `None` when no move has been played.
    #[instrument(skip(self))]
    pub fn undo(&self) -> Option<Result<GameInProgress, EngineError>> {
        let (_, earlier) = self.history.moves().split_last()?;
        let replayed = Self::replay(self.ruleset, earlier).and_then(|result| match result {
            GameResult::InProgress(game) => Ok(game),
            GameResult::Finished(_) => Err(crate::error::InvariantViolation::new(
                "History prefix already finished the game",
            )
            .into()),
        });
        Some(replayed)
    }
}

// ─────────────────────────────────────────────────────────────
//  Finished Phase
// ─────────────────────────────────────────────────────────────

/// Game finished: the result is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFinished {
    ruleset: Ruleset,
    board: Board,
    history: MoveHistory,
    captures: Captures,
    result: MatchResult,
}

impl GameFinished {
    /// The result. Never optional.
    pub fn result(&self) -> &MatchResult {
        &self.result
    }

    /// Final board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Complete history.
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Rules the game was played under.
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Prisoners taken by each color.
    pub fn captures(&self) -> Captures {
        self.captures
    }
}

// ─────────────────────────────────────────────────────────────
//  Result Type
// ─────────────────────────────────────────────────────────────

/// Result of a pass or replay.
#[derive(Debug, Clone)]
pub enum GameResult {
    /// Game continues.
    InProgress(GameInProgress),
    /// Game finished.
    Finished(GameFinished),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardSize;

    fn nine() -> GameInProgress {
        GameSetup::new(Ruleset::with_size(BoardSize::Nine))
            .and_then(GameSetup::start)
            .expect("valid rules")
    }

    #[test]
    fn test_turn_alternates() {
        let game = nine();
        assert_eq!(game.to_move(), Stone::Black);
        let game = game.play(Stone::Black, Coord::new(2, 2)).expect("legal");
        assert_eq!(game.to_move(), Stone::White);
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history().digests().len(), 2);
    }

    #[test]
    fn test_play_resets_passes() {
        let game = nine();
        let game = match game.pass(Stone::Black).expect("legal pass") {
            GameResult::InProgress(g) => g,
            GameResult::Finished(_) => panic!("one pass must not end the game"),
        };
        assert_eq!(game.consecutive_passes(), 1);
        let game = game.play(Stone::White, Coord::new(4, 4)).expect("legal");
        assert_eq!(game.consecutive_passes(), 0);
    }

    #[test]
    fn test_handicap_gives_white_first_move() {
        let rules = Ruleset {
            handicap: 3,
            ..Ruleset::with_size(BoardSize::Nine)
        };
        let game = GameSetup::new(rules)
            .and_then(GameSetup::start)
            .expect("valid rules");
        assert_eq!(game.to_move(), Stone::White);
        assert_eq!(game.board().stone_count(Stone::Black), 3);
    }

    #[test]
    fn test_undo_restores_previous_position() {
        let game = nine();
        assert!(game.undo().is_none());
        let first = game.play(Stone::Black, Coord::new(2, 2)).expect("legal");
        let second = first
            .clone()
            .play(Stone::White, Coord::new(6, 6))
            .expect("legal");
        let undone = second.undo().expect("has moves").expect("replayable");
        assert_eq!(undone, first);
    }

    #[test]
    fn test_resign_and_timeout_award_opponent() {
        let finished = nine().resign(Stone::White);
        assert_eq!(finished.result().outcome.winner(), Some(Stone::Black));
        assert_eq!(finished.result().reason, EndReason::Resignation);

        let finished = nine().time_out(Stone::Black);
        assert_eq!(finished.result().outcome.winner(), Some(Stone::White));
        assert_eq!(finished.result().reason, EndReason::Timeout);
    }

    #[test]
    fn test_legal_moves_on_empty_board() {
        assert_eq!(nine().legal_moves().len(), 81);
    }
}
