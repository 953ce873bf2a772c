//! Go session state machine.
//!
//! One session owns one game: the roster, the phase, the chat log and the
//! typestate game value. Every operation validates first and commits last,
//! so a rejected request leaves the session exactly as it was.

use crate::error::{RequestError, SessionError, SessionFault};
use crate::snapshot::SessionSnapshot;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strictly_baduk::{
    Board, Captures, Coord, EngineError, GameFinished, GameInProgress, GameResult, GameSetup,
    MatchResult, Move, Ruleset, Stone,
};
use tracing::{debug, error, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// Default bound on the session log.
pub const DEFAULT_CHAT_LIMIT: usize = 200;

/// Lifecycle phase of a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Seating players and collecting readiness.
    Waiting,
    /// Moves are being played.
    Active,
    /// Play suspended, typically on disconnect.
    Paused,
    /// Game over with a result.
    Completed,
    /// Ended administratively without a result.
    Abandoned,
}

impl Phase {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Abandoned)
    }
}

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Seat {
    /// Player identity supplied by the caller.
    player_id: PlayerId,
    /// Color bound to this seat.
    color: Stone,
    /// Whether the player has signalled readiness.
    #[new(default)]
    ready: bool,
}

/// One line of the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct LogEntry {
    /// When the line was appended.
    at: DateTime<Utc>,
    /// Author, or `None` for system notes.
    author: Option<PlayerId>,
    /// Text of the line.
    text: String,
}

/// Game value in whichever typestate phase it currently is.
#[derive(Debug, Clone)]
enum GameState {
    Setup(GameSetup),
    InProgress(GameInProgress),
    Finished(GameFinished),
}

/// Result of an accepted placement.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct MoveReport {
    /// Board after the move.
    board: Board,
    /// Opponent stones removed by the move.
    captured: Vec<Coord>,
    /// Own stones removed by an allowed suicide.
    self_captured: Vec<Coord>,
    /// Color now holding the turn.
    to_move: Stone,
    /// Phase after the move.
    phase: Phase,
}

/// Result of an accepted pass or an ending request.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct EndReport {
    /// Phase after the operation.
    phase: Phase,
    /// Final result when the game ended.
    result: Option<MatchResult>,
}

/// A single Go game with its roster and lifecycle.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    phase: Phase,
    ruleset: Ruleset,
    /// Black seat first, white seat second.
    seats: [Option<Seat>; 2],
    game: GameState,
    log: VecDeque<LogEntry>,
    chat_limit: usize,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    event_sequence: u64,
    invariant_faults: u32,
}

fn seat_index(color: Stone) -> usize {
    match color {
        Stone::Black => 0,
        Stone::White => 1,
    }
}

impl GameSession {
    /// Creates a session in the waiting phase.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the ruleset is invalid.
    #[instrument(skip(ruleset), fields(session_id = %id, size = %ruleset.board_size))]
    pub fn new(id: SessionId, ruleset: Ruleset, chat_limit: usize) -> Result<Self, SessionError> {
        let setup = GameSetup::new(ruleset)?;
        info!("Creating new game session");
        Ok(Self {
            id,
            phase: Phase::Waiting,
            ruleset,
            seats: [None, None],
            game: GameState::Setup(setup),
            log: VecDeque::new(),
            chat_limit,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            event_sequence: 0,
            invariant_faults: 0,
        })
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rules for this session.
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Seat held by `player_id`, if any.
    pub fn seat_of(&self, player_id: &str) -> Option<&Seat> {
        self.seats
            .iter()
            .flatten()
            .find(|seat| seat.player_id == player_id)
    }

    /// Seat bound to `color`, if taken.
    pub fn seat(&self, color: Stone) -> Option<&Seat> {
        self.seats[seat_index(color)].as_ref()
    }

    /// Color holding the turn while a game is in progress.
    pub fn to_move(&self) -> Option<Stone> {
        match &self.game {
            GameState::InProgress(game) => Some(game.to_move()),
            _ => None,
        }
    }

    /// Final result once completed or abandoned.
    pub fn result(&self) -> Option<&MatchResult> {
        match &self.game {
            GameState::Finished(done) => Some(done.result()),
            _ => None,
        }
    }

    /// Invariant failures seen by this session.
    pub fn invariant_faults(&self) -> u32 {
        self.invariant_faults
    }

    /// Events stamped so far.
    pub fn event_sequence(&self) -> u64 {
        self.event_sequence
    }

    /// Stamps the next event sequence number.
    pub(crate) fn next_event_sequence(&mut self) -> u64 {
        self.event_sequence += 1;
        self.event_sequence
    }

    // ─────────────────────────────────────────────────────────────
    //  Roster
    // ─────────────────────────────────────────────────────────────

    /// Seats a player. The first seat is black, the second white.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn add_player(&mut self, player_id: PlayerId) -> Result<Stone, SessionError> {
        self.require_waiting()?;
        if self.seat_of(&player_id).is_some() {
            warn!(%player_id, "Player already seated");
            return Err(SessionFault::AlreadySeated { player_id }.into());
        }
        let Some(color) = [Stone::Black, Stone::White]
            .into_iter()
            .find(|color| self.seats[seat_index(*color)].is_none())
        else {
            warn!(%player_id, "Session already has 2 players");
            return Err(SessionFault::SessionFull {
                session_id: self.id.clone(),
            }
            .into());
        };

        info!(%player_id, %color, "Seating player");
        self.note(format!("{player_id} joined as {color}"));
        self.seats[seat_index(color)] = Some(Seat::new(player_id, color));
        Ok(color)
    }

    /// Frees a seat while waiting.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn remove_player(&mut self, player_id: &str) -> Result<Stone, SessionError> {
        self.require_waiting()?;
        let color = self.seated_color(player_id)?;
        info!(player_id, %color, "Freeing seat");
        self.seats[seat_index(color)] = None;
        self.note(format!("{player_id} left"));
        Ok(color)
    }

    /// Marks a seated player ready. Starts the game once both are ready.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn set_ready(&mut self, player_id: &str) -> Result<Phase, SessionError> {
        self.require_waiting()?;
        let color = self.seated_color(player_id)?;

        let both_ready = self
            .seats
            .iter()
            .all(|seat| seat.as_ref().is_some_and(|s| s.ready || s.color == color));
        let started = if both_ready {
            let GameState::Setup(setup) = &self.game else {
                return Err(self.fault("Waiting session without a setup game"));
            };
            Some(setup.clone().start()?)
        } else {
            None
        };

        if let Some(seat) = self.seats[seat_index(color)].as_mut() {
            seat.ready = true;
        }
        debug!(player_id, %color, "Player ready");
        if let Some(game) = started {
            self.game = GameState::InProgress(game);
            self.phase = Phase::Active;
            self.started_at = Some(Utc::now());
            info!("Both players ready, game started");
            self.note("game started".to_string());
        }
        Ok(self.phase)
    }

    // ─────────────────────────────────────────────────────────────
    //  Play
    // ─────────────────────────────────────────────────────────────

    /// Places a stone for the seated player.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn submit_move(
        &mut self,
        player_id: &str,
        coord: Coord,
    ) -> Result<MoveReport, SessionError> {
        let (game, color) = self.active_game(player_id)?;
        let next = match game.clone().play(color, coord) {
            Ok(next) => next,
            Err(e) => return Err(self.rejected(player_id, e)),
        };

        let last = next.history().last_move();
        let report = MoveReport {
            board: next.board().clone(),
            captured: last.map(|m| m.captured.clone()).unwrap_or_default(),
            self_captured: last.map(|m| m.self_captured.clone()).unwrap_or_default(),
            to_move: next.to_move(),
            phase: self.phase,
        };
        info!(
            player_id,
            %color,
            captured = report.captured.len(),
            "Move accepted"
        );
        self.game = GameState::InProgress(next);
        Ok(report)
    }

    /// Passes for the seated player. The second pass in a row completes
    /// the game with a counted result.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn submit_pass(&mut self, player_id: &str) -> Result<EndReport, SessionError> {
        let (game, color) = self.active_game(player_id)?;
        let next = match game.clone().pass(color) {
            Ok(next) => next,
            Err(e) => return Err(self.rejected(player_id, e)),
        };

        info!(player_id, %color, "Pass accepted");
        match next {
            GameResult::InProgress(game) => {
                self.game = GameState::InProgress(game);
                Ok(self.report())
            }
            GameResult::Finished(done) => Ok(self.complete(done)),
        }
    }

    /// The seated player resigns; the other player wins.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn resign(&mut self, player_id: &str) -> Result<EndReport, SessionError> {
        self.require_active()?;
        let color = self.seated_color(player_id)?;
        let done = self.in_progress()?.clone().resign(color);
        info!(player_id, %color, "Player resigned");
        Ok(self.complete(done))
    }

    /// Counts the board on request of a seated player.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn request_scoring(&mut self, player_id: &str) -> Result<EndReport, SessionError> {
        self.require_active()?;
        self.seated_color(player_id)?;
        let done = self.in_progress()?.clone().count();
        info!(player_id, "Scoring requested");
        Ok(self.complete(done))
    }

    // ─────────────────────────────────────────────────────────────
    //  Administrative transitions
    // ─────────────────────────────────────────────────────────────

    /// Suspends an active game.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn pause(&mut self) -> Result<Phase, SessionError> {
        self.require_active()?;
        self.phase = Phase::Paused;
        info!("Game paused");
        self.note("game paused".to_string());
        Ok(self.phase)
    }

    /// Resumes a paused game.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn resume(&mut self) -> Result<Phase, SessionError> {
        if self.phase != Phase::Paused {
            return Err(RequestError::NotPaused { phase: self.phase }.into());
        }
        self.phase = Phase::Active;
        info!("Game resumed");
        self.note("game resumed".to_string());
        Ok(self.phase)
    }

    /// `player_id` ran out of time; the other player wins without counting.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn time_out(&mut self, player_id: &str) -> Result<EndReport, SessionError> {
        self.require_live_game()?;
        let color = self.seated_color(player_id)?;
        let done = self.in_progress()?.clone().time_out(color);
        info!(player_id, %color, "Player timed out");
        Ok(self.complete(done))
    }

    /// Ends the session without a result from any non-terminal phase.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn abandon(&mut self) -> Result<EndReport, SessionError> {
        if self.phase.is_terminal() {
            return Err(RequestError::AlreadyEnded { phase: self.phase }.into());
        }
        let finished = match &self.game {
            GameState::InProgress(game) => Some(game.clone().abandon()),
            _ => None,
        };
        if let Some(done) = finished {
            self.game = GameState::Finished(done);
        }
        self.phase = Phase::Abandoned;
        self.ended_at = Some(Utc::now());
        info!("Session abandoned");
        self.note("session abandoned".to_string());
        Ok(self.report())
    }

    /// Appends a chat line from a seated player.
    #[instrument(skip(self, text), fields(session_id = %self.id))]
    pub fn chat(&mut self, player_id: &str, text: &str) -> Result<(), SessionError> {
        self.seated_color(player_id)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(RequestError::EmptyMessage.into());
        }
        self.push_log(LogEntry::new(
            Utc::now(),
            Some(player_id.to_string()),
            text.to_string(),
        ));
        Ok(())
    }

    /// Serializable view of the whole session.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn snapshot(&self) -> SessionSnapshot {
        let (board, moves, to_move, passes, captures) = match &self.game {
            GameState::Setup(setup) => (
                Board::new(setup.ruleset().board_size),
                Vec::new(),
                None,
                0,
                Captures::default(),
            ),
            GameState::InProgress(game) => (
                game.board().clone(),
                game.history().moves().to_vec(),
                Some(game.to_move()),
                game.consecutive_passes(),
                game.captures(),
            ),
            GameState::Finished(done) => (
                done.board().clone(),
                done.history().moves().to_vec(),
                None,
                0,
                done.captures(),
            ),
        };
        SessionSnapshot::new(
            self.id.clone(),
            self.phase,
            self.ruleset,
            self.seats.iter().flatten().cloned().collect(),
            board,
            to_move,
            passes,
            captures,
            moves,
            self.result().cloned(),
            self.log.iter().cloned().collect(),
            self.created_at,
            self.started_at,
            self.ended_at,
            self.event_sequence,
            self.invariant_faults,
        )
    }

    /// Moves played so far.
    pub fn moves(&self) -> &[Move] {
        match &self.game {
            GameState::Setup(_) => &[],
            GameState::InProgress(game) => game.history().moves(),
            GameState::Finished(done) => done.history().moves(),
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Helpers
    // ─────────────────────────────────────────────────────────────

    fn require_waiting(&self) -> Result<(), SessionError> {
        if self.phase != Phase::Waiting {
            return Err(RequestError::NotWaiting { phase: self.phase }.into());
        }
        Ok(())
    }

    fn require_active(&self) -> Result<(), SessionError> {
        if self.phase != Phase::Active {
            return Err(RequestError::GameNotActive { phase: self.phase }.into());
        }
        Ok(())
    }

    /// Active or paused.
    fn require_live_game(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Active | Phase::Paused => Ok(()),
            phase => Err(RequestError::GameNotActive { phase }.into()),
        }
    }

    fn seated_color(&self, player_id: &str) -> Result<Stone, SessionError> {
        self.seat_of(player_id)
            .map(|seat| seat.color)
            .ok_or_else(|| {
                SessionFault::NotSeated {
                    player_id: player_id.to_string(),
                }
                .into()
            })
    }

    fn in_progress(&self) -> Result<&GameInProgress, SessionError> {
        match &self.game {
            GameState::InProgress(game) => Ok(game),
            _ => Err(self.fault("Live phase without a game in progress")),
        }
    }

    fn active_game(&self, player_id: &str) -> Result<(&GameInProgress, Stone), SessionError> {
        self.require_active()?;
        let color = self.seated_color(player_id)?;
        Ok((self.in_progress()?, color))
    }

    fn fault(&self, description: &str) -> SessionError {
        error!(session_id = %self.id, phase = %self.phase, description, "Session state inconsistent");
        EngineError::from(strictly_baduk::InvariantViolation::new(description)).into()
    }

    /// Logs an engine rejection and counts invariant failures.
    fn rejected(&mut self, player_id: &str, e: EngineError) -> SessionError {
        if matches!(e, EngineError::Invariant(_)) {
            self.invariant_faults += 1;
            error!(player_id, error = %e, faults = self.invariant_faults, "Invariant failure");
        } else {
            warn!(player_id, code = e.code(), error = %e, "Move rejected");
        }
        e.into()
    }

    fn complete(&mut self, done: GameFinished) -> EndReport {
        info!(result = %done.result(), "Game completed");
        self.note(format!("game over: {}", done.result()));
        self.game = GameState::Finished(done);
        self.phase = Phase::Completed;
        self.ended_at = Some(Utc::now());
        self.report()
    }

    fn report(&self) -> EndReport {
        EndReport {
            phase: self.phase,
            result: self.result().cloned(),
        }
    }

    fn note(&mut self, text: String) {
        self.push_log(LogEntry::new(Utc::now(), None, text));
    }

    fn push_log(&mut self, entry: LogEntry) {
        if self.chat_limit == 0 {
            return;
        }
        while self.log.len() >= self.chat_limit {
            self.log.pop_front();
        }
        self.log.push_back(entry);
    }
}
