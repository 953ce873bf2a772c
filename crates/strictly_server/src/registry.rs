//! Session registry and per-session concurrency gate.
//!
//! The map lock is held only to look up, insert or remove a session. Each
//! session sits behind its own `RwLock`: mutations are serialized per
//! session, reads share the lock, and different sessions never contend.

use crate::config::ServerConfig;
use crate::error::{SessionError, SessionFault};
use crate::events::{EventKind, EventSink, SessionEvent};
use crate::session::{EndReport, GameSession, MoveReport, Phase, PlayerId, SessionId};
use crate::snapshot::SessionSnapshot;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use strictly_baduk::{Coord, Ruleset, Stone};
use tracing::{debug, info, instrument, warn};

type SessionHandle = Arc<RwLock<GameSession>>;

/// Owns every live session and serializes access to each.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
    sink: Arc<dyn EventSink>,
    chat_limit: usize,
    next_id: Arc<AtomicU64>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.read().len())
            .field("chat_limit", &self.chat_limit)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Creates an empty registry emitting into `sink`.
    #[instrument(skip(sink))]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(&ServerConfig::default(), sink)
    }

    /// Creates an empty registry using the configured log bound.
    #[instrument(skip(config, sink), fields(chat_limit = *config.chat_limit()))]
    pub fn with_config(config: &ServerConfig, sink: Arc<dyn EventSink>) -> Self {
        info!("Creating session registry");
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            sink,
            chat_limit: *config.chat_limit(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Lifecycle
    // ─────────────────────────────────────────────────────────────

    /// Creates a session under a caller-chosen identifier.
    ///
    /// # Errors
    ///
    /// `SessionExists` if the identifier is taken; a validation error for
    /// invalid rules.
    #[instrument(skip(self, ruleset))]
    pub fn create_session_with_id(
        &self,
        id: impl Into<SessionId> + fmt::Debug,
        ruleset: Ruleset,
    ) -> Result<SessionSnapshot, SessionError> {
        let id = id.into();
        let session = GameSession::new(id.clone(), ruleset, self.chat_limit)?;
        let mut sessions = self.sessions.write();
        if sessions.contains_key(&id) {
            warn!(session_id = %id, "Session already exists");
            return Err(SessionFault::SessionExists { session_id: id }.into());
        }
        let handle = Arc::new(RwLock::new(session));
        // Lock the session before publishing it so its Created event is
        // always the first one.
        let mut guard = handle.write();
        sessions.insert(id.clone(), Arc::clone(&handle));
        drop(sessions);

        info!(session_id = %id, "Created new session");
        Ok(self.commit(&mut guard, EventKind::Created, None))
    }

    /// Creates a session under a generated identifier.
    #[instrument(skip(self, ruleset))]
    pub fn create_session(&self, ruleset: Ruleset) -> Result<SessionSnapshot, SessionError> {
        loop {
            let id = format!("game-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
            match self.create_session_with_id(id, ruleset) {
                Err(SessionError::Fault(SessionFault::SessionExists { session_id })) => {
                    debug!(%session_id, "Generated id taken, trying next");
                }
                other => return other,
            }
        }
    }

    /// Removes a completed or abandoned session and returns its final state.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, or `StillLive` if the session has not ended.
    #[instrument(skip(self))]
    pub fn archive(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        let mut sessions = self.sessions.write();
        let handle = sessions
            .get(session_id)
            .ok_or_else(|| not_found(session_id))?;
        let snapshot = {
            let session = handle.read();
            if !session.phase().is_terminal() {
                return Err(SessionFault::StillLive {
                    session_id: session_id.to_string(),
                    phase: session.phase(),
                }
                .into());
            }
            session.snapshot()
        };
        sessions.remove(session_id);
        info!(session_id, "Session archived");
        Ok(snapshot)
    }

    /// Identifiers of every live session, sorted.
    #[instrument(skip(self))]
    pub fn list(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }

    /// Current state of one session.
    #[instrument(skip(self))]
    pub fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        let handle = self.handle(session_id)?;
        let session = handle.read();
        Ok(session.snapshot())
    }

    // ─────────────────────────────────────────────────────────────
    //  Roster
    // ─────────────────────────────────────────────────────────────

    /// Seats a player; returns the assigned color.
    #[instrument(skip(self))]
    pub fn join(&self, session_id: &str, player_id: &str) -> Result<Stone, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::PlayerJoined, |s| {
            s.add_player(player_id.to_string())
        })
    }

    /// Frees a player's seat before the game starts.
    #[instrument(skip(self))]
    pub fn leave(&self, session_id: &str, player_id: &str) -> Result<Stone, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::PlayerLeft, |s| {
            s.remove_player(player_id)
        })
    }

    /// Marks a player ready; returns the phase afterwards.
    #[instrument(skip(self))]
    pub fn ready(&self, session_id: &str, player_id: &str) -> Result<Phase, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::PlayerReady, |s| {
            s.set_ready(player_id)
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  Play
    // ─────────────────────────────────────────────────────────────

    /// Places a stone.
    #[instrument(skip(self))]
    pub fn play(
        &self,
        session_id: &str,
        player_id: &str,
        coord: Coord,
    ) -> Result<MoveReport, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::StonePlaced, |s| {
            s.submit_move(player_id, coord)
        })
    }

    /// Passes.
    #[instrument(skip(self))]
    pub fn pass(&self, session_id: &str, player_id: &str) -> Result<EndReport, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::Passed, |s| {
            s.submit_pass(player_id)
        })
    }

    /// Resigns for `player_id`.
    #[instrument(skip(self))]
    pub fn resign(&self, session_id: &str, player_id: &str) -> Result<EndReport, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::Resigned, |s| {
            s.resign(player_id)
        })
    }

    /// Counts the board now.
    #[instrument(skip(self))]
    pub fn request_scoring(
        &self,
        session_id: &str,
        player_id: &str,
    ) -> Result<EndReport, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::Scored, |s| {
            s.request_scoring(player_id)
        })
    }

    /// Appends a chat line.
    #[instrument(skip(self, text))]
    pub fn chat(&self, session_id: &str, player_id: &str, text: &str) -> Result<(), SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::Chat, |s| {
            s.chat(player_id, text)
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  Administrative
    // ─────────────────────────────────────────────────────────────

    /// Suspends an active game.
    #[instrument(skip(self))]
    pub fn pause(&self, session_id: &str) -> Result<Phase, SessionError> {
        self.mutate(session_id, None, EventKind::Paused, GameSession::pause)
    }

    /// Resumes a paused game.
    #[instrument(skip(self))]
    pub fn resume(&self, session_id: &str) -> Result<Phase, SessionError> {
        self.mutate(session_id, None, EventKind::Resumed, GameSession::resume)
    }

    /// `player_id` lost on time.
    #[instrument(skip(self))]
    pub fn timeout(&self, session_id: &str, player_id: &str) -> Result<EndReport, SessionError> {
        self.mutate(session_id, Some(player_id), EventKind::TimedOut, |s| {
            s.time_out(player_id)
        })
    }

    /// Ends the session without a result.
    #[instrument(skip(self))]
    pub fn abandon(&self, session_id: &str) -> Result<EndReport, SessionError> {
        self.mutate(session_id, None, EventKind::Abandoned, GameSession::abandon)
    }

    // ─────────────────────────────────────────────────────────────
    //  Gate
    // ─────────────────────────────────────────────────────────────

    fn handle(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| not_found(session_id))
    }

    /// Runs `op` under the session's write lock and emits one event if it
    /// succeeds.
    fn mutate<T>(
        &self,
        session_id: &str,
        actor: Option<&str>,
        kind: EventKind,
        op: impl FnOnce(&mut GameSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let handle = self.handle(session_id)?;
        let mut session = handle.write();
        let value = op(&mut *session).inspect_err(|e| {
            debug!(session_id, code = e.code(), %kind, "Operation rejected");
        })?;
        self.commit(&mut session, kind, actor.map(PlayerId::from));
        Ok(value)
    }

    fn commit(
        &self,
        session: &mut GameSession,
        kind: EventKind,
        actor: Option<PlayerId>,
    ) -> SessionSnapshot {
        let sequence = session.next_event_sequence();
        let snapshot = session.snapshot();
        debug!(session_id = %snapshot.id(), sequence, %kind, "Emitting event");
        // Write lock still held; sinks must not re-enter the registry.
        self.sink
            .emit(SessionEvent::new(sequence, kind, actor, snapshot.clone()));
        snapshot
    }
}

fn not_found(session_id: &str) -> SessionError {
    SessionFault::SessionNotFound {
        session_id: session_id.to_string(),
    }
    .into()
}
