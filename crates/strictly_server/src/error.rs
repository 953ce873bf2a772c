//! Session-level error types.
//!
//! Rules-engine rejections pass through unchanged; the session layer adds
//! phase mismatches and roster/lookup faults. Every variant maps to a
//! stable reason code.

use crate::session::{Phase, PlayerId, SessionId};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use strictly_baduk::{EngineError, ErrorCategory};
use tracing::instrument;

/// Request does not fit the session's current phase, or is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestError {
    /// Moves, passes and resignations need an active game.
    #[display("Game is not active (phase: {phase})")]
    GameNotActive {
        /// Current phase.
        phase: Phase,
    },

    /// Seating and readiness only happen while waiting.
    #[display("Session is not accepting players (phase: {phase})")]
    NotWaiting {
        /// Current phase.
        phase: Phase,
    },

    /// Resume needs a paused game.
    #[display("Session is not paused (phase: {phase})")]
    NotPaused {
        /// Current phase.
        phase: Phase,
    },

    /// The session already reached a terminal phase.
    #[display("Session already ended (phase: {phase})")]
    AlreadyEnded {
        /// Current phase.
        phase: Phase,
    },

    /// Chat line was empty after trimming.
    #[display("Chat message is empty")]
    EmptyMessage,
}

impl std::error::Error for RequestError {}

/// Session lookup or roster fault.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionFault {
    /// No live session under this identifier.
    #[display("Session '{session_id}' not found")]
    SessionNotFound {
        /// Requested identifier.
        session_id: SessionId,
    },

    /// A session already uses this identifier.
    #[display("Session '{session_id}' already exists")]
    SessionExists {
        /// Requested identifier.
        session_id: SessionId,
    },

    /// Both seats are taken.
    #[display("Session '{session_id}' already has two players")]
    SessionFull {
        /// Session identifier.
        session_id: SessionId,
    },

    /// The player already holds a seat.
    #[display("Player '{player_id}' is already seated")]
    AlreadySeated {
        /// Player identifier.
        player_id: PlayerId,
    },

    /// The player holds no seat in this session.
    #[display("Player '{player_id}' is not seated in this session")]
    NotSeated {
        /// Player identifier.
        player_id: PlayerId,
    },

    /// Only terminal sessions can be archived.
    #[display("Session '{session_id}' is still live (phase: {phase})")]
    StillLive {
        /// Session identifier.
        session_id: SessionId,
        /// Current phase.
        phase: Phase,
    },
}

impl std::error::Error for SessionFault {}

/// Any rejection returned by a session or the registry.
#[derive(Debug, Clone, PartialEq, Display, Error, From)]
pub enum SessionError {
    /// The rules engine refused the move.
    #[display("{_0}")]
    Engine(EngineError),
    /// The request does not fit the session's phase.
    #[display("{_0}")]
    Request(RequestError),
    /// Lookup or roster fault.
    #[display("{_0}")]
    Fault(SessionFault),
}

impl SessionError {
    /// Broad category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::Engine(e) => e.category(),
            SessionError::Request(_) => ErrorCategory::Validation,
            SessionError::Fault(_) => ErrorCategory::SessionFault,
        }
    }

    /// Stable SCREAMING_SNAKE_CASE reason code.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Engine(e) => e.code(),
            SessionError::Request(e) => e.into(),
            SessionError::Fault(e) => e.into(),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_baduk::{Coord, RuleViolation};

    #[test]
    fn test_codes_and_categories() {
        let err = SessionError::from(SessionFault::SessionFull {
            session_id: "g1".to_string(),
        });
        assert_eq!(err.code(), "SESSION_FULL");
        assert_eq!(err.category(), ErrorCategory::SessionFault);

        let err = SessionError::from(RequestError::GameNotActive {
            phase: Phase::Waiting,
        });
        assert_eq!(err.code(), "GAME_NOT_ACTIVE");
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err = SessionError::from(EngineError::from(RuleViolation::Occupied {
            coord: Coord::new(0, 0),
        }));
        assert_eq!(err.code(), "OCCUPIED");
        assert_eq!(err.category(), ErrorCategory::RuleViolation);
    }

    #[test]
    fn test_config_error_tracks_location() {
        let err = ConfigError::new("bad value");
        assert!(err.file.ends_with("error.rs"));
        assert!(err.to_string().contains("bad value"));
    }
}
