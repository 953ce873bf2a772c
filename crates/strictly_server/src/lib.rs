//! Strictly Server - Go sessions on top of the strictly_baduk rules engine.
//!
//! # Architecture
//!
//! - **Session**: one game's roster, phase machine and chat log
//! - **Registry**: identifier → session map with a per-session lock
//! - **Events**: one [`SessionEvent`] per committed change, handed to an
//!   injected [`EventSink`]
//! - **Snapshot**: serializable view for persistence and broadcast
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strictly_baduk::{BoardSize, Coord, Ruleset};
//! use strictly_server::{Phase, RecordingSink, SessionRegistry};
//!
//! # fn example() -> Result<(), strictly_server::SessionError> {
//! let sink = Arc::new(RecordingSink::new());
//! let registry = SessionRegistry::new(sink.clone());
//! registry.create_session_with_id("g1", Ruleset::with_size(BoardSize::Nine))?;
//! registry.join("g1", "alice")?;
//! registry.join("g1", "bob")?;
//! registry.ready("g1", "alice")?;
//! assert_eq!(registry.ready("g1", "bob")?, Phase::Active);
//! registry.play("g1", "alice", Coord::new(4, 4))?;
//! assert_eq!(sink.len(), 6);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod error;
mod events;
mod registry;
mod script;
mod session;
mod snapshot;

pub use cli::{Cli, Command};
pub use config::ServerConfig;
pub use error::{ConfigError, RequestError, SessionError, SessionFault};
pub use events::{BroadcastSink, EventKind, EventSink, RecordingSink, SessionEvent, TracingSink};
pub use registry::SessionRegistry;
pub use script::{play_script, scripted_player};
pub use session::{
    DEFAULT_CHAT_LIMIT, EndReport, GameSession, LogEntry, MoveReport, Phase, PlayerId, Seat,
    SessionId,
};
pub use snapshot::SessionSnapshot;
