//! Plays a whitespace-separated move script through a registry.
//!
//! Tokens are GTP coordinates (`D4`, `Q16`), `pass` or `resign`. Two
//! synthetic players, `black` and `white`, are seated and readied first;
//! each token is played by whichever color holds the turn.

use crate::error::SessionError;
use crate::registry::SessionRegistry;
use crate::snapshot::SessionSnapshot;
use strictly_baduk::{Coord, EngineError, Ruleset, Stone};
use tracing::{debug, info, instrument};

/// Player id used for `color` in scripted sessions.
pub fn scripted_player(color: Stone) -> &'static str {
    match color {
        Stone::Black => "black",
        Stone::White => "white",
    }
}

/// Creates a session, seats both scripted players and plays `script`.
///
/// Returns the final snapshot. Stops at the first rejected token.
#[instrument(skip(registry, ruleset))]
pub fn play_script(
    registry: &SessionRegistry,
    ruleset: Ruleset,
    script: &str,
) -> Result<SessionSnapshot, SessionError> {
    let created = registry.create_session(ruleset)?;
    let id = created.id().as_str();
    for color in [Stone::Black, Stone::White] {
        registry.join(id, scripted_player(color))?;
    }
    for color in [Stone::Black, Stone::White] {
        registry.ready(id, scripted_player(color))?;
    }

    for token in script.split_whitespace() {
        let to_move = registry.snapshot(id)?.to_move().unwrap_or(Stone::Black);
        let player = scripted_player(to_move);
        debug!(token, player, "Playing token");
        match token.to_ascii_lowercase().as_str() {
            "pass" => {
                registry.pass(id, player)?;
            }
            "resign" => {
                registry.resign(id, player)?;
            }
            _ => {
                let coord =
                    Coord::parse(token, ruleset.board_size).map_err(EngineError::from)?;
                registry.play(id, player, coord)?;
            }
        }
    }

    let snapshot = registry.snapshot(id)?;
    info!(session_id = id, phase = %snapshot.phase(), moves = snapshot.moves().len(), "Script finished");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::session::Phase;
    use std::sync::Arc;
    use strictly_baduk::{BoardSize, EndReason};

    #[test]
    fn test_script_plays_to_double_pass() {
        let registry = SessionRegistry::new(Arc::new(RecordingSink::new()));
        let snapshot = play_script(
            &registry,
            Ruleset::with_size(BoardSize::Nine),
            "E5 C3 pass pass",
        )
        .expect("valid script");
        assert_eq!(*snapshot.phase(), Phase::Completed);
        assert_eq!(snapshot.moves().len(), 4);
        let result = snapshot.result().clone().expect("counted");
        assert_eq!(result.reason, EndReason::DoublePass);
    }

    #[test]
    fn test_script_rejects_bad_token() {
        let registry = SessionRegistry::new(Arc::new(RecordingSink::new()));
        let err = play_script(&registry, Ruleset::with_size(BoardSize::Nine), "E5 Z99")
            .expect_err("malformed coordinate");
        assert_eq!(err.code(), "MALFORMED_COORDINATE");
    }
}
