//! Session lifecycle through the registry: seating, play, endings, events.

use std::sync::Arc;
use strictly_baduk::{BoardSize, Coord, EndReason, Outcome, Ruleset, Stone};
use strictly_server::{EventKind, Phase, RecordingSink, SessionRegistry};

fn setup() -> (SessionRegistry, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    (SessionRegistry::new(sink.clone()), sink)
}

/// Creates `id` on a 9x9 board with alice (black) and bob (white) ready.
fn active(registry: &SessionRegistry, id: &str) {
    registry
        .create_session_with_id(id, Ruleset::with_size(BoardSize::Nine))
        .expect("create");
    assert_eq!(registry.join(id, "alice"), Ok(Stone::Black));
    assert_eq!(registry.join(id, "bob"), Ok(Stone::White));
    assert_eq!(registry.ready(id, "alice"), Ok(Phase::Waiting));
    assert_eq!(registry.ready(id, "bob"), Ok(Phase::Active));
}

#[test]
fn test_full_game_to_double_pass() {
    let (registry, sink) = setup();
    active(&registry, "g1");

    let report = registry
        .play("g1", "alice", Coord::new(4, 4))
        .expect("legal");
    assert_eq!(*report.to_move(), Stone::White);
    assert_eq!(*report.phase(), Phase::Active);
    registry.play("g1", "bob", Coord::new(2, 2)).expect("legal");

    let first = registry.pass("g1", "alice").expect("pass");
    assert_eq!(*first.phase(), Phase::Active);
    assert!(first.result().is_none());

    let second = registry.pass("g1", "bob").expect("pass");
    assert_eq!(*second.phase(), Phase::Completed);
    let result = second.result().clone().expect("counted");
    assert_eq!(result.reason, EndReason::DoublePass);
    assert!(result.score.is_some());

    let kinds: Vec<EventKind> = sink.events().iter().map(|e| *e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Created,
            EventKind::PlayerJoined,
            EventKind::PlayerJoined,
            EventKind::PlayerReady,
            EventKind::PlayerReady,
            EventKind::StonePlaced,
            EventKind::StonePlaced,
            EventKind::Passed,
            EventKind::Passed,
        ]
    );
    let sequences: Vec<u64> = sink.events().iter().map(|e| *e.sequence()).collect();
    assert_eq!(sequences, (1..=9).collect::<Vec<u64>>());

    let last = sink.events().last().cloned().expect("events emitted");
    assert_eq!(*last.snapshot().phase(), Phase::Completed);
    assert_eq!(last.actor().as_deref(), Some("bob"));
}

#[test]
fn test_rejections_emit_nothing_and_change_nothing() {
    let (registry, sink) = setup();
    active(&registry, "g1");
    registry.play("g1", "alice", Coord::new(4, 4)).expect("legal");
    let before = registry.snapshot("g1").expect("live");
    let emitted = sink.len();

    let occupied = registry
        .play("g1", "bob", Coord::new(4, 4))
        .expect_err("occupied");
    assert_eq!(occupied.code(), "OCCUPIED");

    let wrong_turn = registry
        .play("g1", "alice", Coord::new(0, 0))
        .expect_err("white to move");
    assert_eq!(wrong_turn.code(), "NOT_YOUR_TURN");

    let stranger = registry
        .pass("g1", "mallory")
        .expect_err("not seated");
    assert_eq!(stranger.code(), "NOT_SEATED");

    let late = registry.join("g1", "carol").expect_err("game started");
    assert_eq!(late.code(), "NOT_WAITING");

    assert_eq!(sink.len(), emitted);
    assert_eq!(registry.snapshot("g1").expect("live"), before);
}

#[test]
fn test_roster_faults() {
    let (registry, _) = setup();
    registry
        .create_session_with_id("g1", Ruleset::default())
        .expect("create");
    registry.join("g1", "alice").expect("seat");
    assert_eq!(
        registry.join("g1", "alice").map_err(|e| e.code()),
        Err("ALREADY_SEATED")
    );
    registry.join("g1", "bob").expect("seat");
    assert_eq!(
        registry.join("g1", "carol").map_err(|e| e.code()),
        Err("SESSION_FULL")
    );
    assert_eq!(
        registry
            .create_session_with_id("g1", Ruleset::default())
            .map_err(|e| e.code())
            .err(),
        Some("SESSION_EXISTS")
    );
}

#[test]
fn test_colors_follow_join_order() {
    let (registry, _) = setup();
    for id in ["a", "b"] {
        registry
            .create_session_with_id(id, Ruleset::default())
            .expect("create");
    }
    assert_eq!(registry.join("a", "zed"), Ok(Stone::Black));
    assert_eq!(registry.join("a", "amy"), Ok(Stone::White));
    assert_eq!(registry.join("b", "amy"), Ok(Stone::Black));
    assert_eq!(registry.join("b", "zed"), Ok(Stone::White));
}

#[test]
fn test_resignation_awards_other_player() {
    let (registry, sink) = setup();
    active(&registry, "g1");
    registry.play("g1", "alice", Coord::new(4, 4)).expect("legal");

    let report = registry.resign("g1", "alice").expect("resign");
    assert_eq!(*report.phase(), Phase::Completed);
    let result = report.result().clone().expect("result");
    assert_eq!(result.outcome, Outcome::Winner(Stone::White));
    assert_eq!(result.reason, EndReason::Resignation);
    assert!(result.score.is_none());

    let last = sink.events().last().cloned().expect("events emitted");
    assert_eq!(*last.kind(), EventKind::Resigned);

    let err = registry
        .play("g1", "bob", Coord::new(0, 0))
        .expect_err("game over");
    assert_eq!(err.code(), "GAME_NOT_ACTIVE");
}

#[test]
fn test_pause_then_timeout() {
    let (registry, _) = setup();
    active(&registry, "g1");
    assert_eq!(registry.pause("g1"), Ok(Phase::Paused));
    assert_eq!(
        registry
            .play("g1", "alice", Coord::new(0, 0))
            .map_err(|e| e.code())
            .err(),
        Some("GAME_NOT_ACTIVE")
    );
    assert_eq!(
        registry.pause("g1").map_err(|e| e.code()).err(),
        Some("GAME_NOT_ACTIVE")
    );
    assert_eq!(
        registry.resign("g1", "alice").map_err(|e| e.code()).err(),
        Some("GAME_NOT_ACTIVE")
    );

    let report = registry.timeout("g1", "alice").expect("timeout");
    let result = report.result().clone().expect("result");
    assert_eq!(result.outcome, Outcome::Winner(Stone::White));
    assert_eq!(result.reason, EndReason::Timeout);
    assert_eq!(
        registry.resume("g1").map_err(|e| e.code()).err(),
        Some("NOT_PAUSED")
    );
}

#[test]
fn test_request_scoring_counts_board() {
    let rules = Ruleset {
        komi: 0.5,
        ..Ruleset::with_size(BoardSize::Nine)
    };
    let (registry, _) = setup();
    registry.create_session_with_id("g1", rules).expect("create");
    registry.join("g1", "alice").expect("seat");
    registry.join("g1", "bob").expect("seat");
    registry.ready("g1", "alice").expect("ready");
    registry.ready("g1", "bob").expect("ready");

    // One black stone owns the whole board.
    registry.play("g1", "alice", Coord::new(4, 4)).expect("legal");
    let report = registry.request_scoring("g1", "bob").expect("scored");
    let result = report.result().clone().expect("counted");
    assert_eq!(result.reason, EndReason::Scored);
    assert_eq!(result.outcome, Outcome::Winner(Stone::Black));
    assert_eq!(result.margin, Some(81.0 - 0.5));
}

#[test]
fn test_abandon_and_archive() {
    let (registry, sink) = setup();
    active(&registry, "g1");
    let report = registry.abandon("g1").expect("abandon");
    assert_eq!(*report.phase(), Phase::Abandoned);
    assert_eq!(
        report.result().as_ref().map(|r| r.outcome),
        Some(Outcome::NoResult)
    );

    let archived = registry.archive("g1").expect("terminal");
    assert_eq!(*archived.phase(), Phase::Abandoned);
    assert_eq!(
        registry.snapshot("g1").map_err(|e| e.code()).err(),
        Some("SESSION_NOT_FOUND")
    );
    assert_eq!(
        sink.events().last().map(|e| *e.kind()),
        Some(EventKind::Abandoned)
    );
}

#[test]
fn test_chat_is_logged_and_broadcast() {
    let (registry, sink) = setup();
    active(&registry, "g1");
    registry.chat("g1", "bob", "good luck").expect("chat");
    let event = sink.events().last().cloned().expect("event");
    assert_eq!(*event.kind(), EventKind::Chat);
    let line = event.snapshot().log().last().cloned().expect("log line");
    assert_eq!(line.author().as_deref(), Some("bob"));
    assert_eq!(line.text(), "good luck");
}

#[test]
fn test_snapshot_is_stable_between_operations() {
    let (registry, _) = setup();
    active(&registry, "g1");
    registry.play("g1", "alice", Coord::new(2, 6)).expect("legal");
    let first = registry.snapshot("g1").expect("live");
    let second = registry.snapshot("g1").expect("live");
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).expect("serializable"),
        serde_json::to_vec(&second).expect("serializable")
    );
}
