//! State-change events and the sinks that receive them.
//!
//! The registry hands every committed change to one injected [`EventSink`]
//! while the session write lock is still held, so a sink sees each session's
//! events in commit order. A sink must not call back into the registry for
//! the same session (the lock is not reentrant) and must not block or do
//! I/O inline; hand the event to a channel or buffer instead.

use crate::session::{PlayerId, SessionId};
use crate::snapshot::SessionSnapshot;
use derive_getters::Getters;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, trace};

/// What happened to a session.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// Session created.
    Created,
    /// A player took a seat.
    PlayerJoined,
    /// A player gave up a seat before the start.
    PlayerLeft,
    /// A player signalled readiness (possibly starting the game).
    PlayerReady,
    /// A stone was placed.
    StonePlaced,
    /// A player passed (possibly ending the game).
    Passed,
    /// A player resigned.
    Resigned,
    /// The board was counted on request.
    Scored,
    /// Play suspended.
    Paused,
    /// Play resumed.
    Resumed,
    /// A player lost on time.
    TimedOut,
    /// Session abandoned.
    Abandoned,
    /// Chat line appended.
    Chat,
}

/// One committed state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct SessionEvent {
    /// Per-session sequence number, starting at 1.
    sequence: u64,
    /// What happened.
    kind: EventKind,
    /// Session the event belongs to.
    session_id: SessionId,
    /// Player who caused it, if any.
    actor: Option<PlayerId>,
    /// Session state right after the change.
    snapshot: SessionSnapshot,
}

impl SessionEvent {
    pub(crate) fn new(
        sequence: u64,
        kind: EventKind,
        actor: Option<PlayerId>,
        snapshot: SessionSnapshot,
    ) -> Self {
        Self {
            sequence,
            kind,
            session_id: snapshot.id().clone(),
            actor,
            snapshot,
        }
    }
}

/// Receiver of committed session events.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    ///
    /// Called with the session write lock held. Calling back into the
    /// registry for that session deadlocks, and slow work here stalls every
    /// caller of the session. Everything the sink needs is in
    /// [`SessionEvent::snapshot`].
    fn emit(&self, event: SessionEvent);
}

impl<F> EventSink for F
where
    F: Fn(SessionEvent) + Send + Sync,
{
    fn emit(&self, event: SessionEvent) {
        self(event)
    }
}

// ─────────────────────────────────────────────────────────────
//  Sinks
// ─────────────────────────────────────────────────────────────

/// Fans events out to any number of async subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<SessionEvent>,
}

impl BroadcastSink {
    /// Creates a sink buffering up to `capacity` events per subscriber.
    #[instrument]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        info!("Creating broadcast event sink");
        Self { sender }
    }

    /// New receiver for every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: SessionEvent) {
        // No subscribers is not an error; the event is simply dropped.
        match self.sender.send(event) {
            Ok(receivers) => trace!(receivers, "Event broadcast"),
            Err(_) => trace!("Event dropped, no subscribers"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }

    /// Events for one session, in emission order.
    pub fn events_for(&self, session_id: &str) -> Vec<SessionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SessionEvent) {
        self.events.lock().push(event);
    }
}

/// Writes a log line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: SessionEvent) {
        debug!(
            session_id = %event.session_id,
            sequence = event.sequence,
            kind = %event.kind,
            actor = ?event.actor,
            phase = %event.snapshot.phase(),
            "Session event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DEFAULT_CHAT_LIMIT, GameSession};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strictly_baduk::{BoardSize, Ruleset};

    fn event(sequence: u64) -> SessionEvent {
        let session = GameSession::new(
            "g1".to_string(),
            Ruleset::with_size(BoardSize::Nine),
            DEFAULT_CHAT_LIMIT,
        )
        .expect("valid rules");
        SessionEvent::new(sequence, EventKind::Created, None, session.snapshot())
    }

    #[test]
    fn test_closure_is_a_sink() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sink = move |_: SessionEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        };
        sink.emit(event(1));
        sink.emit(event(2));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        for n in 1..=3 {
            sink.emit(event(n));
        }
        let sequences: Vec<u64> = sink.events().iter().map(|e| *e.sequence()).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(sink.events_for("g1").len(), 3);
        assert!(sink.events_for("other").is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_sink_delivers_to_subscribers() {
        let sink = BroadcastSink::new(8);
        let mut rx = sink.subscribe();
        sink.emit(event(1));
        let received = rx.recv().await.expect("event delivered");
        assert_eq!(*received.sequence(), 1);
        assert_eq!(*received.kind(), EventKind::Created);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_fine() {
        BroadcastSink::new(1).emit(event(1));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_sink_logs_each_event() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingSink.emit(event(1));
            TracingSink.emit(event(2));
        });

        let output = String::from_utf8(captured.0.lock().clone()).expect("utf8 log");
        assert_eq!(output.matches("Session event").count(), 2);
        assert!(output.contains("session_id=g1"));
        assert!(output.contains("kind=created"));
        assert!(output.contains("sequence=2"));
    }
}
