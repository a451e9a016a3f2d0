//! Chat server implementation
//!
//! Owns one instance of every shared component and hands sessions their
//! dependencies at admission time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::config::ChatConfig;
use crate::broadcast::Broadcaster;
use crate::history::{Message, MessageLog};
use crate::protocol::ServerEvent;
use crate::registry::ConnectionRegistry;
use crate::room::{Room, RoomDirectory, RoomError, RoomKind};
use crate::session::{AdmissionError, Session, SessionDeps};
use crate::stats::{ServerStats, StatsSnapshot};
use crate::transport::{ChannelTransport, Transport};
use crate::{ParticipantId, RoomId};

/// The fan-out core of a multi-room chat service
///
/// Holds the room directory, message log, connection registry and broadcast
/// engine. All methods are safe to call concurrently from independent tasks.
pub struct ChatServer {
    config: ChatConfig,
    directory: Arc<RoomDirectory>,
    deps: SessionDeps,
    next_session_id: AtomicU64,
}

impl ChatServer {
    /// Create a server with default configuration.
    pub fn new() -> Self {
        Self::with_config(ChatConfig::default())
    }

    /// Create a server with custom configuration.
    pub fn with_config(config: ChatConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let stats = Arc::new(ServerStats::new());
        let deps = SessionDeps {
            history: Arc::new(MessageLog::new()),
            registry: Arc::clone(&registry),
            broadcaster: Broadcaster::new(registry, Arc::clone(&stats)),
            stats,
        };

        Self {
            config,
            directory: Arc::new(RoomDirectory::new()),
            deps,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Create a room and initialize its message log.
    ///
    /// Must happen before any session may be admitted to the room.
    pub async fn create_room(
        &self,
        id: RoomId,
        kind: RoomKind,
        created_by: ParticipantId,
        members: impl IntoIterator<Item = ParticipantId>,
        name: Option<String>,
    ) -> Result<Room, RoomError> {
        let room = self
            .directory
            .create(id, kind, created_by, members, name)
            .await?;
        self.deps.history.create_room(id).await;
        Ok(room)
    }

    /// Admit a connection with an externally owned transport.
    ///
    /// The admission outcome tells the collaborator which close reason to
    /// surface: see [`AdmissionError::reason`] and [`AdmissionError::close_code`].
    pub async fn connect(
        &self,
        room: RoomId,
        participant: ParticipantId,
        transport: Arc<dyn Transport>,
    ) -> Result<Session, AdmissionError> {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        match Session::admit(
            session_id,
            room,
            participant,
            transport,
            &self.directory,
            self.deps.clone(),
        )
        .await
        {
            Ok(session) => Ok(session),
            Err(e) => {
                tracing::info!(
                    room = room,
                    participant = participant,
                    reason = e.reason(),
                    "Admission refused"
                );
                Err(e)
            }
        }
    }

    /// Admit a connection over a fresh channel transport.
    ///
    /// Convenience for collaborators that drain a `tokio::sync::mpsc` receiver
    /// into their socket; the buffer size comes from the configuration.
    pub async fn connect_channel(
        &self,
        room: RoomId,
        participant: ParticipantId,
    ) -> Result<(Session, mpsc::Receiver<ServerEvent>), AdmissionError> {
        let (transport, rx) = ChannelTransport::channel(self.config.delivery_buffer);
        let session = self.connect(room, participant, transport).await?;
        Ok((session, rx))
    }

    /// Up to `limit` most recent messages for a room, oldest first.
    ///
    /// `None` uses the configured default limit.
    pub async fn recent_messages(&self, room: RoomId, limit: Option<usize>) -> Vec<Message> {
        self.deps
            .history
            .recent(room, limit.unwrap_or(self.config.history_limit))
            .await
    }

    /// Participants currently connected to a room, sorted.
    pub async fn active_participants(&self, room: RoomId) -> Vec<ParticipantId> {
        self.deps.registry.active_participants(room).await
    }

    /// Look up a room record.
    pub async fn room(&self, id: RoomId) -> Option<Room> {
        self.directory.room(id).await
    }

    /// Every room whose membership contains `participant`.
    pub async fn rooms_of_member(&self, participant: ParticipantId) -> Vec<Room> {
        self.directory.rooms_of_member(participant).await
    }

    /// Add a member to a room. Does not affect connected sessions.
    pub async fn add_member(&self, room: RoomId, participant: ParticipantId) -> bool {
        self.directory.add_member(room, participant).await
    }

    /// Remove a member from a room. Does not disconnect an active session.
    pub async fn remove_member(&self, room: RoomId, participant: ParticipantId) -> bool {
        self.directory.remove_member(room, participant).await
    }

    /// Point-in-time copy of the server counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.deps.stats.snapshot()
    }

    /// The connection registry, for collaborators with presence needs beyond
    /// [`active_participants`](Self::active_participants).
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.deps.registry
    }

    /// The server configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}

impl Default for ChatServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::session::SessionPhase;

    async fn server_with_room(members: &[ParticipantId]) -> ChatServer {
        let server = ChatServer::new();
        server
            .create_room(1, RoomKind::Group, members[0], members.iter().copied(), None)
            .await
            .unwrap();
        server
    }

    fn frame(content: &str) -> Bytes {
        Bytes::from(format!(r#"{{"content":"{}"}}"#, content))
    }

    #[tokio::test]
    async fn test_admission_outcomes() {
        let server = server_with_room(&[1, 2]).await;

        assert!(server.connect_channel(1, 1).await.is_ok());

        let err = server.connect_channel(42, 1).await.unwrap_err();
        assert_eq!(err, AdmissionError::RoomNotFound(42));

        let err = server.connect_channel(1, 9).await.unwrap_err();
        assert_eq!(err, AdmissionError::NotAMember { room: 1, participant: 9 });
    }

    #[tokio::test]
    async fn test_join_message_leave_scenario() {
        let server = server_with_room(&[1, 2]).await;

        // Participant 1 joins an empty room: only they hear about it
        let (mut s1, mut rx1) = server.connect_channel(1, 1).await.unwrap();
        assert_eq!(server.active_participants(1).await, vec![1]);
        match rx1.recv().await.unwrap() {
            ServerEvent::PresenceJoined {
                participant_id,
                active_participants,
                ..
            } => {
                assert_eq!(participant_id, 1);
                assert_eq!(active_participants, vec![1]);
            }
            other => panic!("expected presence:joined, got {:?}", other),
        }

        // Participant 2 joins: both hear it, snapshot lists both
        let (mut s2, mut rx2) = server.connect_channel(1, 2).await.unwrap();
        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                ServerEvent::PresenceJoined {
                    participant_id,
                    active_participants,
                    ..
                } => {
                    assert_eq!(participant_id, 2);
                    assert_eq!(active_participants, vec![1, 2]);
                }
                other => panic!("expected presence:joined, got {:?}", other),
            }
        }

        // Participant 1 sends "hi": both receive sequence 1
        s1.handle_frame(frame("hi")).await.unwrap();
        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                ServerEvent::Message {
                    sequence,
                    sender_id,
                    content,
                    ..
                } => {
                    assert_eq!(sequence, 1);
                    assert_eq!(sender_id, 1);
                    assert_eq!(content, "hi");
                }
                other => panic!("expected message, got {:?}", other),
            }
        }

        // Participant 1 disconnects: 2 hears the departure
        s1.close().await;
        assert_eq!(s1.phase(), SessionPhase::Closed);
        match rx2.recv().await.unwrap() {
            ServerEvent::PresenceLeft {
                participant_id,
                active_participants,
                ..
            } => {
                assert_eq!(participant_id, 1);
                assert_eq!(active_participants, vec![2]);
            }
            other => panic!("expected presence:left, got {:?}", other),
        }

        // Last participant leaves an emptying room: nothing is announced
        s2.close().await;
        assert!(server.active_participants(1).await.is_empty());
        assert!(rx2.try_recv().is_err());

        let stats = server.stats();
        assert_eq!(stats.sessions_admitted, 2);
        assert_eq!(stats.sessions_closed, 2);
        assert_eq!(stats.messages_ingested, 1);
    }

    #[tokio::test]
    async fn test_duplicate_connect_last_wins() {
        let server = server_with_room(&[1, 2]).await;

        let (mut stale, _rx_stale) = server.connect_channel(1, 1).await.unwrap();
        let (mut fresh, _rx_fresh) = server.connect_channel(1, 1).await.unwrap();

        // The pair is reported exactly once
        assert_eq!(server.active_participants(1).await, vec![1]);

        // Teardown of the displaced session must not clobber the newer one
        stale.close().await;
        assert_eq!(stale.phase(), SessionPhase::Closed);
        assert_eq!(server.active_participants(1).await, vec![1]);

        fresh.close().await;
        assert!(server.active_participants(1).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_frame_only_reaches_sender() {
        let server = server_with_room(&[1, 2]).await;

        let (mut s1, mut rx1) = server.connect_channel(1, 1).await.unwrap();
        let (_s2, mut rx2) = server.connect_channel(1, 2).await.unwrap();

        // Drain presence events
        rx1.recv().await.unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();

        s1.handle_frame(Bytes::from_static(b"not json")).await.unwrap();

        // Sender stays admitted and gets a non-fatal error event
        assert_eq!(s1.phase(), SessionPhase::Admitted);
        match rx1.recv().await.unwrap() {
            ServerEvent::Error { message } => assert_eq!(message, "Invalid message format"),
            other => panic!("expected error event, got {:?}", other),
        }
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_whitespace_content_silently_ignored() {
        let server = server_with_room(&[1, 2]).await;

        let (mut s1, mut rx1) = server.connect_channel(1, 1).await.unwrap();
        rx1.recv().await.unwrap(); // own join

        s1.handle_frame(frame("  ")).await.unwrap();

        assert!(rx1.try_recv().is_err());
        assert!(server.recent_messages(1, None).await.is_empty());

        // Next accepted message still gets sequence 1
        s1.handle_frame(frame("hello")).await.unwrap();
        let messages = server.recent_messages(1, None).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sequence, 1);
        assert_eq!(messages[0].content, "hello");
    }

    #[tokio::test]
    async fn test_frames_rejected_after_close() {
        let server = server_with_room(&[1, 2]).await;
        let (mut s1, _rx1) = server.connect_channel(1, 1).await.unwrap();

        s1.close().await;
        s1.close().await; // idempotent

        let err = s1.handle_frame(frame("late")).await.unwrap_err();
        assert_eq!(err, crate::session::SessionError::NotAdmitted);
    }

    #[tokio::test]
    async fn test_dropped_receiver_evicts_session_on_broadcast() {
        let server = server_with_room(&[1, 2, 3]).await;

        let (mut s1, mut rx1) = server.connect_channel(1, 1).await.unwrap();
        let (_s2, rx2) = server.connect_channel(1, 2).await.unwrap();
        let (_s3, mut rx3) = server.connect_channel(1, 3).await.unwrap();

        // Participant 2's client dies without a clean close
        drop(rx2);

        // Drain join events for the survivors
        for _ in 0..3 {
            rx1.recv().await.unwrap();
        }
        rx3.recv().await.unwrap();

        s1.handle_frame(frame("anyone there?")).await.unwrap();

        // Both survivors got the message despite 2's dead transport
        for rx in [&mut rx1, &mut rx3] {
            match rx.recv().await.unwrap() {
                ServerEvent::Message { content, .. } => assert_eq!(content, "anyone there?"),
                other => panic!("expected message, got {:?}", other),
            }
            match rx.recv().await.unwrap() {
                ServerEvent::PresenceLeft {
                    participant_id,
                    active_participants,
                    ..
                } => {
                    assert_eq!(participant_id, 2);
                    assert_eq!(active_participants, vec![1, 3]);
                }
                other => panic!("expected presence:left, got {:?}", other),
            }
        }

        assert_eq!(server.active_participants(1).await, vec![1, 3]);
        assert_eq!(server.stats().delivery_failures, 1);
    }

    #[tokio::test]
    async fn test_recent_messages_tail_and_default_limit() {
        let server = ChatServer::with_config(ChatConfig::default().history_limit(2));
        server
            .create_room(1, RoomKind::Group, 1, [1, 2], None)
            .await
            .unwrap();
        let (mut s1, _rx1) = server.connect_channel(1, 1).await.unwrap();

        for text in ["one", "two", "three"] {
            s1.handle_frame(frame(text)).await.unwrap();
        }

        let messages = server.recent_messages(1, None).await;
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "three"]);

        let all = server.recent_messages(1, Some(10)).await;
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_room_queries() {
        let server = server_with_room(&[1, 2]).await;
        server
            .create_room(2, RoomKind::OneToOne, 1, [1, 3], Some("dm".into()))
            .await
            .unwrap();

        let room = server.room(2).await.unwrap();
        assert_eq!(room.kind, RoomKind::OneToOne);
        assert_eq!(room.name.as_deref(), Some("dm"));

        let rooms: Vec<RoomId> = server
            .rooms_of_member(1)
            .await
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(rooms, vec![1, 2]);

        assert!(server.add_member(1, 9).await);
        assert!(server.connect_channel(1, 9).await.is_ok());
        assert!(server.remove_member(1, 9).await);
    }

    #[tokio::test]
    async fn test_concurrent_senders_same_room_order_is_shared() {
        let server = Arc::new(server_with_room(&[1, 2, 3, 4]).await);

        let mut tasks = Vec::new();
        for participant in 1..=4u64 {
            let server = Arc::clone(&server);
            tasks.push(tokio::spawn(async move {
                let (mut session, mut rx) =
                    server.connect_channel(1, participant).await.unwrap();
                for i in 0..10 {
                    session
                        .handle_frame(frame(&format!("p{} m{}", participant, i)))
                        .await
                        .unwrap();
                }
                // Keep the receiver alive until every sender is done
                (session, rx.recv().await)
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let messages = server.recent_messages(1, Some(100)).await;
        assert_eq!(messages.len(), 40);
        let sequences: Vec<_> = messages.iter().map(|m| m.sequence).collect();
        let expected: Vec<u64> = (1..=40).collect();
        assert_eq!(sequences, expected);
    }
}
