//! Session driver
//!
//! The admission, exchange and teardown logic for one connection. All shared
//! state lives in the registry and the message log; the session itself owns
//! nothing another session can see.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use super::error::{AdmissionError, SessionError};
use super::state::{SessionPhase, SessionState};
use crate::broadcast::Broadcaster;
use crate::history::{IngestError, MessageLog};
use crate::protocol::{ClientFrame, ServerEvent};
use crate::registry::{ConnectionRegistry, SessionHandle};
use crate::room::RoomDirectory;
use crate::stats::ServerStats;
use crate::transport::Transport;
use crate::{ParticipantId, RoomId, SessionId};

/// Shared components a session needs for its whole life
#[derive(Clone)]
pub(crate) struct SessionDeps {
    pub(crate) history: Arc<MessageLog>,
    pub(crate) registry: Arc<ConnectionRegistry>,
    pub(crate) broadcaster: Broadcaster,
    pub(crate) stats: Arc<ServerStats>,
}

/// One admitted connection, scoped to a single room and participant
///
/// Created by [`ChatServer::connect`](crate::server::ChatServer::connect).
/// The collaborator feeds inbound payloads to [`handle_frame`](Self::handle_frame)
/// and must call [`close`](Self::close) when the transport goes away.
pub struct Session {
    state: SessionState,
    handle: SessionHandle,
    deps: SessionDeps,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Validate and register a pending connection.
    ///
    /// On success the session is registered (displacing any earlier session
    /// for the same room/participant pair) and a `presence:joined` event is
    /// broadcast carrying the updated active-participant snapshot.
    /// Registration happens before the session is marked admitted, so its
    /// join event is ordered before anything it can send.
    pub(crate) async fn admit(
        session_id: SessionId,
        room_id: RoomId,
        participant_id: ParticipantId,
        transport: Arc<dyn Transport>,
        directory: &RoomDirectory,
        deps: SessionDeps,
    ) -> Result<Self, AdmissionError> {
        let mut state = SessionState::new(session_id, room_id, participant_id);

        match directory.room(room_id).await {
            None => {
                state.finish_close();
                return Err(AdmissionError::RoomNotFound(room_id));
            }
            Some(room) if !room.is_member(participant_id) => {
                state.finish_close();
                return Err(AdmissionError::NotAMember {
                    room: room_id,
                    participant: participant_id,
                });
            }
            Some(_) => {}
        }

        let handle = SessionHandle::new(session_id, room_id, participant_id, transport);
        let displaced = deps.registry.register(handle.clone()).await;
        if let Some(old) = displaced {
            tracing::debug!(
                room = room_id,
                participant = participant_id,
                stale_session = old.session_id,
                "Stale transport left for its owner to reap"
            );
        }

        state.admit();
        deps.stats.record_admission();

        let active = deps.registry.active_participants(room_id).await;
        deps.broadcaster
            .broadcast(
                room_id,
                ServerEvent::presence_joined(room_id, participant_id, active),
            )
            .await;

        tracing::info!(
            room = room_id,
            participant = participant_id,
            session = session_id,
            "Session admitted"
        );

        Ok(Self { state, handle, deps })
    }

    /// Process one raw inbound payload.
    ///
    /// Malformed payloads produce an `error` event back to this session only
    /// and `Ok(())`; whitespace-only content is silently ignored. Any other
    /// failure closes the session and is returned, telling the collaborator
    /// to drop the connection.
    pub async fn handle_frame(&mut self, raw: Bytes) -> Result<(), SessionError> {
        if !self.state.is_admitted() {
            return Err(SessionError::NotAdmitted);
        }

        let frame = match ClientFrame::decode(&raw) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(
                    session = self.state.session_id,
                    error = %e,
                    "Undecodable inbound payload"
                );
                self.send_self(ServerEvent::error("Invalid message format")).await;
                return Ok(());
            }
        };

        match self
            .deps
            .history
            .ingest(self.state.room_id, self.state.participant_id, &frame.content)
            .await
        {
            Ok(message) => {
                self.deps.stats.record_message();
                self.deps
                    .broadcaster
                    .broadcast(self.state.room_id, ServerEvent::message(&message))
                    .await;
                Ok(())
            }
            Err(IngestError::EmptyContent) => Ok(()),
            Err(e) => {
                tracing::error!(
                    room = self.state.room_id,
                    session = self.state.session_id,
                    error = %e,
                    "Unexpected ingestion failure, closing session"
                );
                self.close().await;
                Err(SessionError::Ingest(e))
            }
        }
    }

    /// Tear the session down.
    ///
    /// Idempotent: a transport error racing an explicit close deregisters
    /// and announces departure at most once (the registry's identity check
    /// is the guard). No departure is announced into an empty room.
    pub async fn close(&mut self) {
        if self.state.is_closing() {
            return;
        }
        self.state.start_close();

        let removed = self
            .deps
            .registry
            .deregister(
                self.state.room_id,
                self.state.participant_id,
                self.state.session_id,
            )
            .await;

        if removed {
            self.deps.stats.record_close();

            let remaining = self.deps.registry.active_participants(self.state.room_id).await;
            if !remaining.is_empty() {
                self.deps
                    .broadcaster
                    .broadcast(
                        self.state.room_id,
                        ServerEvent::presence_left(
                            self.state.room_id,
                            self.state.participant_id,
                            remaining,
                        ),
                    )
                    .await;
            }
        }

        self.state.finish_close();

        tracing::info!(
            room = self.state.room_id,
            participant = self.state.participant_id,
            session = self.state.session_id,
            duration_ms = self.state.duration().as_millis() as u64,
            "Session closed"
        );
    }

    /// Send an event to this session's own transport, best-effort.
    async fn send_self(&self, event: ServerEvent) {
        if let Err(e) = self.handle.deliver(event).await {
            tracing::debug!(
                session = self.state.session_id,
                error = %e,
                "Could not send event back to session"
            );
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.state.session_id
    }

    /// Room this session is scoped to.
    pub fn room_id(&self) -> RoomId {
        self.state.room_id
    }

    /// Participant on the other end.
    pub fn participant_id(&self) -> ParticipantId {
        self.state.participant_id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }
}
