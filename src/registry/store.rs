//! Connection registry implementation
//!
//! Both indices live in a single `Inner` behind one `RwLock`, so every
//! mutation updates them atomically with respect to each other and every
//! read sees a consistent pair. Nothing here performs delivery I/O; callers
//! take a snapshot and do their sending after the lock is released.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::handle::SessionHandle;
use crate::{ParticipantId, RoomId, SessionId};

#[derive(Default)]
struct Inner {
    /// room -> participant -> currently registered session.
    by_room: HashMap<RoomId, HashMap<ParticipantId, SessionHandle>>,

    /// participant -> rooms they currently have a session in.
    by_participant: HashMap<ParticipantId, HashSet<RoomId>>,
}

/// Bidirectional index of live sessions
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Insert or replace the session for `(room, participant)`.
    ///
    /// Returns the displaced handle when a session for the same pair was
    /// already registered (last-registered wins). The displaced transport is
    /// not closed here; the stale session finds out when its own teardown
    /// deregister no-ops.
    pub async fn register(&self, handle: SessionHandle) -> Option<SessionHandle> {
        let mut inner = self.inner.write().await;

        let displaced = inner
            .by_room
            .entry(handle.room_id)
            .or_default()
            .insert(handle.participant_id, handle.clone());

        inner
            .by_participant
            .entry(handle.participant_id)
            .or_default()
            .insert(handle.room_id);

        if let Some(ref old) = displaced {
            tracing::warn!(
                room = handle.room_id,
                participant = handle.participant_id,
                displaced_session = old.session_id,
                session = handle.session_id,
                "Duplicate connect displaced an existing session"
            );
        } else {
            tracing::info!(
                room = handle.room_id,
                participant = handle.participant_id,
                session = handle.session_id,
                "Session registered"
            );
        }

        displaced
    }

    /// Remove the entry for `(room, participant)` if — and only if — the
    /// registered session is `session_id`.
    ///
    /// Returns whether an entry was removed. A mismatched id means a newer
    /// session has taken the slot and the caller's entry is already gone;
    /// that is a no-op, not an error.
    pub async fn deregister(
        &self,
        room: RoomId,
        participant: ParticipantId,
        session_id: SessionId,
    ) -> bool {
        let mut inner = self.inner.write().await;

        let mut removed = false;
        if let Some(participants) = inner.by_room.get_mut(&room) {
            let current = participants.get(&participant).map(|h| h.session_id);
            if current == Some(session_id) {
                participants.remove(&participant);
                removed = true;
            }
            if participants.is_empty() {
                inner.by_room.remove(&room);
            }
        }

        if removed {
            if let Some(rooms) = inner.by_participant.get_mut(&participant) {
                rooms.remove(&room);
                if rooms.is_empty() {
                    inner.by_participant.remove(&participant);
                }
            }

            tracing::info!(
                room = room,
                participant = participant,
                session = session_id,
                "Session deregistered"
            );
        }

        removed
    }

    /// Snapshot of participants currently connected to `room`, sorted.
    pub async fn active_participants(&self, room: RoomId) -> Vec<ParticipantId> {
        let inner = self.inner.read().await;
        let mut participants: Vec<ParticipantId> = inner
            .by_room
            .get(&room)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        participants.sort_unstable();
        participants
    }

    /// Snapshot of rooms `participant` currently has a session in, sorted.
    pub async fn rooms_of(&self, participant: ParticipantId) -> Vec<RoomId> {
        let inner = self.inner.read().await;
        let mut rooms: Vec<RoomId> = inner
            .by_participant
            .get(&participant)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        rooms.sort_unstable();
        rooms
    }

    /// Snapshot of every session handle registered under `room`.
    ///
    /// Delivery happens on this snapshot after the lock is dropped; a session
    /// registered mid-broadcast is simply not targeted by that broadcast.
    pub async fn delivery_targets(&self, room: RoomId) -> Vec<SessionHandle> {
        let inner = self.inner.read().await;
        inner
            .by_room
            .get(&room)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// The handle registered for `(room, participant)`, if any.
    pub async fn target(
        &self,
        room: RoomId,
        participant: ParticipantId,
    ) -> Option<SessionHandle> {
        let inner = self.inner.read().await;
        inner
            .by_room
            .get(&room)
            .and_then(|m| m.get(&participant))
            .cloned()
    }

    /// Total number of registered sessions across all rooms.
    pub async fn session_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.by_room.values().map(|m| m.len()).sum()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
