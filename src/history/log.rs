//! Message log implementation
//!
//! Two-level locking: an outer `RwLock` over the room map, an inner `Mutex`
//! per room log. Ingestion read-locks the map just long enough to clone the
//! room's `Arc`, then takes the per-room lock for the counter increment and
//! append together. Ingests into different rooms never contend.

use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};

use super::error::IngestError;
use super::message::Message;
use crate::{ParticipantId, RoomId, SequenceNumber};

/// Log state for a single room
struct RoomLog {
    next_sequence: SequenceNumber,
    messages: Vec<Message>,
}

impl RoomLog {
    fn new() -> Self {
        Self {
            next_sequence: 1,
            messages: Vec::new(),
        }
    }
}

/// Ordered, append-only message history for every room in the process
pub struct MessageLog {
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<RoomLog>>>>,
}

impl MessageLog {
    /// Create an empty log store.
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Initialize an empty log and sequence counter for a room.
    ///
    /// Idempotent: calling this again for a known room keeps the existing
    /// log and counter.
    pub async fn create_room(&self, room: RoomId) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(room).or_insert_with(|| Arc::new(Mutex::new(RoomLog::new())));
    }

    /// Validate, sequence and store one inbound message.
    ///
    /// Content is trimmed first; whitespace-only content is rejected with
    /// [`IngestError::EmptyContent`] and consumes no sequence number. The
    /// counter increment and the append happen under one lock, so sequence
    /// numbers are gapless per room regardless of concurrent senders.
    pub async fn ingest(
        &self,
        room: RoomId,
        sender: ParticipantId,
        raw_content: &str,
    ) -> Result<Message, IngestError> {
        let content = raw_content.trim();
        if content.is_empty() {
            return Err(IngestError::EmptyContent);
        }

        let log = {
            let rooms = self.rooms.read().await;
            rooms
                .get(&room)
                .cloned()
                .ok_or(IngestError::RoomNotFound(room))?
        };

        let mut log = log.lock().await;
        let message = Message {
            room_id: room,
            sequence: log.next_sequence,
            sender_id: sender,
            content: content.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        log.next_sequence += 1;
        log.messages.push(message.clone());

        tracing::debug!(
            room = room,
            sender = sender,
            sequence = message.sequence,
            "Message ingested"
        );

        Ok(message)
    }

    /// Up to `limit` most recent messages for a room, oldest first.
    ///
    /// Empty for unknown rooms.
    pub async fn recent(&self, room: RoomId, limit: usize) -> Vec<Message> {
        let log = {
            let rooms = self.rooms.read().await;
            match rooms.get(&room) {
                Some(log) => log.clone(),
                None => return Vec::new(),
            }
        };

        let log = log.lock().await;
        let start = log.messages.len().saturating_sub(limit);
        log.messages[start..].to_vec()
    }

    /// Total messages stored for a room.
    pub async fn message_count(&self, room: RoomId) -> usize {
        let log = {
            let rooms = self.rooms.read().await;
            match rooms.get(&room) {
                Some(log) => log.clone(),
                None => return 0,
            }
        };

        let count = log.lock().await.messages.len();
        count
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}
