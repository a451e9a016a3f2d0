//! Stored message type

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{ParticipantId, RoomId, SequenceNumber};

/// A message accepted into a room's log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Room the message belongs to.
    pub room_id: RoomId,

    /// Per-room ordinal: monotonic, gapless, starting at 1.
    pub sequence: SequenceNumber,

    /// Participant that sent the message.
    pub sender_id: ParticipantId,

    /// Message text, trimmed, never empty.
    pub content: String,

    /// Time the message was accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
