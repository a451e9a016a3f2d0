//! Inbound and outbound event types
//!
//! `ServerEvent` is everything the core can push to a connected participant.
//! `ClientFrame` is the only inbound shape the core understands; any richer
//! client protocol is decoded down to this by the collaborator.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::history::Message;
use crate::{ParticipantId, RoomId, SequenceNumber};

/// An event produced by the core for delivery to a participant's transport
///
/// Serializes as JSON with a `type` discriminator, e.g.
/// `{"type":"presence:joined","room_id":1,...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A chat message accepted into a room's log.
    #[serde(rename = "message")]
    Message {
        room_id: RoomId,
        sequence: SequenceNumber,
        sender_id: ParticipantId,
        content: String,
        #[serde(with = "time::serde::rfc3339")]
        created_at: OffsetDateTime,
    },

    /// A participant's session was admitted to the room.
    #[serde(rename = "presence:joined")]
    PresenceJoined {
        room_id: RoomId,
        participant_id: ParticipantId,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        /// Point-in-time snapshot of connected participants, joiner included.
        active_participants: Vec<ParticipantId>,
    },

    /// A participant's session left the room.
    #[serde(rename = "presence:left")]
    PresenceLeft {
        room_id: RoomId,
        participant_id: ParticipantId,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        /// Snapshot of connected participants after the departure.
        active_participants: Vec<ParticipantId>,
    },

    /// A non-fatal error reported back to the originating session only.
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerEvent {
    /// Build a `message` event from a stored message.
    pub fn message(message: &Message) -> Self {
        ServerEvent::Message {
            room_id: message.room_id,
            sequence: message.sequence,
            sender_id: message.sender_id,
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }

    /// Build a `presence:joined` event.
    pub fn presence_joined(
        room_id: RoomId,
        participant_id: ParticipantId,
        active_participants: Vec<ParticipantId>,
    ) -> Self {
        ServerEvent::PresenceJoined {
            room_id,
            participant_id,
            timestamp: OffsetDateTime::now_utc(),
            active_participants,
        }
    }

    /// Build a `presence:left` event.
    pub fn presence_left(
        room_id: RoomId,
        participant_id: ParticipantId,
        active_participants: Vec<ParticipantId>,
    ) -> Self {
        ServerEvent::PresenceLeft {
            room_id,
            participant_id,
            timestamp: OffsetDateTime::now_utc(),
            active_participants,
        }
    }

    /// Build a non-fatal `error` event.
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    /// The room this event belongs to, if any.
    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            ServerEvent::Message { room_id, .. }
            | ServerEvent::PresenceJoined { room_id, .. }
            | ServerEvent::PresenceLeft { room_id, .. } => Some(*room_id),
            ServerEvent::Error { .. } => None,
        }
    }
}

/// The decoded inbound unit: a structured record with a `content` text field
///
/// Unknown fields are ignored so collaborators can carry extra metadata
/// (client-side ids, message type discriminators) without breaking decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    pub content: String,
}

impl ClientFrame {
    /// Decode a raw payload as received from the wire.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tags() {
        let joined = ServerEvent::presence_joined(1, 2, vec![2]);
        let value = serde_json::to_value(&joined).unwrap();
        assert_eq!(value["type"], "presence:joined");
        assert_eq!(value["room_id"], 1);
        assert_eq!(value["active_participants"], serde_json::json!([2]));

        let left = ServerEvent::presence_left(1, 2, vec![]);
        let value = serde_json::to_value(&left).unwrap();
        assert_eq!(value["type"], "presence:left");

        let err = ServerEvent::error("invalid message format");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "invalid message format");
    }

    #[test]
    fn test_message_event_carries_timestamp() {
        let message = Message {
            room_id: 7,
            sequence: 1,
            sender_id: 3,
            content: "hello".into(),
            created_at: OffsetDateTime::now_utc(),
        };

        let event = ServerEvent::message(&message);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "message");
        assert_eq!(value["sequence"], 1);
        assert_eq!(value["sender_id"], 3);
        // RFC 3339 string, not a serde struct dump
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_client_frame_decode() {
        let frame = ClientFrame::decode(br#"{"content":"hi there"}"#).unwrap();
        assert_eq!(frame.content, "hi there");

        // Extra fields from richer clients are ignored
        let frame = ClientFrame::decode(br#"{"content":"x","kind":"text"}"#).unwrap();
        assert_eq!(frame.content, "x");

        assert!(ClientFrame::decode(b"not json").is_err());
        assert!(ClientFrame::decode(br#"{"body":"missing"}"#).is_err());
    }

    #[test]
    fn test_room_id_accessor() {
        assert_eq!(ServerEvent::presence_joined(4, 1, vec![1]).room_id(), Some(4));
        assert_eq!(ServerEvent::error("x").room_id(), None);
    }
}
