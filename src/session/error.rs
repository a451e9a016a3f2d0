//! Session error types

use crate::history::IngestError;
use crate::{ParticipantId, RoomId};

/// Why a pending session was refused admission
///
/// Terminal for the attempted session; the collaborator surfaces the reason
/// as a structured close and never retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The room does not exist.
    RoomNotFound(RoomId),
    /// The participant is not a member of the room.
    NotAMember {
        room: RoomId,
        participant: ParticipantId,
    },
}

impl AdmissionError {
    /// Stable reason token for the close surfaced to the client.
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::RoomNotFound(_) => "room-not-found",
            AdmissionError::NotAMember { .. } => "not-a-member",
        }
    }

    /// Suggested websocket close code (4xxx application range).
    pub fn close_code(&self) -> u16 {
        match self {
            AdmissionError::RoomNotFound(_) => 4004,
            AdmissionError::NotAMember { .. } => 4003,
        }
    }
}

impl std::fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdmissionError::RoomNotFound(room) => write!(f, "Room not found: {}", room),
            AdmissionError::NotAMember { room, participant } => {
                write!(f, "Participant {} is not a member of room {}", participant, room)
            }
        }
    }
}

impl std::error::Error for AdmissionError {}

/// Unrecoverable error while handling an inbound frame
///
/// Malformed payloads and empty content are *not* errors at this level; they
/// are handled in-session (error event back to the sender, or silently
/// ignored). An `Err` from the frame handler means the session is closed and
/// the collaborator should drop the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Frame received outside the `Admitted` phase.
    NotAdmitted,
    /// Ingestion failed for a reason other than empty content.
    Ingest(IngestError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotAdmitted => write!(f, "Session is not admitted"),
            SessionError::Ingest(e) => write!(f, "Message ingestion failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Ingest(e) => Some(e),
            _ => None,
        }
    }
}
