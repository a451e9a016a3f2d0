//! Ingestion error types

use crate::RoomId;

/// Error ingesting an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// Content was empty after trimming. Silently ignorable by callers: no
    /// sequence number is consumed and nothing is stored or broadcast.
    EmptyContent,
    /// No log exists for this room. Rooms must be created before ingestion.
    RoomNotFound(RoomId),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::EmptyContent => write!(f, "Message content is empty"),
            IngestError::RoomNotFound(id) => write!(f, "No message log for room: {}", id),
        }
    }
}

impl std::error::Error for IngestError {}
