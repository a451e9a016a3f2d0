//! Registered session handle

use std::fmt;
use std::sync::Arc;

use crate::protocol::ServerEvent;
use crate::transport::{DeliveryError, Transport};
use crate::{ParticipantId, RoomId, SessionId};

/// What the registry knows about one live session
///
/// Cheap to clone; the transport is shared behind an `Arc`. The session id is
/// the identity used by `deregister` to tell a stale handle from the current
/// one.
#[derive(Clone)]
pub struct SessionHandle {
    /// Unique id of the underlying connection.
    pub session_id: SessionId,

    /// Room this session is scoped to.
    pub room_id: RoomId,

    /// Participant on the other end.
    pub participant_id: ParticipantId,

    transport: Arc<dyn Transport>,
}

impl SessionHandle {
    /// Create a handle for a freshly accepted connection.
    pub fn new(
        session_id: SessionId,
        room_id: RoomId,
        participant_id: ParticipantId,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            session_id,
            room_id,
            participant_id,
            transport,
        }
    }

    /// Deliver one event to this session's transport.
    pub async fn deliver(&self, event: ServerEvent) -> Result<(), DeliveryError> {
        self.transport.deliver(event).await
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("room_id", &self.room_id)
            .field("participant_id", &self.participant_id)
            .finish_non_exhaustive()
    }
}
