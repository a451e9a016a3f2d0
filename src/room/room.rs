//! Room record and kind

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{ParticipantId, RoomId};

/// Kind of conversation a room hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Exactly two members, fixed at creation.
    OneToOne,
    /// Two or more members.
    Group,
}

/// A conversation scope with a fixed membership set
#[derive(Debug, Clone)]
pub struct Room {
    /// Room identifier, chosen by the creating collaborator.
    pub id: RoomId,

    /// Optional display name.
    pub name: Option<String>,

    /// Room kind.
    pub kind: RoomKind,

    /// Participant that created the room.
    pub created_by: ParticipantId,

    /// Creation time.
    pub created_at: OffsetDateTime,

    pub(super) members: HashSet<ParticipantId>,
}

impl Room {
    pub(super) fn new(
        id: RoomId,
        kind: RoomKind,
        created_by: ParticipantId,
        members: HashSet<ParticipantId>,
        name: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            created_by,
            created_at: OffsetDateTime::now_utc(),
            members,
        }
    }

    /// Whether the participant belongs to this room.
    pub fn is_member(&self, participant: ParticipantId) -> bool {
        self.members.contains(&participant)
    }

    /// The membership set.
    pub fn members(&self) -> &HashSet<ParticipantId> {
        &self.members
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
