//! Room membership store
//!
//! The directory answers "does this room exist" and "is this participant a
//! member" for the admission path, and exposes the read-side room queries.
//! Unknown rooms are not an error here: lookups return `false`/empty and the
//! caller decides whether that is worth rejecting.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::error::RoomError;
use super::room::{Room, RoomKind};
use crate::{ParticipantId, RoomId};

/// Directory of all rooms known to this process
///
/// Thread-safe via `RwLock`; the admission path is read-only and concurrent.
pub struct RoomDirectory {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl RoomDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Create a room with a fixed membership set.
    ///
    /// Enforces the kind invariants: `one_to_one` rooms hold exactly 2
    /// members, `group` rooms at least 2, and the creator must be a member.
    pub async fn create(
        &self,
        id: RoomId,
        kind: RoomKind,
        created_by: ParticipantId,
        members: impl IntoIterator<Item = ParticipantId>,
        name: Option<String>,
    ) -> Result<Room, RoomError> {
        let members: HashSet<ParticipantId> = members.into_iter().collect();

        match kind {
            RoomKind::OneToOne if members.len() != 2 => {
                return Err(RoomError::OneToOneMemberCount(members.len()));
            }
            RoomKind::Group if members.len() < 2 => {
                return Err(RoomError::GroupTooSmall(members.len()));
            }
            _ => {}
        }
        if !members.contains(&created_by) {
            return Err(RoomError::CreatorNotMember);
        }

        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&id) {
            return Err(RoomError::AlreadyExists(id));
        }

        let room = Room::new(id, kind, created_by, members, name);
        rooms.insert(id, room.clone());

        tracing::info!(
            room = id,
            kind = ?kind,
            members = room.member_count(),
            "Room created"
        );

        Ok(room)
    }

    /// Look up a room by id.
    pub async fn room(&self, id: RoomId) -> Option<Room> {
        self.rooms.read().await.get(&id).cloned()
    }

    /// Whether a room exists.
    pub async fn room_exists(&self, id: RoomId) -> bool {
        self.rooms.read().await.contains_key(&id)
    }

    /// Whether `participant` is a member of `room`. `false` for unknown rooms.
    pub async fn is_member(&self, room: RoomId, participant: ParticipantId) -> bool {
        self.rooms
            .read()
            .await
            .get(&room)
            .map(|r| r.is_member(participant))
            .unwrap_or(false)
    }

    /// Membership of `room`, sorted. Empty for unknown rooms.
    pub async fn members(&self, room: RoomId) -> Vec<ParticipantId> {
        let mut members: Vec<ParticipantId> = self
            .rooms
            .read()
            .await
            .get(&room)
            .map(|r| r.members().iter().copied().collect())
            .unwrap_or_default();
        members.sort_unstable();
        members
    }

    /// Every room whose membership contains `participant`.
    pub async fn rooms_of_member(&self, participant: ParticipantId) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .read()
            .await
            .values()
            .filter(|r| r.is_member(participant))
            .cloned()
            .collect();
        rooms.sort_unstable_by_key(|r| r.id);
        rooms
    }

    /// Add a member to an existing room. Returns `false` for unknown rooms.
    ///
    /// This is a bare primitive: it does not re-validate kind invariants and
    /// has no effect on already-connected sessions.
    pub async fn add_member(&self, room: RoomId, participant: ParticipantId) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(&room) {
            Some(r) => {
                r.members.insert(participant);
                true
            }
            None => false,
        }
    }

    /// Remove a member from an existing room. Returns `false` for unknown rooms.
    pub async fn remove_member(&self, room: RoomId, participant: ParticipantId) -> bool {
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(&room) {
            Some(r) => {
                r.members.remove(&participant);
                true
            }
            None => false,
        }
    }

    /// Number of rooms in the directory.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let directory = RoomDirectory::new();

        directory
            .create(1, RoomKind::Group, 10, [10, 11, 12], Some("general".into()))
            .await
            .unwrap();

        assert!(directory.room_exists(1).await);
        assert!(directory.is_member(1, 11).await);
        assert!(!directory.is_member(1, 99).await);
        assert_eq!(directory.members(1).await, vec![10, 11, 12]);

        let room = directory.room(1).await.unwrap();
        assert_eq!(room.name.as_deref(), Some("general"));
        assert_eq!(room.created_by, 10);
    }

    #[tokio::test]
    async fn test_unknown_room_is_empty_not_error() {
        let directory = RoomDirectory::new();

        assert!(!directory.room_exists(42).await);
        assert!(!directory.is_member(42, 1).await);
        assert!(directory.members(42).await.is_empty());
        assert!(directory.room(42).await.is_none());
    }

    #[tokio::test]
    async fn test_kind_invariants() {
        let directory = RoomDirectory::new();

        let result = directory.create(1, RoomKind::OneToOne, 1, [1, 2, 3], None).await;
        assert_eq!(result.unwrap_err(), RoomError::OneToOneMemberCount(3));

        let result = directory.create(1, RoomKind::Group, 1, [1], None).await;
        assert_eq!(result.unwrap_err(), RoomError::GroupTooSmall(1));

        let result = directory.create(1, RoomKind::Group, 9, [1, 2], None).await;
        assert_eq!(result.unwrap_err(), RoomError::CreatorNotMember);

        directory.create(1, RoomKind::OneToOne, 1, [1, 2], None).await.unwrap();
        let result = directory.create(1, RoomKind::OneToOne, 1, [1, 2], None).await;
        assert_eq!(result.unwrap_err(), RoomError::AlreadyExists(1));
    }

    #[tokio::test]
    async fn test_rooms_of_member() {
        let directory = RoomDirectory::new();
        directory.create(1, RoomKind::Group, 1, [1, 2], None).await.unwrap();
        directory.create(2, RoomKind::Group, 2, [2, 3], None).await.unwrap();
        directory.create(3, RoomKind::Group, 1, [1, 2, 3], None).await.unwrap();

        let rooms: Vec<RoomId> = directory
            .rooms_of_member(2)
            .await
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(rooms, vec![1, 2, 3]);

        let rooms = directory.rooms_of_member(3).await;
        assert_eq!(rooms.len(), 2);
    }

    #[tokio::test]
    async fn test_member_edit_primitives() {
        let directory = RoomDirectory::new();
        directory.create(1, RoomKind::Group, 1, [1, 2], None).await.unwrap();

        assert!(directory.add_member(1, 3).await);
        assert!(directory.is_member(1, 3).await);

        assert!(directory.remove_member(1, 3).await);
        assert!(!directory.is_member(1, 3).await);

        assert!(!directory.add_member(42, 1).await);
        assert!(!directory.remove_member(42, 1).await);
    }
}
