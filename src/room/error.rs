//! Room creation error types

use crate::RoomId;

/// Error creating a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// A room with this id already exists.
    AlreadyExists(RoomId),
    /// One-to-one rooms must have exactly 2 members.
    OneToOneMemberCount(usize),
    /// Group rooms must have at least 2 members.
    GroupTooSmall(usize),
    /// The creator must be part of the member set.
    CreatorNotMember,
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomError::AlreadyExists(id) => write!(f, "Room already exists: {}", id),
            RoomError::OneToOneMemberCount(n) => {
                write!(f, "One-to-one room must have exactly 2 members, got {}", n)
            }
            RoomError::GroupTooSmall(n) => {
                write!(f, "Group room must have at least 2 members, got {}", n)
            }
            RoomError::CreatorNotMember => write!(f, "Creator must be a member of the room"),
        }
    }
}

impl std::error::Error for RoomError {}
