//! Rooms and their membership
//!
//! A room is a named conversation scope with a membership set fixed at
//! creation (edit primitives exist but nothing in the admission path mutates
//! membership). The [`RoomDirectory`] is the authority consulted by session
//! admission; it never learns who is *connected* — that is the connection
//! registry's job.

pub mod directory;
pub mod error;
pub mod room;

pub use directory::RoomDirectory;
pub use error::RoomError;
pub use room::{Room, RoomKind};
