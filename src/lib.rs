//! roomcast — the real-time fan-out core of a multi-room chat service.
//!
//! This crate tracks which participants are connected to which rooms, assigns
//! a total order to messages within each room, and disseminates messages and
//! presence events to every connected participant with per-recipient failure
//! isolation. Account handling, authentication and HTTP routing are the
//! embedding application's concern; this crate only needs an already-open
//! bidirectional transport per connection.
//!
//! # Architecture
//!
//! ```text
//!                         Arc<ChatServer>
//!          ┌───────────────────────────────────────────┐
//!          │ RoomDirectory   rooms + membership        │
//!          │ MessageLog      per-room ordered history  │
//!          │ ConnectionRegistry  room <-> participant  │
//!          │ Broadcaster     snapshot + fan-out        │
//!          └───────────────────┬───────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!          [Session]       [Session]       [Session]
//!          handle_frame()  handle_frame()  handle_frame()
//!              │               │               │
//!              └──► log.ingest() ──► broadcaster.broadcast() ──► transports
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use roomcast::room::RoomKind;
//! use roomcast::ChatServer;
//!
//! #[tokio::main]
//! async fn main() -> roomcast::Result<()> {
//!     let server = Arc::new(ChatServer::new());
//!
//!     // Rooms are created by the embedding application before admission.
//!     server.create_room(1, RoomKind::Group, 10, [10, 11, 12], None).await?;
//!
//!     // A collaborator hands us an admitted connection; events for this
//!     // participant arrive on `rx` for the collaborator to serialize.
//!     let (mut session, mut rx) = server.connect_channel(1, 10).await?;
//!
//!     tokio::spawn(async move {
//!         while let Some(event) = rx.recv().await {
//!             let _json = serde_json::to_string(&event).unwrap();
//!             // write to the websocket...
//!         }
//!     });
//!
//!     session.handle_frame(r#"{"content":"hello"}"#.into()).await?;
//!     session.close().await;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod error;
pub mod history;
pub mod protocol;
pub mod registry;
pub mod room;
pub mod server;
pub mod session;
pub mod stats;
pub mod transport;

pub use broadcast::Broadcaster;
pub use error::{Error, Result};
pub use history::{Message, MessageLog};
pub use protocol::{ClientFrame, ServerEvent};
pub use registry::ConnectionRegistry;
pub use room::{Room, RoomDirectory, RoomKind};
pub use server::{ChatConfig, ChatServer};
pub use session::{Session, SessionPhase};
pub use transport::{ChannelTransport, DeliveryError, Transport};

/// Identifier of a room.
pub type RoomId = u64;

/// Identifier of a participant (a user account, as far as this crate cares).
pub type ParticipantId = u64;

/// Identifier of a single live connection. Unique per process lifetime.
pub type SessionId = u64;

/// Per-room message ordinal. Starts at 1, gapless, strictly increasing.
pub type SequenceNumber = u64;
