//! Connection registry: who is connected where
//!
//! The registry keeps two indices under one lock — room → participant →
//! session handle, and participant → set of rooms — so they can never drift
//! apart. Mutations are strictly ordered with respect to each other; reads
//! take a consistent point-in-time snapshot and never observe a mutation
//! mid-flight.
//!
//! ```text
//!                 Arc<ConnectionRegistry>
//!          ┌────────────────────────────────────┐
//!          │ by_room: room -> {participant ->   │
//!          │             SessionHandle}         │
//!          │ by_participant: participant ->     │
//!          │             {room, ...}            │
//!          └────────────────┬───────────────────┘
//!                           │ snapshot
//!                           ▼
//!                    delivery_targets() ──► broadcast (outside the lock)
//! ```
//!
//! Exactly one session may be registered per (room, participant) pair; a
//! second `register` for the same pair displaces the first (last-registered
//! wins). `deregister` only removes the entry when the session id matches,
//! which makes late teardown of a displaced session a harmless no-op.

pub mod handle;
pub mod store;

pub use handle::SessionHandle;
pub use store::ConnectionRegistry;
