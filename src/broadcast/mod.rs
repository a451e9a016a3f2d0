//! Fan-out of events to every session in a room
//!
//! The engine snapshots the registry's delivery targets, releases the lock,
//! then delivers to each recipient independently. A failed delivery never
//! aborts the fan-out and never reaches the sender: the failed recipient is
//! treated as disconnected and removed through the normal deregister path,
//! with a best-effort departure announcement when other participants remain.

pub mod engine;

pub use engine::Broadcaster;
