//! Per-room message history and sequencing
//!
//! Each room owns an append-only, ordered log of messages and a monotonic
//! sequence counter. Ingestion is the only mutation path: it trims content,
//! assigns the next sequence number and appends in one atomic step, so two
//! concurrent senders can never observe the same sequence number and the
//! per-room numbering is gapless from 1.

pub mod error;
pub mod log;
pub mod message;

pub use error::IngestError;
pub use log::MessageLog;
pub use message::Message;
