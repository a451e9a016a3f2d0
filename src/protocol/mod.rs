//! Event shapes exchanged with the embedding application
//!
//! The wire itself (websocket framing, HTTP upgrade, ...) is owned by the
//! collaborator; this module only defines the decoded inbound frame and the
//! outbound events the core produces for the collaborator to serialize.
//!
//! Outbound events form a closed set tagged by a `type` field:
//! `message`, `presence:joined`, `presence:left` and `error`.

pub mod event;

pub use event::{ClientFrame, ServerEvent};
