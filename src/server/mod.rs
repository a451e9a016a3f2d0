//! Chat server facade
//!
//! [`ChatServer`] constructs the directory, log, registry and broadcast
//! engine once and passes them to every session — explicit instances, no
//! process-wide globals, so tests can build as many isolated servers as they
//! like.

pub mod chat;
pub mod config;

pub use chat::ChatServer;
pub use config::ChatConfig;
