//! Session lifecycle
//!
//! One [`Session`] per physical connection. Admission validates room and
//! membership, registers the connection and announces presence; while
//! admitted, inbound frames are ingested and broadcast; teardown deregisters
//! and announces departure when anyone is left to hear it. Teardown is
//! idempotent — a transport error racing an explicit close deregisters and
//! announces exactly once.

pub mod error;
pub mod session;
pub mod state;

pub use error::{AdmissionError, SessionError};
pub use session::Session;
pub(crate) use session::SessionDeps;
pub use state::{SessionPhase, SessionState};
