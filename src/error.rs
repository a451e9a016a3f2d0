//! Crate-wide error type
//!
//! Each subsystem has its own narrow error enum; this aggregates them for
//! callers that funnel everything through one `Result` (like the doc
//! examples). Components keep returning their specific types so contracts
//! such as the admission outcome stay pattern-matchable.

use crate::history::IngestError;
use crate::room::RoomError;
use crate::session::{AdmissionError, SessionError};
use crate::transport::DeliveryError;

/// Any error this crate can produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Room creation failed.
    Room(RoomError),
    /// A pending session was refused admission.
    Admission(AdmissionError),
    /// Message ingestion failed.
    Ingest(IngestError),
    /// A session hit an unrecoverable error and was closed.
    Session(SessionError),
    /// Delivery to a transport failed.
    Delivery(DeliveryError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Room(e) => write!(f, "{}", e),
            Error::Admission(e) => write!(f, "{}", e),
            Error::Ingest(e) => write!(f, "{}", e),
            Error::Session(e) => write!(f, "{}", e),
            Error::Delivery(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Room(e) => Some(e),
            Error::Admission(e) => Some(e),
            Error::Ingest(e) => Some(e),
            Error::Session(e) => Some(e),
            Error::Delivery(e) => Some(e),
        }
    }
}

impl From<RoomError> for Error {
    fn from(e: RoomError) -> Self {
        Error::Room(e)
    }
}

impl From<AdmissionError> for Error {
    fn from(e: AdmissionError) -> Self {
        Error::Admission(e)
    }
}

impl From<IngestError> for Error {
    fn from(e: IngestError) -> Self {
        Error::Ingest(e)
    }
}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Self {
        Error::Session(e)
    }
}

impl From<DeliveryError> for Error {
    fn from(e: DeliveryError) -> Self {
        Error::Delivery(e)
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
