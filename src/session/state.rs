//! Session state machine
//!
//! Tracks one connection from acceptance to teardown.

use std::time::Instant;

use crate::{ParticipantId, RoomId, SessionId};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Transport accepted, admission not yet validated.
    Pending,
    /// Validated, registered, presence announced; may exchange messages.
    Admitted,
    /// Teardown initiated.
    Closing,
    /// Terminal: registry entry removed, departure possibly announced.
    Closed,
}

/// Lifecycle state for one session
#[derive(Debug)]
pub struct SessionState {
    /// Unique session id.
    pub session_id: SessionId,

    /// Room this session is scoped to.
    pub room_id: RoomId,

    /// Participant on the other end.
    pub participant_id: ParticipantId,

    /// Current phase.
    pub phase: SessionPhase,

    /// When the transport was accepted.
    pub connected_at: Instant,

    /// When admission completed.
    pub admitted_at: Option<Instant>,
}

impl SessionState {
    /// Create a new pending session state.
    pub fn new(session_id: SessionId, room_id: RoomId, participant_id: ParticipantId) -> Self {
        Self {
            session_id,
            room_id,
            participant_id,
            phase: SessionPhase::Pending,
            connected_at: Instant::now(),
            admitted_at: None,
        }
    }

    /// Complete admission.
    pub fn admit(&mut self) {
        if self.phase == SessionPhase::Pending {
            self.phase = SessionPhase::Admitted;
            self.admitted_at = Some(Instant::now());
        }
    }

    /// Begin teardown.
    pub fn start_close(&mut self) {
        if matches!(self.phase, SessionPhase::Pending | SessionPhase::Admitted) {
            self.phase = SessionPhase::Closing;
        }
    }

    /// Finish teardown.
    pub fn finish_close(&mut self) {
        self.phase = SessionPhase::Closed;
    }

    /// Check if the session may exchange messages.
    pub fn is_admitted(&self) -> bool {
        self.phase == SessionPhase::Admitted
    }

    /// Check if teardown has started or finished.
    pub fn is_closing(&self) -> bool {
        matches!(self.phase, SessionPhase::Closing | SessionPhase::Closed)
    }

    /// Session duration since the transport was accepted.
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}
