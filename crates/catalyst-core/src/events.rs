//! Events emitted by the session guard

use catalyst_api::{ActivityKind, LoginRedirect, LogoutReason};
use catalyst_util::SessionId;
use chrono::{DateTime, Local};

/// Session transitions observed by the rest of the console
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Credential exchange succeeded
    LoggedIn {
        session_id: SessionId,
        username: String,
        absolute_expiry: DateTime<Local>,
    },

    /// A persisted session was picked up again
    Restored {
        session_id: SessionId,
        username: String,
        absolute_expiry: DateTime<Local>,
        inactivity_deadline: DateTime<Local>,
    },

    /// Throttled activity moved the inactivity deadline
    ActivityRecorded {
        session_id: SessionId,
        kind: ActivityKind,
        inactivity_deadline: DateTime<Local>,
    },

    /// Session ended; the console should navigate to `redirect`
    LoggedOut {
        session_id: SessionId,
        username: String,
        reason: LogoutReason,
        redirect: LoginRedirect,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            SessionEvent::LoggedIn { session_id, .. }
            | SessionEvent::Restored { session_id, .. }
            | SessionEvent::ActivityRecorded { session_id, .. }
            | SessionEvent::LoggedOut { session_id, .. } => session_id,
        }
    }

    /// Logout reason, for `LoggedOut` events
    pub fn logout_reason(&self) -> Option<LogoutReason> {
        match self {
            SessionEvent::LoggedOut { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
