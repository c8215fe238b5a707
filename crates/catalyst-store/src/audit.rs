//! Audit event types

use catalyst_api::LogoutReason;
use catalyst_util::SessionId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Credential exchange succeeded
    LoggedIn {
        session_id: SessionId,
        username: String,
        expires_at: DateTime<Local>,
    },

    /// Credential exchange failed
    LoginFailed { username: String },

    /// Persisted session picked up by a new process
    SessionRestored {
        session_id: SessionId,
        username: String,
    },

    /// Persisted credentials could not be read back and were removed
    CredentialsDiscarded { error: String },

    /// Session ended
    LoggedOut {
        session_id: SessionId,
        username: String,
        reason: LogoutReason,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: catalyst_util::now(),
            event,
        }
    }
}
