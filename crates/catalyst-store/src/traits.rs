//! Store trait definitions

use catalyst_api::CurrentUser;
use catalyst_util::SessionId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Credentials

    /// Load the persisted credential state, if any
    fn load_credentials(&self) -> StoreResult<Option<StoredCredentials>>;

    /// Replace the persisted credential state
    fn save_credentials(&self, credentials: &StoredCredentials) -> StoreResult<()>;

    /// Record a new last-activity time for the persisted session
    fn touch_activity(&self, at: DateTime<Local>) -> StoreResult<()>;

    /// Remove every trace of the persisted credential state
    fn clear_credentials(&self) -> StoreResult<()>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Credential state that survives process restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub session_id: SessionId,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: CurrentUser,
    pub issued_at: DateTime<Local>,
    pub absolute_expiry: DateTime<Local>,
    pub last_activity_at: DateTime<Local>,
}
