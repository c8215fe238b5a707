//! SQLite-based store implementation

use catalyst_util::SessionId;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{AuditEvent, Store, StoreError, StoreResult, StoredCredentials};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Persisted credential state (single row)
            CREATE TABLE IF NOT EXISTS credentials (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                session_id TEXT NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                user_json TEXT NOT NULL,
                issued_at TEXT NOT NULL,
                absolute_expiry TEXT NOT NULL,
                last_activity_at TEXT NOT NULL
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Local>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| StoreError::Serialization(format!("bad timestamp '{}': {}", s, e)))
}

impl Store for SqliteStore {
    fn load_credentials(&self) -> StoreResult<Option<StoredCredentials>> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT session_id, access_token, refresh_token, user_json,
                       issued_at, absolute_expiry, last_activity_at
                FROM credentials WHERE id = 1
                "#,
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((session_id, access_token, refresh_token, user_json, issued, expiry, activity)) =
            row
        else {
            return Ok(None);
        };

        let session_id = session_id
            .parse()
            .map(SessionId::from_uuid)
            .map_err(|e| StoreError::Serialization(format!("bad session id: {}", e)))?;

        Ok(Some(StoredCredentials {
            session_id,
            access_token,
            refresh_token,
            user: serde_json::from_str(&user_json)?,
            issued_at: parse_timestamp(&issued)?,
            absolute_expiry: parse_timestamp(&expiry)?,
            last_activity_at: parse_timestamp(&activity)?,
        }))
    }

    fn save_credentials(&self, credentials: &StoredCredentials) -> StoreResult<()> {
        let conn = self.conn()?;
        let user_json = serde_json::to_string(&credentials.user)?;

        conn.execute(
            r#"
            INSERT INTO credentials (id, session_id, access_token, refresh_token, user_json,
                                     issued_at, absolute_expiry, last_activity_at)
            VALUES (1, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET session_id = excluded.session_id,
                          access_token = excluded.access_token,
                          refresh_token = excluded.refresh_token,
                          user_json = excluded.user_json,
                          issued_at = excluded.issued_at,
                          absolute_expiry = excluded.absolute_expiry,
                          last_activity_at = excluded.last_activity_at
            "#,
            params![
                credentials.session_id.to_string(),
                credentials.access_token,
                credentials.refresh_token,
                user_json,
                credentials.issued_at.to_rfc3339(),
                credentials.absolute_expiry.to_rfc3339(),
                credentials.last_activity_at.to_rfc3339(),
            ],
        )?;

        debug!(session_id = %credentials.session_id, "Credentials saved");
        Ok(())
    }

    fn touch_activity(&self, at: DateTime<Local>) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE credentials SET last_activity_at = ? WHERE id = 1",
            [at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear_credentials(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM credentials", [])?;
        debug!(removed, "Credentials cleared");
        Ok(())
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = parse_timestamp(&timestamp_str)?;
            let event: crate::AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditEventType;
    use catalyst_api::{CurrentUser, LogoutReason};
    use chrono::TimeZone;

    fn sample_credentials() -> StoredCredentials {
        let issued_at = Local.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
        StoredCredentials {
            session_id: SessionId::new(),
            access_token: "token-abc".into(),
            refresh_token: Some("refresh-xyz".into()),
            user: CurrentUser {
                id: 7,
                username: "agent".into(),
                email: Some("agent@example.com".into()),
                role: "SUPPORT".into(),
            },
            issued_at,
            absolute_expiry: issued_at + chrono::Duration::minutes(60),
            last_activity_at: issued_at,
        }
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_credentials_lifecycle() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load_credentials().unwrap().is_none());

        let credentials = sample_credentials();
        store.save_credentials(&credentials).unwrap();
        assert_eq!(store.load_credentials().unwrap(), Some(credentials.clone()));

        let later = credentials.issued_at + chrono::Duration::minutes(5);
        store.touch_activity(later).unwrap();
        let loaded = store.load_credentials().unwrap().unwrap();
        assert_eq!(loaded.last_activity_at, later);
        assert_eq!(loaded.absolute_expiry, credentials.absolute_expiry);

        store.clear_credentials().unwrap();
        assert!(store.load_credentials().unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_previous_credentials() {
        let store = SqliteStore::in_memory().unwrap();
        store.save_credentials(&sample_credentials()).unwrap();

        let mut second = sample_credentials();
        second.access_token = "token-2".into();
        second.refresh_token = None;
        store.save_credentials(&second).unwrap();

        let loaded = store.load_credentials().unwrap().unwrap();
        assert_eq!(loaded.access_token, "token-2");
        assert!(loaded.refresh_token.is_none());
    }

    #[test]
    fn test_touch_without_credentials_is_noop() {
        let store = SqliteStore::in_memory().unwrap();
        store.touch_activity(catalyst_util::now()).unwrap();
        assert!(store.load_credentials().unwrap().is_none());
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .append_audit(AuditEvent::new(AuditEventType::LoginFailed {
                username: "agent".into(),
            }))
            .unwrap();
        store
            .append_audit(AuditEvent::new(AuditEventType::LoggedOut {
                session_id: SessionId::new(),
                username: "agent".into(),
                reason: LogoutReason::Inactivity,
            }))
            .unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].event,
            AuditEventType::LoggedOut {
                reason: LogoutReason::Inactivity,
                ..
            }
        ));
        assert!(matches!(events[1].event, AuditEventType::LoginFailed { .. }));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalyst.db");

        let credentials = sample_credentials();
        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_credentials(&credentials).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.load_credentials().unwrap(), Some(credentials));
    }
}
