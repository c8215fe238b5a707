//! Session record

use catalyst_api::{AuthResponse, CurrentUser};
use catalyst_config::SessionSettings;
use catalyst_store::StoredCredentials;
use catalyst_util::{saturating_until, to_chrono, SessionId};
use chrono::{DateTime, Local};
use std::time::Duration;

/// Result of a successful credential exchange
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: CurrentUser,
}

impl From<AuthResponse> for SessionGrant {
    fn from(response: AuthResponse) -> Self {
        Self {
            access_token: response.token,
            refresh_token: response.refresh_token,
            user: response.user,
        }
    }
}

/// Client-side record of an authenticated user's validity window
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: SessionId,
    pub user: CurrentUser,
    pub access_token: String,
    /// Stored for the backend's benefit; never exchanged by the console
    pub refresh_token: Option<String>,
    pub issued_at: DateTime<Local>,
    /// Always `issued_at + duration`
    pub absolute_expiry: DateTime<Local>,
    pub last_activity_at: DateTime<Local>,
    inactivity_timeout: Duration,
}

impl Session {
    /// Start a session at `now` from a fresh grant
    pub fn new(grant: SessionGrant, settings: &SessionSettings, now: DateTime<Local>) -> Self {
        Self {
            session_id: SessionId::new(),
            user: grant.user,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            issued_at: now,
            absolute_expiry: now + to_chrono(settings.duration),
            last_activity_at: now,
            inactivity_timeout: settings.inactivity_timeout,
        }
    }

    /// Rebuild a session persisted by an earlier run.
    ///
    /// The persisted expiry is kept as-is; changing the configured duration
    /// does not stretch or shorten a session that is already running.
    pub fn from_stored(stored: StoredCredentials, settings: &SessionSettings) -> Self {
        Self {
            session_id: stored.session_id,
            user: stored.user,
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            issued_at: stored.issued_at,
            absolute_expiry: stored.absolute_expiry,
            last_activity_at: stored.last_activity_at,
            inactivity_timeout: settings.inactivity_timeout,
        }
    }

    pub fn to_stored(&self) -> StoredCredentials {
        StoredCredentials {
            session_id: self.session_id.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            user: self.user.clone(),
            issued_at: self.issued_at,
            absolute_expiry: self.absolute_expiry,
            last_activity_at: self.last_activity_at,
        }
    }

    pub fn token_present(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Valid iff a token is held and the absolute expiry has not been reached
    pub fn is_valid(&self, now: DateTime<Local>) -> bool {
        self.token_present() && now < self.absolute_expiry
    }

    pub fn inactivity_deadline(&self) -> DateTime<Local> {
        self.last_activity_at + to_chrono(self.inactivity_timeout)
    }

    pub fn is_idle(&self, now: DateTime<Local>) -> bool {
        now >= self.inactivity_deadline()
    }

    /// Record user activity at `now`
    pub fn touch(&mut self, now: DateTime<Local>) {
        if now > self.last_activity_at {
            self.last_activity_at = now;
        }
    }

    /// Time until whichever deadline comes first
    pub fn time_remaining(&self, now: DateTime<Local>) -> Duration {
        let deadline = self.absolute_expiry.min(self.inactivity_deadline());
        saturating_until(deadline, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 6, 10, 0, 0).unwrap()
    }

    fn minutes(m: i64) -> chrono::Duration {
        chrono::Duration::minutes(m)
    }

    fn grant() -> SessionGrant {
        SessionGrant {
            access_token: "token".into(),
            refresh_token: None,
            user: CurrentUser {
                id: 1,
                username: "admin".into(),
                email: None,
                role: "ADMIN".into(),
            },
        }
    }

    #[test]
    fn test_validity_window() {
        let session = Session::new(grant(), &SessionSettings::default(), t0());

        assert_eq!(session.absolute_expiry, t0() + minutes(60));
        assert!(session.is_valid(t0() + minutes(59)));
        assert!(!session.is_valid(t0() + minutes(60)));
        assert!(!session.is_valid(t0() + minutes(61)));
    }

    #[test]
    fn test_missing_token_is_never_valid() {
        let mut g = grant();
        g.access_token.clear();
        let session = Session::new(g, &SessionSettings::default(), t0());

        assert!(!session.token_present());
        assert!(!session.is_valid(t0()));
    }

    #[test]
    fn test_touch_moves_inactivity_deadline() {
        let mut session = Session::new(grant(), &SessionSettings::default(), t0());
        assert_eq!(session.inactivity_deadline(), t0() + minutes(15));

        session.touch(t0() + minutes(14));
        assert_eq!(session.inactivity_deadline(), t0() + minutes(29));
        assert!(!session.is_idle(t0() + minutes(20)));
        assert!(session.is_idle(t0() + minutes(29)));
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let mut session = Session::new(grant(), &SessionSettings::default(), t0());
        session.touch(t0() + minutes(5));
        session.touch(t0() + minutes(2));
        assert_eq!(session.last_activity_at, t0() + minutes(5));
    }

    #[test]
    fn test_time_remaining_uses_earliest_deadline() {
        let mut session = Session::new(grant(), &SessionSettings::default(), t0());
        assert_eq!(
            session.time_remaining(t0()),
            Duration::from_secs(15 * 60)
        );

        session.touch(t0() + minutes(55));
        assert_eq!(
            session.time_remaining(t0() + minutes(55)),
            Duration::from_secs(5 * 60)
        );
        assert_eq!(session.time_remaining(t0() + minutes(90)), Duration::ZERO);
    }

    #[test]
    fn test_stored_round_trip_keeps_expiry() {
        let session = Session::new(grant(), &SessionSettings::default(), t0());
        let shorter = SessionSettings {
            duration: Duration::from_secs(60),
            ..SessionSettings::default()
        };

        let restored = Session::from_stored(session.to_stored(), &shorter);
        assert_eq!(restored, session);
    }
}
