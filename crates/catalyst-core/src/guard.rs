//! Session lifecycle state machine

use catalyst_api::{ActivityKind, AuthState, CurrentUser, LoginRedirect, LogoutReason};
use catalyst_config::SessionSettings;
use catalyst_store::{AuditEvent, AuditEventType, Store};
use catalyst_util::{CatalystError, Result, Throttle};
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{ActivityListeners, Session, SessionEvent, SessionGrant};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Guard shared between the event loop and the HTTP client.
/// Never hold the lock across an await point.
pub type SharedGuard = Arc<Mutex<SessionGuard>>;

/// Lock a shared guard
pub fn lock_guard(guard: &SharedGuard) -> Result<MutexGuard<'_, SessionGuard>> {
    guard
        .lock()
        .map_err(|_| CatalystError::internal("session guard lock poisoned"))
}

/// Which delayed callback fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Absolute,
    Inactivity,
}

impl TimerKind {
    pub fn logout_reason(&self) -> LogoutReason {
        match self {
            TimerKind::Absolute => LogoutReason::SessionExpired,
            TimerKind::Inactivity => LogoutReason::Inactivity,
        }
    }
}

/// The delayed callbacks a live session keeps outstanding.
/// A cancelled timer is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    pub absolute: Option<DateTime<Local>>,
    pub inactivity: Option<DateTime<Local>>,
}

impl Timers {
    pub fn outstanding(&self) -> usize {
        usize::from(self.absolute.is_some()) + usize::from(self.inactivity.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding() == 0
    }

    /// Earliest scheduled callback; the absolute timer wins a tie
    pub fn next(&self) -> Option<(TimerKind, DateTime<Local>)> {
        match (self.absolute, self.inactivity) {
            (Some(absolute), Some(inactivity)) if inactivity < absolute => {
                Some((TimerKind::Inactivity, inactivity))
            }
            (Some(absolute), _) => Some((TimerKind::Absolute, absolute)),
            (None, Some(inactivity)) => Some((TimerKind::Inactivity, inactivity)),
            (None, None) => None,
        }
    }

    fn due(&self, now: DateTime<Local>) -> Option<TimerKind> {
        if self.absolute.is_some_and(|at| now >= at) {
            Some(TimerKind::Absolute)
        } else if self.inactivity.is_some_and(|at| now >= at) {
            Some(TimerKind::Inactivity)
        } else {
            None
        }
    }
}

/// What `restore` found in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing persisted
    NoSession,
    /// A live session is already held by this guard
    AlreadyLoggedIn,
    /// Persisted session picked up; now LoggedIn
    Restored,
    /// Persisted session had ended while the console was closed; purged
    Purged(LogoutReason),
}

/// Session lifecycle guard.
///
/// The guard never reads the clock itself; callers pass `now` so that the
/// event loop, the HTTP client and tests all agree on time.
pub struct SessionGuard {
    settings: SessionSettings,
    store: Arc<dyn Store>,
    session: Option<Session>,
    timers: Timers,
    listeners: ActivityListeners,
    throttle: Throttle,
    redirect: Option<LoginRedirect>,
    state_tx: watch::Sender<AuthState>,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl SessionGuard {
    pub fn new(settings: SessionSettings, store: Arc<dyn Store>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::LoggedOut);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        debug!(
            duration_secs = settings.duration.as_secs(),
            inactivity_secs = settings.inactivity_timeout.as_secs(),
            "Session guard initialized"
        );

        Self {
            throttle: Throttle::new(settings.activity_throttle),
            settings,
            store,
            session: None,
            timers: Timers::default(),
            listeners: ActivityListeners::new(),
            redirect: None,
            state_tx,
            events_tx,
        }
    }

    pub fn into_shared(self) -> SharedGuard {
        Arc::new(Mutex::new(self))
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn state(&self) -> AuthState {
        if self.session.is_some() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    /// When the event loop must next call [`SessionGuard::tick`]
    pub fn next_deadline(&self) -> Option<DateTime<Local>> {
        self.timers.next().map(|(_, at)| at)
    }

    pub fn listeners(&self) -> &ActivityListeners {
        &self.listeners
    }

    /// Watch the LoggedIn/LoggedOut state
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    /// Receive every session event from now on
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Redirect produced by the most recent logout, if not yet consumed
    pub fn pending_redirect(&self) -> Option<LoginRedirect> {
        self.redirect
    }

    pub fn take_redirect(&mut self) -> Option<LoginRedirect> {
        self.redirect.take()
    }

    /// Pick up credentials persisted by an earlier run
    pub fn restore(&mut self, now: DateTime<Local>) -> RestoreOutcome {
        if self.session.is_some() {
            return RestoreOutcome::AlreadyLoggedIn;
        }

        let stored = match self.store.load_credentials() {
            Ok(Some(stored)) => stored,
            Ok(None) => return RestoreOutcome::NoSession,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted credentials");
                if let Err(clear_err) = self.store.clear_credentials() {
                    warn!(error = %clear_err, "Failed to purge unreadable credentials");
                }
                let _ = self
                    .store
                    .append_audit(AuditEvent::new(AuditEventType::CredentialsDiscarded {
                        error: e.to_string(),
                    }));
                return RestoreOutcome::NoSession;
            }
        };

        let session = Session::from_stored(stored, &self.settings);

        if let Some(reason) = ended_reason(&session, now) {
            if let Err(e) = self.store.clear_credentials() {
                warn!(error = %e, "Failed to purge ended session");
            }
            let _ = self.store.append_audit(AuditEvent::new(AuditEventType::LoggedOut {
                session_id: session.session_id.clone(),
                username: session.user.username.clone(),
                reason,
            }));

            info!(
                session_id = %session.session_id,
                username = %session.user.username,
                reason = %reason,
                "Persisted session ended while console was closed"
            );

            self.redirect = Some(LoginRedirect::new(reason));
            return RestoreOutcome::Purged(reason);
        }

        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::SessionRestored {
            session_id: session.session_id.clone(),
            username: session.user.username.clone(),
        }));

        info!(
            session_id = %session.session_id,
            username = %session.user.username,
            absolute_expiry = %session.absolute_expiry,
            "Session restored"
        );

        let event = SessionEvent::Restored {
            session_id: session.session_id.clone(),
            username: session.user.username.clone(),
            absolute_expiry: session.absolute_expiry,
            inactivity_deadline: session.inactivity_deadline(),
        };
        self.activate(session);
        self.emit(event);

        RestoreOutcome::Restored
    }

    /// LoggedOut -> LoggedIn after a successful credential exchange
    pub fn login(&mut self, grant: SessionGrant, now: DateTime<Local>) -> Result<SessionEvent> {
        if let Some(session) = &self.session {
            return Err(CatalystError::SessionAlreadyActive(
                session.user.username.clone(),
            ));
        }
        if grant.access_token.is_empty() {
            return Err(CatalystError::validation(
                "credential exchange returned an empty token",
            ));
        }

        let session = Session::new(grant, &self.settings, now);
        self.store
            .save_credentials(&session.to_stored())
            .map_err(|e| CatalystError::store(e.to_string()))?;

        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::LoggedIn {
            session_id: session.session_id.clone(),
            username: session.user.username.clone(),
            expires_at: session.absolute_expiry,
        }));

        info!(
            session_id = %session.session_id,
            username = %session.user.username,
            absolute_expiry = %session.absolute_expiry,
            "Logged in"
        );

        let event = SessionEvent::LoggedIn {
            session_id: session.session_id.clone(),
            username: session.user.username.clone(),
            absolute_expiry: session.absolute_expiry,
        };
        self.activate(session);
        self.emit(event.clone());

        Ok(event)
    }

    /// Record that a credential exchange for `username` was rejected
    pub fn login_failed(&mut self, username: &str) -> Result<()> {
        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::LoginFailed {
            username: username.to_string(),
        }));
        warn!(username = %username, "Login failed");
        self.clear_credentials()
    }

    /// Purge persisted credential state. Only meaningful while LoggedOut;
    /// a live session is ended through [`SessionGuard::logout`].
    pub fn clear_credentials(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        self.store
            .clear_credentials()
            .map_err(|e| CatalystError::store(e.to_string()))
    }

    /// Handle one activity event. Throttled; ignored while LoggedOut.
    pub fn record_activity(
        &mut self,
        kind: ActivityKind,
        now: DateTime<Local>,
    ) -> Option<SessionEvent> {
        if !self.listeners.is_listening(kind) {
            return None;
        }

        // Activity cannot revive a session whose timer is already due
        if self.timers.due(now).is_some() {
            self.tick(now);
            return None;
        }

        if !self.throttle.check(now) {
            return None;
        }

        let session = self.session.as_mut()?;
        session.touch(now);
        let inactivity_deadline = session.inactivity_deadline();
        let session_id = session.session_id.clone();

        self.timers.inactivity = Some(inactivity_deadline);

        if let Err(e) = self.store.touch_activity(now) {
            warn!(error = %e, "Failed to persist activity time");
        }

        debug!(
            session_id = %session_id,
            kind = ?kind,
            inactivity_deadline = %inactivity_deadline,
            "Activity recorded"
        );

        let event = SessionEvent::ActivityRecorded {
            session_id,
            kind,
            inactivity_deadline,
        };
        self.emit(event.clone());
        Some(event)
    }

    /// Fire whichever timer is due at `now`
    pub fn tick(&mut self, now: DateTime<Local>) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if let Some(kind) = self.timers.due(now) {
            info!(timer = ?kind, "Session timer fired");
            events.extend(self.logout(kind.logout_reason(), now));
        }

        events
    }

    /// Credential for an outgoing request.
    ///
    /// Returns `None` when no session is held. A session that has ended is
    /// logged out here, before the request leaves, so the request goes out
    /// without a credential.
    pub fn authorize_request(&mut self, now: DateTime<Local>) -> Option<String> {
        let session = self.session.as_ref()?;

        if let Some(reason) = ended_reason(session, now) {
            warn!(
                session_id = %session.session_id,
                reason = %reason,
                "Session ended before request dispatch"
            );
            self.logout(reason, now);
            return None;
        }

        Some(session.access_token.clone())
    }

    /// LoggedIn -> LoggedOut. Every way a session ends goes through here.
    /// Calling it while LoggedOut changes nothing and returns `None`.
    pub fn logout(&mut self, reason: LogoutReason, now: DateTime<Local>) -> Option<SessionEvent> {
        self.timers = Timers::default();
        self.listeners.deregister_all();
        self.throttle.reset();

        let session = self.session.take()?;

        if let Err(e) = self.store.clear_credentials() {
            warn!(error = %e, "Failed to remove persisted credentials");
        }

        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::LoggedOut {
            session_id: session.session_id.clone(),
            username: session.user.username.clone(),
            reason,
        }));

        let redirect = LoginRedirect::new(reason);
        self.redirect = Some(redirect);
        self.state_tx.send_replace(AuthState::LoggedOut);

        info!(
            session_id = %session.session_id,
            username = %session.user.username,
            reason = %reason,
            duration_secs = (now - session.issued_at).num_seconds(),
            redirect = %redirect,
            "Logged out"
        );

        let event = SessionEvent::LoggedOut {
            session_id: session.session_id,
            username: session.user.username,
            reason,
            redirect,
        };
        self.emit(event.clone());
        Some(event)
    }

    fn activate(&mut self, session: Session) {
        self.timers = Timers {
            absolute: Some(session.absolute_expiry),
            inactivity: Some(session.inactivity_deadline()),
        };
        self.listeners.register_all();
        self.throttle.reset();
        self.redirect = None;
        self.session = Some(session);
        self.state_tx.send_replace(AuthState::LoggedIn);
    }

    fn emit(&self, event: SessionEvent) {
        // Err only means nobody is listening
        let _ = self.events_tx.send(event);
    }
}

/// Why `session` can no longer be used at `now`, if it can't
fn ended_reason(session: &Session, now: DateTime<Local>) -> Option<LogoutReason> {
    if !session.is_valid(now) {
        Some(LogoutReason::SessionExpired)
    } else if session.is_idle(now) {
        Some(LogoutReason::Inactivity)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_store::SqliteStore;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 6, 10, 0, 0).unwrap()
    }

    fn at(minutes: i64) -> DateTime<Local> {
        t0() + chrono::Duration::minutes(minutes)
    }

    fn grant() -> SessionGrant {
        SessionGrant {
            access_token: "token-1".into(),
            refresh_token: Some("refresh-1".into()),
            user: CurrentUser {
                id: 3,
                username: "dispatcher".into(),
                email: None,
                role: "SUPPORT".into(),
            },
        }
    }

    fn make_guard() -> (SessionGuard, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let guard = SessionGuard::new(SessionSettings::default(), store.clone());
        (guard, store)
    }

    #[test]
    fn test_login_schedules_both_timers() {
        let (mut guard, store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        assert_eq!(guard.state(), AuthState::LoggedIn);
        assert_eq!(
            guard.timers(),
            Timers {
                absolute: Some(at(60)),
                inactivity: Some(at(15)),
            }
        );
        assert_eq!(guard.next_deadline(), Some(at(15)));
        assert_eq!(guard.listeners().active_count(), 4);

        let persisted = store.load_credentials().unwrap().unwrap();
        assert_eq!(persisted.access_token, "token-1");
        assert_eq!(persisted.absolute_expiry, at(60));
    }

    #[test]
    fn test_valid_before_absolute_expiry_and_not_after() {
        let (mut guard, _store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        // Keep the session active so only the absolute limit applies
        for minute in [10, 20, 30, 40, 50] {
            guard.record_activity(ActivityKind::PointerMove, at(minute));
        }

        assert_eq!(guard.authorize_request(at(59)), Some("token-1".into()));
        assert!(guard.tick(at(59)).is_empty());

        let events = guard.tick(at(61));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].logout_reason(), Some(LogoutReason::SessionExpired));
        assert!(!guard.is_logged_in());
    }

    #[test]
    fn test_inactivity_logs_out_before_absolute_expiry() {
        let (mut guard, store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        assert!(guard.tick(at(14)).is_empty());

        let events = guard.tick(at(15));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].logout_reason(), Some(LogoutReason::Inactivity));
        assert_eq!(guard.state(), AuthState::LoggedOut);
        assert!(store.load_credentials().unwrap().is_none());
        assert_eq!(
            guard.pending_redirect().map(|r| r.to_path()),
            Some("/login?reason=inactivity".to_string())
        );
    }

    #[test]
    fn test_activity_resets_inactivity_deadline() {
        let (mut guard, store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        let event = guard.record_activity(ActivityKind::KeyPress, at(14)).unwrap();
        assert!(matches!(
            event,
            SessionEvent::ActivityRecorded { inactivity_deadline, .. } if inactivity_deadline == at(29)
        ));
        assert_eq!(guard.timers().inactivity, Some(at(29)));
        assert_eq!(guard.timers().absolute, Some(at(60)));

        let persisted = store.load_credentials().unwrap().unwrap();
        assert_eq!(persisted.last_activity_at, at(14));

        assert!(guard.tick(at(20)).is_empty());
        assert_eq!(
            guard.tick(at(29))[0].logout_reason(),
            Some(LogoutReason::Inactivity)
        );
    }

    #[test]
    fn test_activity_is_throttled() {
        let (mut guard, _store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        let base = at(1);
        assert!(guard.record_activity(ActivityKind::PointerMove, base).is_some());
        assert!(guard
            .record_activity(
                ActivityKind::Scroll,
                base + chrono::Duration::milliseconds(400)
            )
            .is_none());
        assert!(guard
            .record_activity(ActivityKind::Touch, base + chrono::Duration::seconds(1))
            .is_some());
    }

    #[test]
    fn test_activity_ignored_when_logged_out() {
        let (mut guard, _store) = make_guard();
        assert!(guard.record_activity(ActivityKind::KeyPress, t0()).is_none());
        assert!(guard.timers().is_empty());
    }

    #[test]
    fn test_activity_cannot_revive_idle_session() {
        let (mut guard, _store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        assert!(guard.record_activity(ActivityKind::KeyPress, at(16)).is_none());
        assert!(!guard.is_logged_in());
        assert_eq!(
            guard.pending_redirect(),
            Some(LoginRedirect::new(LogoutReason::Inactivity))
        );
    }

    #[test]
    fn test_logout_cancels_timers_and_purges_credentials() {
        let (mut guard, store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        let event = guard.logout(LogoutReason::UserRequested, at(5)).unwrap();
        assert_eq!(event.logout_reason(), Some(LogoutReason::UserRequested));

        assert_eq!(guard.state(), AuthState::LoggedOut);
        assert!(guard.timers().is_empty());
        assert_eq!(guard.next_deadline(), None);
        assert!(store.load_credentials().unwrap().is_none());
        assert_eq!(guard.listeners().active_count(), 0);
        assert_eq!(
            guard.take_redirect().map(|r| r.to_path()),
            Some("/login?reason=logout".to_string())
        );
    }

    #[test]
    fn test_logout_is_idempotent() {
        let (mut guard, store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        assert!(guard.logout(LogoutReason::UserRequested, at(1)).is_some());
        assert!(guard.logout(LogoutReason::UserRequested, at(2)).is_none());
        assert!(guard.tick(at(90)).is_empty());

        // Listeners removed exactly once
        assert_eq!(guard.listeners().removed_total(), 4);

        let logouts = store
            .get_recent_audits(10)
            .unwrap()
            .into_iter()
            .filter(|e| matches!(e.event, AuditEventType::LoggedOut { .. }))
            .count();
        assert_eq!(logouts, 1);
    }

    #[test]
    fn test_request_after_expiry_forces_logout() {
        let (mut guard, store) = make_guard();
        guard.login(grant(), t0()).unwrap();
        for minute in [10, 20, 30, 40, 50] {
            guard.record_activity(ActivityKind::KeyPress, at(minute));
        }

        assert_eq!(guard.authorize_request(at(60)), None);
        assert_eq!(guard.state(), AuthState::LoggedOut);
        assert!(store.load_credentials().unwrap().is_none());
        assert_eq!(
            guard.pending_redirect(),
            Some(LoginRedirect::new(LogoutReason::SessionExpired))
        );
    }

    #[test]
    fn test_request_while_idle_forces_logout() {
        let (mut guard, _store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        assert_eq!(guard.authorize_request(at(20)), None);
        assert_eq!(
            guard.pending_redirect(),
            Some(LoginRedirect::new(LogoutReason::Inactivity))
        );
    }

    #[test]
    fn test_second_login_rejected() {
        let (mut guard, _store) = make_guard();
        guard.login(grant(), t0()).unwrap();

        let err = guard.login(grant(), at(1)).unwrap_err();
        assert!(matches!(err, CatalystError::SessionAlreadyActive(name) if name == "dispatcher"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let (mut guard, store) = make_guard();
        let mut g = grant();
        g.access_token.clear();

        assert!(guard.login(g, t0()).is_err());
        assert!(!guard.is_logged_in());
        assert!(store.load_credentials().unwrap().is_none());
    }

    #[test]
    fn test_login_failed_clears_credentials() {
        let (mut guard, store) = make_guard();
        store
            .save_credentials(&Session::new(grant(), &SessionSettings::default(), t0()).to_stored())
            .unwrap();

        guard.login_failed("dispatcher").unwrap();
        assert!(store.load_credentials().unwrap().is_none());
        assert!(matches!(
            store.get_recent_audits(1).unwrap()[0].event,
            AuditEventType::LoginFailed { .. }
        ));
    }

    #[test]
    fn test_restore_live_session() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let mut first = SessionGuard::new(SessionSettings::default(), store.clone());
        first.login(grant(), t0()).unwrap();
        first.record_activity(ActivityKind::KeyPress, at(10));

        let mut second = SessionGuard::new(SessionSettings::default(), store.clone());
        assert_eq!(second.restore(at(20)), RestoreOutcome::Restored);
        assert!(second.is_logged_in());
        assert_eq!(second.timers().inactivity, Some(at(25)));
        assert_eq!(second.timers().absolute, Some(at(60)));
        assert_eq!(second.restore(at(21)), RestoreOutcome::AlreadyLoggedIn);
    }

    #[test]
    fn test_restore_purges_idle_session() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let mut first = SessionGuard::new(SessionSettings::default(), store.clone());
        first.login(grant(), t0()).unwrap();

        let mut second = SessionGuard::new(SessionSettings::default(), store.clone());
        assert_eq!(
            second.restore(at(16)),
            RestoreOutcome::Purged(LogoutReason::Inactivity)
        );
        assert!(!second.is_logged_in());
        assert!(store.load_credentials().unwrap().is_none());
        assert_eq!(
            second.take_redirect(),
            Some(LoginRedirect::new(LogoutReason::Inactivity))
        );
    }

    #[test]
    fn test_restore_purges_expired_session() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let mut first = SessionGuard::new(SessionSettings::default(), store.clone());
        first.login(grant(), t0()).unwrap();
        for minute in [10, 20, 30, 40, 50] {
            first.record_activity(ActivityKind::KeyPress, at(minute));
        }

        let mut second = SessionGuard::new(SessionSettings::default(), store.clone());
        assert_eq!(
            second.restore(at(61)),
            RestoreOutcome::Purged(LogoutReason::SessionExpired)
        );
    }

    #[test]
    fn test_restore_discards_unreadable_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("catalyst.db");
        let store = Arc::new(SqliteStore::open(&db).unwrap());
        let mut first = SessionGuard::new(SessionSettings::default(), store.clone());
        first.login(grant(), t0()).unwrap();

        rusqlite::Connection::open(&db)
            .unwrap()
            .execute("UPDATE credentials SET issued_at = 'garbage'", [])
            .unwrap();
        assert!(store.load_credentials().is_err());

        let mut second = SessionGuard::new(SessionSettings::default(), store.clone());
        assert_eq!(second.restore(at(120)), RestoreOutcome::NoSession);
        assert!(!second.is_logged_in());
        assert!(store.load_credentials().unwrap().is_none());

        let audits = store.get_recent_audits(1).unwrap();
        assert!(matches!(
            audits[0].event,
            AuditEventType::CredentialsDiscarded { .. }
        ));
    }

    #[test]
    fn test_restore_with_empty_store() {
        let (mut guard, _store) = make_guard();
        assert_eq!(guard.restore(t0()), RestoreOutcome::NoSession);
        assert_eq!(guard.take_redirect(), None);
    }

    #[test]
    fn test_timers_next_prefers_earliest() {
        let timers = Timers {
            absolute: Some(at(60)),
            inactivity: Some(at(15)),
        };
        assert_eq!(timers.next(), Some((TimerKind::Inactivity, at(15))));

        let tie = Timers {
            absolute: Some(at(60)),
            inactivity: Some(at(60)),
        };
        assert_eq!(tie.next(), Some((TimerKind::Absolute, at(60))));
        assert_eq!(tie.outstanding(), 2);
    }

    #[tokio::test]
    async fn test_observers_see_transitions() {
        let (mut guard, _store) = make_guard();
        let mut state = guard.subscribe();
        let mut events = guard.events();

        guard.login(grant(), t0()).unwrap();
        assert!(state.has_changed().unwrap());
        assert_eq!(*state.borrow_and_update(), AuthState::LoggedIn);
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn { .. }
        ));

        guard.logout(LogoutReason::UserRequested, at(1));
        assert_eq!(*state.borrow_and_update(), AuthState::LoggedOut);
        match events.recv().await.unwrap() {
            SessionEvent::LoggedOut {
                reason, redirect, ..
            } => {
                assert_eq!(reason, LogoutReason::UserRequested);
                assert_eq!(redirect.to_path(), "/login?reason=logout");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_shared_guard_lock() {
        let (guard, _store) = make_guard();
        let shared = guard.into_shared();
        assert!(!lock_guard(&shared).unwrap().is_logged_in());
    }
}
