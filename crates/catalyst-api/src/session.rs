//! Session vocabulary shared between the guard, the HTTP client and the views

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication state observed by the rest of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn,
}

/// Why a session ended. Serialized as the machine-readable code carried by
/// the login redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogoutReason {
    /// The user asked to log out
    #[serde(rename = "logout")]
    UserRequested,
    /// The absolute session lifetime ran out
    #[serde(rename = "session_expired")]
    SessionExpired,
    /// No user activity within the inactivity timeout
    #[serde(rename = "inactivity")]
    Inactivity,
}

impl LogoutReason {
    pub fn code(&self) -> &'static str {
        match self {
            LogoutReason::UserRequested => "logout",
            LogoutReason::SessionExpired => "session_expired",
            LogoutReason::Inactivity => "inactivity",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "logout" => Some(LogoutReason::UserRequested),
            "session_expired" => Some(LogoutReason::SessionExpired),
            "inactivity" => Some(LogoutReason::Inactivity),
            _ => None,
        }
    }

    /// Human-readable explanation shown on the login screen
    pub fn message(&self) -> &'static str {
        match self {
            LogoutReason::UserRequested => "You have been logged out.",
            LogoutReason::SessionExpired => "Your session has expired. Please log in again.",
            LogoutReason::Inactivity => "You were logged out due to inactivity.",
        }
    }
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// User input that counts as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerMove,
    KeyPress,
    Scroll,
    Touch,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 4] = [
        ActivityKind::PointerMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::Touch,
    ];
}

/// Path of the login entry point
pub const LOGIN_PATH: &str = "/login";

/// Navigation to the login entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRedirect {
    pub reason: Option<LogoutReason>,
}

impl LoginRedirect {
    pub fn new(reason: LogoutReason) -> Self {
        Self {
            reason: Some(reason),
        }
    }

    /// Redirect target, e.g. `/login?reason=inactivity`
    pub fn to_path(&self) -> String {
        match self.reason {
            Some(reason) => format!("{}?reason={}", LOGIN_PATH, reason.code()),
            None => LOGIN_PATH.to_string(),
        }
    }

    /// Parse a redirect target produced by [`LoginRedirect::to_path`]
    pub fn parse(path: &str) -> Option<Self> {
        let (route, query) = match path.split_once('?') {
            Some((route, query)) => (route, Some(query)),
            None => (path, None),
        };
        if route != LOGIN_PATH {
            return None;
        }

        let reason = query.and_then(|q| {
            q.split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "reason")
                .and_then(|(_, value)| LogoutReason::from_code(value))
        });

        Some(Self { reason })
    }
}

impl fmt::Display for LoginRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
