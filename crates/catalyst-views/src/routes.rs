//! Console routes and the authentication guard

use catalyst_api::LoginRedirect;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    ResetPassword { token: Option<String> },
    Dashboard,
    Users,
    UserDetail { username: String },
    Customers,
    CustomerDetail { id: String },
    Tickets,
    TicketCreate,
    NotFound,
}

impl Route {
    /// Resolve a path such as `/users/jdoe` or `reset-password?token=abc`.
    /// The empty path resolves to the dashboard.
    pub fn parse(path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["dashboard"] => Route::Dashboard,
            ["login"] => Route::Login,
            ["reset-password"] => Route::ResetPassword {
                token: query.and_then(|q| query_param(q, "token")),
            },
            ["users"] => Route::Users,
            ["users", username] => Route::UserDetail {
                username: username.to_string(),
            },
            ["customers"] => Route::Customers,
            ["customers", id] => Route::CustomerDetail { id: id.to_string() },
            ["tickets"] => Route::Tickets,
            ["tickets", "create"] => Route::TicketCreate,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::ResetPassword { token: Some(token) } => {
                format!("/reset-password?token={}", token)
            }
            Route::ResetPassword { token: None } => "/reset-password".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Users => "/users".to_string(),
            Route::UserDetail { username } => format!("/users/{}", username),
            Route::Customers => "/customers".to_string(),
            Route::CustomerDetail { id } => format!("/customers/{}", id),
            Route::Tickets => "/tickets".to_string(),
            Route::TicketCreate => "/tickets/create".to_string(),
            Route::NotFound => "/not-found".to_string(),
        }
    }

    /// Page title; user detail pages are titled by the user shown
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Route::Login => Some("Login"),
            Route::ResetPassword { .. } => Some("Reset Password"),
            Route::Dashboard => Some("Dashboard"),
            Route::Users => Some("Users"),
            Route::UserDetail { .. } => None,
            Route::Customers => Some("Customers"),
            Route::CustomerDetail { .. } => Some("Customer Details"),
            Route::Tickets => Some("Tickets"),
            Route::TicketCreate => Some("Create Ticket"),
            Route::NotFound => Some("Page Not Found"),
        }
    }

    /// Whether the route requires a live session
    pub fn is_protected(&self) -> bool {
        !matches!(
            self,
            Route::Login | Route::ResetPassword { .. } | Route::NotFound
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of the authentication guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow(Route),
    Redirect(LoginRedirect),
}

/// Let `route` through, or send the user to the login page when it needs a
/// session they don't have
pub fn guard(route: Route, logged_in: bool) -> Navigation {
    if route.is_protected() && !logged_in {
        Navigation::Redirect(LoginRedirect { reason: None })
    } else {
        Navigation::Allow(route)
    }
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}
