//! Authentication endpoints

use catalyst_api::{
    AuthResponse, CurrentUser, ForgotPasswordRequest, LoginRequest, LogoutReason,
    ResetPasswordRequest,
};
use catalyst_core::{lock_guard, SessionEvent, SessionGrant};
use catalyst_util::CatalystError;
use serde_json::json;
use tracing::{info, warn};

use crate::{ApiClient, ClientResult};

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session.
    ///
    /// A rejected exchange purges any persisted credential state.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<CurrentUser> {
        if let Some(user) = self.current_user() {
            return Err(CatalystError::SessionAlreadyActive(user.username).into());
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self
            .client
            .post::<_, AuthResponse>("auth/login", &request)
            .await
        {
            Ok(response) => {
                let user = response.user.clone();
                lock_guard(self.client.guard())?
                    .login(SessionGrant::from(response), catalyst_util::now())?;
                Ok(user)
            }
            Err(e) => {
                match lock_guard(self.client.guard()) {
                    Ok(mut guard) => {
                        if let Err(clear_err) = guard.login_failed(username) {
                            warn!(error = %clear_err, "Failed to purge credentials after rejected login");
                        }
                    }
                    Err(lock_err) => warn!(error = %lock_err, "Session guard unavailable"),
                }
                Err(e)
            }
        }
    }

    /// End the session locally, then tell the backend. The backend call is
    /// best-effort; its failure does not undo the local logout.
    pub async fn logout(&self) -> ClientResult<Option<SessionEvent>> {
        let event =
            lock_guard(self.client.guard())?.logout(LogoutReason::UserRequested, catalyst_util::now());

        if let Err(e) = self.client.post_discard("auth/logout", &json!({})).await {
            warn!(error = %e, "Logout API error");
        }

        Ok(event)
    }

    pub async fn send_password_reset_email(&self, email: &str) -> ClientResult<()> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.client
            .post_discard("auth/forgot-password", &request)
            .await?;
        info!(email = %email, "Password reset email requested");
        Ok(())
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ClientResult<()> {
        let request = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        self.client
            .post_discard("auth/reset-password", &request)
            .await
    }

    pub async fn is_valid_password_reset_token(&self, token: &str) -> ClientResult<bool> {
        self.client
            .get_with_query("auth/validate-reset-token", &[("token", token)])
            .await
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        lock_guard(self.client.guard())
            .ok()
            .and_then(|guard| guard.current_user().cloned())
    }

    pub fn username(&self) -> Option<String> {
        self.current_user().map(|u| u.username)
    }

    pub fn is_logged_in(&self) -> bool {
        lock_guard(self.client.guard())
            .map(|guard| guard.is_logged_in())
            .unwrap_or(false)
    }
}
