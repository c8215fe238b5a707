//! API client with the auth, loading and notification interceptors

use catalyst_config::ApiSettings;
use catalyst_core::{lock_guard, SharedGuard};
use catalyst_util::join_url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    ClientError, ClientResult, HttpRequest, HttpResponse, HttpTransport, LoadingTracker, Method,
    Notification, Notifier, ReqwestTransport, TracingNotifier, OPERATION_FAILED_MESSAGE,
};

/// Client for the console's REST backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    guard: SharedGuard,
    loading: LoadingTracker,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        guard: SharedGuard,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            guard,
            loading: LoadingTracker::new(),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Client talking to the configured backend over HTTP
    pub fn from_settings(settings: &ApiSettings, guard: SharedGuard) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(settings.request_timeout)?;
        Ok(Self::new(
            settings.base_url.clone(),
            Arc::new(transport),
            guard,
        ))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn guard(&self) -> &SharedGuard {
        &self.guard
    }

    pub fn loading(&self) -> &LoadingTracker {
        &self.loading
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::Get, path, &[], None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        self.request(Method::Get, path, query, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::Post, path, &[], Some(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::Put, path, &[], Some(body)).await
    }

    /// POST where only success matters; the reply body is not decoded
    pub async fn post_discard<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<()> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::Post, path, &[], Some(body))
            .await
            .map(|_| ())
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::Delete, path, &[], None).await
    }

    /// Send a request through the interceptor chain and decode the reply.
    /// An empty body decodes as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ClientResult<T> {
        let response = self.execute(method, path, query, body).await?;
        let text = response.body.trim();
        let text = if text.is_empty() { "null" } else { text };
        Ok(serde_json::from_str(text)?)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ClientResult<HttpResponse> {
        let mut request = HttpRequest::new(method, join_url(&self.base_url, path));
        for (key, value) in query {
            request = request.with_query(*key, *value);
        }
        if let Some(body) = body {
            request = request.with_json(body);
        }

        // Auth: expired sessions are ended here, before the request leaves
        let (token, logged_in) = {
            let mut guard = lock_guard(&self.guard)?;
            let token = guard.authorize_request(catalyst_util::now());
            (token, guard.is_logged_in())
        };
        if let Some(token) = token {
            request = request.with_header("Authorization", format!("Bearer {}", token));
        }

        // Loading
        let _loading = self.loading.start();

        // Notification
        let should_notify = method != Method::Get && logged_in;

        let url = request.url.clone();
        debug!(method = %method, url = %url, "Sending request");

        let result = match self.transport.send(request).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(status_error(&url, response)),
            Err(e) => Err(e),
        };

        match &result {
            Ok(response) => {
                debug!(method = %method, url = %url, status = response.status, "Request succeeded");
                if should_notify && let Some(message) = method.success_message() {
                    self.notifier.notify(Notification::success(message));
                }
            }
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, "Request failed");
                if should_notify {
                    self.notifier
                        .notify(Notification::error(OPERATION_FAILED_MESSAGE));
                }
            }
        }

        result
    }
}

/// Turn an error response into a `ClientError::Status`, preferring the
/// backend's own message
fn status_error(url: &str, response: HttpResponse) -> ClientError {
    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| {
            let body = response.body.trim();
            (!body.is_empty() && !body.starts_with('{')).then(|| body.to_string())
        })
        .unwrap_or_else(|| {
            format!("Http failure response for {}: {}", url, response.status)
        });

    ClientError::Status {
        status: response.status,
        message,
    }
}
