//! HTTP transport abstraction

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::ClientResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Toast shown when a mutating request succeeds
    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            Method::Get => None,
            Method::Post => Some("Created successfully"),
            Method::Put | Method::Patch => Some("Updated successfully"),
            Method::Delete => Some("Deleted successfully"),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request, after every interceptor has run
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Header lookup, case-insensitive on the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.header("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the backend.
///
/// Network failures are reported as errors; HTTP error statuses are
/// returned as ordinary responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_lookup() {
        let req = HttpRequest::new(Method::Get, "http://x/api/users")
            .with_header("authorization", "Bearer abc");
        assert_eq!(req.bearer_token(), Some("abc"));

        let bare = HttpRequest::new(Method::Get, "http://x/api/users");
        assert_eq!(bare.bearer_token(), None);
    }

    #[test]
    fn success_messages() {
        assert_eq!(Method::Get.success_message(), None);
        assert_eq!(Method::Post.success_message(), Some("Created successfully"));
        assert_eq!(Method::Patch.success_message(), Some("Updated successfully"));
        assert_eq!(Method::Delete.success_message(), Some("Deleted successfully"));
    }
}
