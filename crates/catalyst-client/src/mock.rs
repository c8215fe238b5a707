//! Mock transport for unit/integration testing

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::{ClientError, ClientResult, HttpRequest, HttpResponse, HttpTransport, Method};

#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    NetworkError(String),
}

/// Canned backend.
///
/// Replies are keyed by method and path relative to the API base. Queued
/// replies are consumed in order; the last one keeps answering. Unknown
/// routes answer 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<(Method, String), VecDeque<MockReply>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: MockReply) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.trim_start_matches('/').to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Answer `method path` with `status` and a JSON body
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(
            method,
            path,
            MockReply::Response(HttpResponse::new(status, body.to_string())),
        );
    }

    /// Answer `method path` with `status` and a raw body
    pub fn respond_text(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            MockReply::Response(HttpResponse::new(status, body)),
        );
    }

    /// Fail `method path` without a response
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, MockReply::NetworkError(message.to_string()));
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn reply_for(&self, request: &HttpRequest) -> Option<MockReply> {
        let mut replies = self.replies.lock().unwrap();
        let (_, queue) = replies.iter_mut().find(|((method, path), _)| {
            *method == request.method
                && (request.url == *path || request.url.ends_with(&format!("/{}", path)))
        })?;

        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let reply = self.reply_for(&request);
        self.requests.lock().unwrap().push(request);

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::NetworkError(message)) => Err(ClientError::Transport(message)),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}
