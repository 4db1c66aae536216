use crate::domain::errors::TransportError;
use crate::domain::ports::{HttpResponse, HttpTransport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

type Scripted = Result<HttpResponse, TransportError>;

#[derive(Default)]
struct MockState {
    routes: HashMap<String, Scripted>,
    requests: Vec<RecordedRequest>,
}

/// In-memory transport with per-URL scripted answers.
///
/// Every request is recorded. A URL with no script fails with a connect error,
/// which is what an unreachable host looks like to the caller.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answers every later request to `url` with `response`.
    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.lock().routes.insert(url.to_string(), Ok(response));
    }

    pub fn respond_json(&self, url: &str, status: u16, body: &serde_json::Value) {
        self.respond(url, HttpResponse::new(status, body.to_string()));
    }

    /// Fails every later request to `url` with `error`.
    pub fn fail(&self, url: &str, error: TransportError) {
        self.lock().routes.insert(url.to_string(), Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.lock().requests.iter().filter(|r| r.url == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock().requests.len()
    }

    fn handle(&self, request: RecordedRequest) -> Scripted {
        let mut state = self.lock();
        let answer = state.routes.get(&request.url).cloned().unwrap_or_else(|| {
            Err(TransportError::Connect {
                reason: format!("no route scripted for {}", request.url),
            })
        });
        debug!(
            "MockTransport: {:?} {} -> {:?}",
            request.method, request.url, answer
        );
        state.requests.push(request);
        answer
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.handle(RecordedRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            body: None,
            timeout,
        })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.handle(RecordedRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            body: Some(body.clone()),
            timeout,
        })
    }
}
