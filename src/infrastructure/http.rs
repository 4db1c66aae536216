use crate::domain::errors::TransportError;
use crate::domain::ports::{HttpResponse, HttpTransport};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Production transport over a pooled `reqwest::Client`.
///
/// No retry middleware: a failed call is reported once and the caller decides
/// whether to try again on a later tick.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .pool_max_idle_per_host(2)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn finish(
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let resp = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        debug!("ReqwestTransport: HTTP {} ({} bytes)", status, body.len());
        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else if err.is_connect() {
        TransportError::Connect {
            reason: err.to_string(),
        }
    } else {
        TransportError::Request {
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        Self::finish(self.client.get(url), timeout).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        Self::finish(self.client.post(url).json(body), timeout).await
    }
}
