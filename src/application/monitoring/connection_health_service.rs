use crate::domain::ports::HttpTransport;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reachability of a connection as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

/// Last probe result plus when it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub last_checked: Option<DateTime<Utc>>,
}

/// TTL-cached reachability check for the scoring service.
///
/// Within one TTL window every call returns the cached answer without touching
/// the network. Outside it, a single `GET /health` probe is issued. The check
/// time is recorded whatever the outcome, so an outage costs at most one probe
/// per window. No retries happen here.
pub struct ConnectionHealthMonitor {
    transport: Arc<dyn HttpTransport>,
    health_url: String,
    timeout: Duration,
    ttl: chrono::Duration,
    state: ConnectionState,
}

impl ConnectionHealthMonitor {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        health_url: impl Into<String>,
        timeout: Duration,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            transport,
            health_url: health_url.into(),
            timeout,
            ttl,
            state: ConnectionState {
                status: ConnectionStatus::Offline,
                last_checked: None,
            },
        }
    }

    pub async fn is_healthy(&mut self) -> bool {
        self.is_healthy_at(Utc::now()).await
    }

    /// Same as [`is_healthy`](Self::is_healthy) with an explicit clock reading.
    pub async fn is_healthy_at(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(last) = self.state.last_checked {
            if now - last < self.ttl {
                return self.state.status == ConnectionStatus::Online;
            }
        }

        let status = self.probe().await;
        if status != self.state.status {
            info!(
                "ConnectionHealthMonitor: scoring service is now {:?} ({})",
                status, self.health_url
            );
        }

        self.state = ConnectionState {
            status,
            last_checked: Some(now),
        };
        status == ConnectionStatus::Online
    }

    async fn probe(&self) -> ConnectionStatus {
        match self.transport.get(&self.health_url, self.timeout).await {
            Ok(resp) if resp.status == 200 && resp.body.contains("healthy") => {
                debug!("ConnectionHealthMonitor: probe OK");
                ConnectionStatus::Online
            }
            Ok(resp) => {
                warn!(
                    "ConnectionHealthMonitor: probe returned HTTP {} with body '{}'",
                    resp.status, resp.body
                );
                ConnectionStatus::Offline
            }
            Err(e) => {
                warn!("ConnectionHealthMonitor: probe failed: {}", e);
                ConnectionStatus::Offline
            }
        }
    }

    /// Forces the next check to probe.
    pub fn invalidate(&mut self) {
        self.state.last_checked = None;
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.state.last_checked
    }
}
