use crate::config::MlConfig;
use crate::domain::ml::feature_vector::FeatureVector;
use crate::domain::ml::prediction::Prediction;
use crate::domain::ml::telemetry::{TradeClose, TradeCloseEvent, TradeOpen, TradeOpenEvent};
use crate::domain::ports::HttpTransport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ids the host uses before the broker has assigned a real ticket.
const PLACEHOLDER_TRADE_IDS: [&str; 2] = ["0", "null"];

/// What happened to a telemetry call. Never an error: the trade it describes
/// has already been placed or closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryOutcome {
    Skipped(String),
    Delivered,
    Failed(String),
}

impl TelemetryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, TelemetryOutcome::Delivered)
    }
}

/// True when `trade_id` cannot be used to correlate telemetry.
pub fn is_placeholder_trade_id(trade_id: &str) -> bool {
    let id = trade_id.trim();
    id.is_empty()
        || PLACEHOLDER_TRADE_IDS
            .iter()
            .any(|p| id.eq_ignore_ascii_case(p))
}

/// Sends trade lifecycle events to the telemetry collector for retraining.
///
/// One call, one POST, awaited in place so events leave in the order the host
/// produces them. Failures are logged and swallowed.
pub struct TradeTelemetryReporter {
    transport: Arc<dyn HttpTransport>,
    config: MlConfig,
}

impl TradeTelemetryReporter {
    pub fn new(transport: Arc<dyn HttpTransport>, config: MlConfig) -> Self {
        Self { transport, config }
    }

    pub fn reconfigure(&mut self, config: MlConfig) {
        self.config = config;
    }

    pub async fn log_open(
        &self,
        trade: &TradeOpen,
        prediction: &Prediction,
        features: &FeatureVector,
    ) -> TelemetryOutcome {
        self.log_open_at(trade, prediction, features, Utc::now())
            .await
    }

    pub async fn log_open_at(
        &self,
        trade: &TradeOpen,
        prediction: &Prediction,
        features: &FeatureVector,
        open_time: DateTime<Utc>,
    ) -> TelemetryOutcome {
        if !self.config.enabled {
            return TelemetryOutcome::Skipped("disabled".to_string());
        }
        if is_placeholder_trade_id(&trade.trade_id) {
            // Dropped, not retried: a placeholder would break the open/close join key.
            warn!(
                "TradeTelemetryReporter: refusing to log open without a durable trade id ('{}')",
                trade.trade_id
            );
            return TelemetryOutcome::Skipped(format!(
                "placeholder trade id '{}'",
                trade.trade_id
            ));
        }

        let event = TradeOpenEvent::new(
            &self.config.strategy_name,
            &self.config.symbol,
            &self.config.timeframe,
            trade,
            prediction,
            features,
            open_time,
        );

        let outcome = self.send(&self.config.trade_log_url(), &event).await;
        if outcome.is_delivered() {
            info!(
                "TradeTelemetryReporter: OPEN {} {} @ {} logged",
                trade.trade_id, trade.direction, trade.entry_price
            );
        }
        outcome
    }

    pub async fn log_close(&self, trade: &TradeClose) -> TelemetryOutcome {
        if !self.config.enabled {
            return TelemetryOutcome::Skipped("disabled".to_string());
        }

        let event = TradeCloseEvent::new(&self.config.strategy_name, &self.config.symbol, trade);
        let outcome = self.send(&self.config.trade_close_url(), &event).await;
        if outcome.is_delivered() {
            info!(
                "TradeTelemetryReporter: CLOSE {} pnl={:.2} ({:?}) logged",
                trade.trade_id, trade.profit_loss, event.exit_reason
            );
        }
        outcome
    }

    async fn send<T: Serialize>(&self, url: &str, event: &T) -> TelemetryOutcome {
        let body = match serde_json::to_value(event) {
            Ok(body) => body,
            Err(e) => {
                warn!("TradeTelemetryReporter: failed to serialise event: {}", e);
                return TelemetryOutcome::Failed(format!("serialise: {}", e));
            }
        };

        debug!("TradeTelemetryReporter: POST {}", url);
        match self
            .transport
            .post_json(url, &body, self.config.request_timeout())
            .await
        {
            Ok(resp) if resp.status == 200 || resp.status == 201 => TelemetryOutcome::Delivered,
            Ok(resp) => {
                warn!(
                    "TradeTelemetryReporter: collector answered HTTP {}: {}",
                    resp.status, resp.body
                );
                TelemetryOutcome::Failed(format!("HTTP {}", resp.status))
            }
            Err(e) => {
                warn!("TradeTelemetryReporter: delivery to {} failed: {}", url, e);
                TelemetryOutcome::Failed(e.to_string())
            }
        }
    }
}
