//! ML-assisted decision layer.
//!
//! [`MlAssist`] is owned by the host trading loop and passed by reference to
//! whoever needs it. Every call runs inside the caller's tick; nothing is
//! spawned in the background.

pub mod decision_policy;
pub mod prediction_cache;
pub mod prediction_client;
pub mod trade_telemetry;

pub use decision_policy::{DecisionPolicy, RiskAdjustment};
pub use prediction_cache::PredictionCache;
pub use prediction_client::PredictionClient;
pub use trade_telemetry::{TelemetryOutcome, TradeTelemetryReporter};

use crate::config::MlConfig;
use crate::domain::ml::feature_vector::FeatureVector;
use crate::domain::ml::prediction::{Prediction, SignalDirection};
use crate::domain::ml::telemetry::{TradeClose, TradeOpen};
use crate::domain::ports::HttpTransport;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub struct MlAssist {
    config: MlConfig,
    client: PredictionClient,
    policy: DecisionPolicy,
    telemetry: TradeTelemetryReporter,
}

impl MlAssist {
    pub fn new(config: MlConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let config = config.validated()?;
        info!(
            "MlAssist: {} {} {} -> {} (enabled={}, confidence=[{:.2}, {:.2}])",
            config.strategy_name,
            config.symbol,
            config.timeframe,
            config.service_url,
            config.enabled,
            config.min_confidence,
            config.max_confidence
        );

        Ok(Self {
            client: PredictionClient::new(transport.clone(), config.clone()),
            policy: DecisionPolicy::new(config.min_confidence, config.max_confidence),
            telemetry: TradeTelemetryReporter::new(transport, config.clone()),
            config,
        })
    }

    /// Validates and applies new settings. On error the old settings stay.
    pub fn reconfigure(&mut self, config: MlConfig) -> Result<()> {
        let config = config.validated()?;
        self.client.reconfigure(config.clone());
        self.telemetry.reconfigure(config.clone());
        self.policy = DecisionPolicy::new(config.min_confidence, config.max_confidence);
        info!("MlAssist: reconfigured (enabled={})", config.enabled);
        self.config = config;
        Ok(())
    }

    pub async fn get_prediction(
        &mut self,
        features: &FeatureVector,
        direction: SignalDirection,
    ) -> Prediction {
        self.client.get_prediction(features, direction).await
    }

    pub fn is_signal_valid(&self, prediction: &Prediction) -> bool {
        self.policy.is_signal_valid(prediction)
    }

    pub fn adjust_stop_loss(
        &self,
        base: f64,
        prediction: &Prediction,
        direction: SignalDirection,
    ) -> f64 {
        self.policy.adjust_stop_loss(base, prediction, direction)
    }

    pub fn adjust_position_size(&self, base: f64, prediction: &Prediction) -> f64 {
        self.policy.adjust_position_size(base, prediction)
    }

    pub fn evaluate(
        &self,
        base_stop_loss: f64,
        base_lot_size: f64,
        prediction: &Prediction,
        direction: SignalDirection,
    ) -> RiskAdjustment {
        self.policy
            .evaluate(base_stop_loss, base_lot_size, prediction, direction)
    }

    pub async fn log_open(
        &self,
        trade: &TradeOpen,
        prediction: &Prediction,
        features: &FeatureVector,
    ) -> TelemetryOutcome {
        self.telemetry.log_open(trade, prediction, features).await
    }

    pub async fn log_close(&self, trade: &TradeClose) -> TelemetryOutcome {
        self.telemetry.log_close(trade).await
    }

    pub async fn is_connected(&mut self) -> bool {
        self.client.is_connected().await
    }

    /// Newest first, at most the cache capacity.
    pub fn recent_predictions(&self) -> Vec<&Prediction> {
        self.client.cache().recent()
    }

    pub fn last_prediction(&self) -> Option<&Prediction> {
        self.client.cache().latest()
    }

    pub fn config(&self) -> &MlConfig {
        &self.config
    }
}
