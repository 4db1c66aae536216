use crate::application::ml::prediction_cache::PredictionCache;
use crate::application::monitoring::ConnectionHealthMonitor;
use crate::config::MlConfig;
use crate::domain::errors::PredictionError;
use crate::domain::ml::feature_vector::FeatureVector;
use crate::domain::ml::prediction::{Prediction, SignalDirection};
use crate::domain::ports::HttpTransport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Body of `POST /predict`: identity fields and every feature at one level.
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub strategy: &'a str,
    pub symbol: &'a str,
    pub timeframe: &'a str,
    pub direction: SignalDirection,
    #[serde(flatten)]
    pub features: &'a FeatureVector,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    prediction: Option<PredictionPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PredictionPayload {
    direction: String,
    probability: f64,
    confidence: f64,
    model_type: String,
    model_key: String,
}

/// Asks the scoring service for a verdict on a candidate trade.
///
/// Never fails: every problem comes back as an invalid [`Prediction`] whose
/// `error` names the category, and the caller falls back to its rules.
pub struct PredictionClient {
    transport: Arc<dyn HttpTransport>,
    config: MlConfig,
    health: ConnectionHealthMonitor,
    cache: PredictionCache,
}

impl PredictionClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: MlConfig) -> Self {
        let health = Self::health_monitor(&transport, &config);
        Self {
            transport,
            config,
            health,
            cache: PredictionCache::new(),
        }
    }

    fn health_monitor(
        transport: &Arc<dyn HttpTransport>,
        config: &MlConfig,
    ) -> ConnectionHealthMonitor {
        ConnectionHealthMonitor::new(
            transport.clone(),
            config.health_url(),
            config.health_probe_timeout(),
            config.health_ttl(),
        )
    }

    /// Swaps settings. Connection state starts over; cached predictions stay.
    pub fn reconfigure(&mut self, config: MlConfig) {
        self.health = Self::health_monitor(&self.transport, &config);
        self.config = config;
    }

    pub async fn get_prediction(
        &mut self,
        features: &FeatureVector,
        direction: SignalDirection,
    ) -> Prediction {
        match self.request_prediction(features, direction).await {
            Ok(prediction) => {
                if prediction.is_valid {
                    info!(
                        "PredictionClient: {} {} -> {} conf={:.3} prob={:.3} model={}",
                        self.config.symbol,
                        direction,
                        prediction.raw_direction,
                        prediction.confidence,
                        prediction.probability,
                        prediction.model_key
                    );
                } else {
                    warn!(
                        "PredictionClient: rejected prediction for {}: {}",
                        self.config.symbol,
                        prediction.error_message().unwrap_or_default()
                    );
                }
                prediction
            }
            Err(e) => {
                match e {
                    PredictionError::Disabled => debug!("PredictionClient: disabled, skipping"),
                    _ => warn!(
                        "PredictionClient: prediction unavailable for {} [{}]: {}",
                        self.config.symbol,
                        e.category(),
                        e
                    ),
                }
                Prediction::invalid(e)
            }
        }
    }

    async fn request_prediction(
        &mut self,
        features: &FeatureVector,
        direction: SignalDirection,
    ) -> Result<Prediction, PredictionError> {
        if !self.config.enabled {
            return Err(PredictionError::Disabled);
        }
        if !self.health.is_healthy().await {
            return Err(PredictionError::NotConnected);
        }

        let payload = build_payload(&self.config, features, direction)?;
        let url = self.config.predict_url();
        debug!("PredictionClient: POST {}", url);

        let resp = self
            .transport
            .post_json(&url, &payload, self.config.request_timeout())
            .await?;

        if resp.status != 200 {
            return Err(PredictionError::from_status(resp.status, resp.body));
        }

        let prediction = parse_response(&resp.body)?;
        self.cache.record(prediction.clone());
        Ok(prediction)
    }

    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    pub fn health(&self) -> &ConnectionHealthMonitor {
        &self.health
    }

    pub async fn is_connected(&mut self) -> bool {
        self.health.is_healthy().await
    }

    pub fn config(&self) -> &MlConfig {
        &self.config
    }
}

/// Serialises the flat request document after checking the features are sendable.
pub fn build_payload(
    config: &MlConfig,
    features: &FeatureVector,
    direction: SignalDirection,
) -> Result<serde_json::Value, PredictionError> {
    features.validate()?;

    let request = PredictRequest {
        strategy: &config.strategy_name,
        symbol: &config.symbol,
        timeframe: &config.timeframe,
        direction,
        features,
    };

    serde_json::to_value(&request).map_err(|e| PredictionError::RequestBuild {
        reason: e.to_string(),
    })
}

/// Maps a 200 response body onto a prediction.
///
/// `Err` only when the body cannot be read as a response document. Anything
/// that parses is `Ok`: a non-"success" status, a missing prediction object or
/// an incomplete prediction all come back with `is_valid == false`.
pub fn parse_response(body: &str) -> Result<Prediction, PredictionError> {
    let parsed: PredictResponse =
        serde_json::from_str(body).map_err(|e| PredictionError::Protocol {
            reason: format!("deserialize failed: {}", e),
            status: Some(200),
            body: Some(body.to_string()),
        })?;

    let rejected = |reason: String| {
        Prediction::invalid(PredictionError::Protocol {
            reason,
            status: Some(200),
            body: Some(body.to_string()),
        })
    };

    if parsed.status != "success" {
        let reason = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("service returned status '{}'", parsed.status));
        return Ok(rejected(reason));
    }

    let Some(payload) = parsed.prediction else {
        return Ok(rejected("response has no prediction object".to_string()));
    };

    Ok(Prediction::from_fields(
        &payload.direction,
        payload.confidence,
        payload.probability,
        payload.model_type,
        payload.model_key,
    ))
}
