//! ML Probe - one-shot check of the scoring service
//!
//! Loads the ML configuration from the environment, checks service health,
//! requests a single prediction for a neutral feature vector and logs what the
//! decision policy would do with it.
//!
//! # Usage
//! ```sh
//! ML_SERVICE_URL=http://127.0.0.1:5000 cargo run --bin ml_probe -- sell
//! ```

use anyhow::Result;
use chrono::Utc;
use mlassist::MlAssist;
use mlassist::config::MlConfig;
use mlassist::domain::ml::{FEATURE_SCHEMA_VERSION, FeatureVector, SignalDirection};
use mlassist::infrastructure::ReqwestTransport;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("ML Probe {} starting...", env!("CARGO_PKG_VERSION"));

    let direction = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<SignalDirection>().map_err(anyhow::Error::msg)?,
        None => SignalDirection::Buy,
    };

    let config = MlConfig::from_env()?;
    let mut assist = MlAssist::new(config, Arc::new(ReqwestTransport::new()))?;

    if !assist.is_connected().await {
        warn!(
            "Scoring service at {} is not reachable",
            assist.config().service_url
        );
    }

    let features = FeatureVector::default().with_session_context(Utc::now());
    info!(
        "Requesting {} prediction (feature schema v{})",
        direction, FEATURE_SCHEMA_VERSION
    );
    let prediction = assist.get_prediction(&features, direction).await;

    if !prediction.is_valid {
        warn!(
            "No usable prediction: {}",
            prediction.error_message().unwrap_or_default()
        );
        return Ok(());
    }

    let adj = assist.evaluate(100.0, 1.0, &prediction, direction);
    info!(
        "Prediction: {} confidence={:.3} probability={:.3} model={} ({})",
        prediction.raw_direction,
        prediction.confidence,
        prediction.probability,
        prediction.model_key,
        prediction.model_type
    );
    info!(
        "Policy: signal_valid={} stop_loss x{:.3} size x{:.2}",
        adj.signal_valid, adj.stop_loss_factor, adj.size_multiplier
    );

    Ok(())
}
