//! ML service configuration parsing from environment variables.

use anyhow::{Context, Result, bail};
use std::env;
use std::time::Duration;
use url::Url;

/// Upper bound on the `/health` probe, so a cold prediction stalls the tick
/// for at most this plus one request timeout.
const MAX_HEALTH_PROBE_TIMEOUT_MS: u64 = 1000;

/// Settings for one integration-layer instance.
///
/// Immutable once built; change it through `MlAssist::reconfigure`.
#[derive(Debug, Clone, PartialEq)]
pub struct MlConfig {
    pub strategy_name: String,
    pub symbol: String,
    pub timeframe: String,
    pub enabled: bool,
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub request_timeout_ms: u64,
    pub service_url: String,
    pub telemetry_url: String,
    pub health_ttl_secs: u64,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            strategy_name: "default".to_string(),
            symbol: "EURUSD".to_string(),
            timeframe: "H1".to_string(),
            enabled: true,
            min_confidence: 0.30,
            max_confidence: 0.85,
            request_timeout_ms: 5000,
            service_url: "http://127.0.0.1:5000".to_string(),
            telemetry_url: "http://127.0.0.1:5000".to_string(),
            health_ttl_secs: 60,
        }
    }
}

impl MlConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key source. Missing keys take defaults;
    /// present but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let service_url = lookup("ML_SERVICE_URL").unwrap_or(defaults.service_url);
        let telemetry_url = lookup("ML_TELEMETRY_URL").unwrap_or_else(|| service_url.clone());

        let config = Self {
            strategy_name: lookup("ML_STRATEGY_NAME").unwrap_or(defaults.strategy_name),
            symbol: lookup("ML_SYMBOL").unwrap_or(defaults.symbol),
            timeframe: lookup("ML_TIMEFRAME").unwrap_or(defaults.timeframe),
            enabled: parse_or(&lookup, "ML_ENABLED", defaults.enabled)?,
            min_confidence: parse_or(&lookup, "ML_MIN_CONFIDENCE", defaults.min_confidence)?,
            max_confidence: parse_or(&lookup, "ML_MAX_CONFIDENCE", defaults.max_confidence)?,
            request_timeout_ms: parse_or(
                &lookup,
                "ML_REQUEST_TIMEOUT_MS",
                defaults.request_timeout_ms,
            )?,
            service_url,
            telemetry_url,
            health_ttl_secs: parse_or(&lookup, "ML_HEALTH_TTL_SECS", defaults.health_ttl_secs)?,
        };

        config.validated()
    }

    /// Checks invariants and normalises base URLs (no trailing slash).
    pub fn validated(mut self) -> Result<Self> {
        self.validate()?;
        self.service_url = self.service_url.trim_end_matches('/').to_string();
        self.telemetry_url = self.telemetry_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_confidence", self.min_confidence),
            ("max_confidence", self.max_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        if self.min_confidence > self.max_confidence {
            bail!(
                "min_confidence ({}) must not exceed max_confidence ({})",
                self.min_confidence,
                self.max_confidence
            );
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        if self.health_ttl_secs == 0 {
            bail!("health_ttl_secs must be greater than zero");
        }
        check_base_url("service_url", &self.service_url)?;
        check_base_url("telemetry_url", &self.telemetry_url)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.min(MAX_HEALTH_PROBE_TIMEOUT_MS))
    }

    pub fn health_ttl(&self) -> chrono::Duration {
        i64::try_from(self.health_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.service_url)
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.service_url)
    }

    pub fn trade_log_url(&self) -> String {
        format!("{}/ml_trade_log", self.telemetry_url)
    }

    pub fn trade_close_url(&self) -> String {
        format!("{}/ml_trade_close", self.telemetry_url)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}='{}'", key, raw)),
        None => Ok(default),
    }
}

fn check_base_url(name: &str, raw: &str) -> Result<()> {
    let parsed = Url::parse(raw).with_context(|| format!("Invalid {}: '{}'", name, raw))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("{} must use http or https, got '{}'", name, other),
    }
}
