use crate::domain::errors::PredictionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
    Hold,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Buy => "buy",
            SignalDirection::Sell => "sell",
            SignalDirection::Hold => "hold",
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(SignalDirection::Buy),
            "sell" => Ok(SignalDirection::Sell),
            "hold" => Ok(SignalDirection::Hold),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// The scoring service's verdict for one feature vector.
///
/// Built once by the prediction client and never mutated afterwards.
/// `error` is `Some` exactly when `is_valid` is false.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Direction as sent by the service, trimmed.
    pub raw_direction: String,
    /// `raw_direction` when it names buy, sell or hold.
    pub direction: Option<SignalDirection>,
    pub confidence: f64,
    pub probability: f64,
    pub model_type: String,
    pub model_key: String,
    pub is_valid: bool,
    pub error: Option<PredictionError>,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn invalid(error: PredictionError) -> Self {
        Self {
            raw_direction: String::new(),
            direction: None,
            confidence: 0.0,
            probability: 0.0,
            model_type: String::new(),
            model_key: String::new(),
            is_valid: false,
            error: Some(error),
            created_at: Utc::now(),
        }
    }

    /// Builds a prediction from the service's fields and applies the
    /// completeness check: a non-empty direction, and strictly positive
    /// confidence and probability. Direction labels outside buy/sell/hold are
    /// kept verbatim and do not make the prediction invalid.
    pub fn from_fields(
        direction: &str,
        confidence: f64,
        probability: f64,
        model_type: impl Into<String>,
        model_key: impl Into<String>,
    ) -> Self {
        let raw_direction = direction.trim().to_string();
        let parsed = raw_direction.parse::<SignalDirection>().ok();

        let error = if raw_direction.is_empty() {
            Some(PredictionError::protocol("missing direction"))
        } else if !(confidence > 0.0) {
            Some(PredictionError::protocol(format!(
                "non-positive confidence {}",
                confidence
            )))
        } else if !(probability > 0.0) {
            Some(PredictionError::protocol(format!(
                "non-positive probability {}",
                probability
            )))
        } else {
            None
        };

        Self {
            raw_direction,
            direction: parsed,
            confidence,
            probability,
            model_type: model_type.into(),
            model_key: model_key.into(),
            is_valid: error.is_none(),
            error,
            created_at: Utc::now(),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("BUY".parse::<SignalDirection>(), Ok(SignalDirection::Buy));
        assert_eq!(" sell ".parse::<SignalDirection>(), Ok(SignalDirection::Sell));
        assert!("long".parse::<SignalDirection>().is_err());
        assert_eq!(SignalDirection::Hold.to_string(), "hold");
    }

    #[test]
    fn test_complete_prediction_is_valid() {
        let p = Prediction::from_fields("buy", 0.65, 0.7, "xgboost", "EURUSD_H1");
        assert!(p.is_valid);
        assert!(p.error.is_none());
        assert_eq!(p.direction, Some(SignalDirection::Buy));
    }

    #[test]
    fn test_completeness_check() {
        let p = Prediction::from_fields("", 0.65, 0.7, "m", "k");
        assert!(!p.is_valid);

        let p = Prediction::from_fields("buy", 0.0, 0.7, "m", "k");
        assert!(!p.is_valid);
        assert!(p.error_message().unwrap().contains("confidence"));

        let p = Prediction::from_fields("sell", 0.5, -0.1, "m", "k");
        assert!(!p.is_valid);
        assert!(p.error_message().unwrap().contains("probability"));

        let p = Prediction::from_fields("buy", f64::NAN, 0.5, "m", "k");
        assert!(!p.is_valid);
    }

    #[test]
    fn test_unlisted_direction_label_is_still_valid() {
        let p = Prediction::from_fields("strong_buy", 0.65, 0.7, "m", "k");
        assert!(p.is_valid);
        assert_eq!(p.raw_direction, "strong_buy");
        assert_eq!(p.direction, None);

        let p = Prediction::from_fields("  ", 0.65, 0.7, "m", "k");
        assert!(!p.is_valid);
        assert!(p.error_message().unwrap().contains("missing direction"));
    }

    #[test]
    fn test_low_confidence_still_structurally_valid() {
        // Bounds are enforced by the decision policy, not here.
        let p = Prediction::from_fields("buy", 0.01, 0.2, "m", "k");
        assert!(p.is_valid);
    }

    #[test]
    fn test_invalid_carries_error() {
        let p = Prediction::invalid(PredictionError::NotConnected);
        assert!(!p.is_valid);
        assert_eq!(p.error_message().as_deref(), Some("not connected"));
        assert_eq!(p.direction, None);
    }
}
