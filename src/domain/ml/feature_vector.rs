use crate::domain::errors::PredictionError;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Bumped whenever a field is added, removed or renamed.
/// The scoring service rejects payloads whose field set it does not know.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Market state handed to the scoring service.
///
/// Serialises to a flat JSON object whose keys are exactly [`FeatureVector::FIELD_NAMES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub rsi: f64,
    pub stoch_main: f64,
    pub stoch_signal: f64,
    pub macd_main: f64,
    pub macd_signal: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub williams_r: f64,
    pub cci: f64,
    pub momentum: f64,
    pub force_index: f64,
    pub volume_ratio: f64,
    pub price_change: f64,
    pub volatility: f64,
    pub spread: f64,
    pub session_hour: u32,
    pub is_news_time: bool,
    /// 0 = Sunday
    pub day_of_week: u32,
    /// 1-12
    pub month: u32,
}

impl FeatureVector {
    /// Wire order. Any change here is a breaking change for deployed models.
    pub const FIELD_NAMES: [&'static str; 19] = [
        "rsi",
        "stoch_main",
        "stoch_signal",
        "macd_main",
        "macd_signal",
        "bb_upper",
        "bb_lower",
        "williams_r",
        "cci",
        "momentum",
        "force_index",
        "volume_ratio",
        "price_change",
        "volatility",
        "spread",
        "session_hour",
        "is_news_time",
        "day_of_week",
        "month",
    ];

    /// Fills the calendar fields from a bar timestamp.
    pub fn with_session_context(mut self, at: DateTime<Utc>) -> Self {
        self.session_hour = at.hour();
        self.day_of_week = at.weekday().num_days_from_sunday();
        self.month = at.month();
        self
    }

    fn numeric_fields(&self) -> [(&'static str, f64); 15] {
        [
            ("rsi", self.rsi),
            ("stoch_main", self.stoch_main),
            ("stoch_signal", self.stoch_signal),
            ("macd_main", self.macd_main),
            ("macd_signal", self.macd_signal),
            ("bb_upper", self.bb_upper),
            ("bb_lower", self.bb_lower),
            ("williams_r", self.williams_r),
            ("cci", self.cci),
            ("momentum", self.momentum),
            ("force_index", self.force_index),
            ("volume_ratio", self.volume_ratio),
            ("price_change", self.price_change),
            ("volatility", self.volatility),
            ("spread", self.spread),
        ]
    }

    /// Rejects values the service cannot score. JSON has no NaN or infinity,
    /// so these would otherwise go out as `null` and fail server-side validation.
    pub fn validate(&self) -> Result<(), PredictionError> {
        if let Some((name, value)) = self.numeric_fields().iter().find(|(_, v)| !v.is_finite()) {
            return Err(PredictionError::RequestBuild {
                reason: format!("feature '{}' is not finite ({})", name, value),
            });
        }

        if self.session_hour > 23 {
            return Err(PredictionError::RequestBuild {
                reason: format!("session_hour out of range: {}", self.session_hour),
            });
        }
        if self.day_of_week > 6 {
            return Err(PredictionError::RequestBuild {
                reason: format!("day_of_week out of range: {}", self.day_of_week),
            });
        }
        if !(1..=12).contains(&self.month) {
            return Err(PredictionError::RequestBuild {
                reason: format!("month out of range: {}", self.month),
            });
        }

        Ok(())
    }
}

impl Default for FeatureVector {
    /// Neutral market: oscillators centred, no spread, Monday January at midnight.
    fn default() -> Self {
        Self {
            rsi: 50.0,
            stoch_main: 50.0,
            stoch_signal: 50.0,
            macd_main: 0.0,
            macd_signal: 0.0,
            bb_upper: 0.0,
            bb_lower: 0.0,
            williams_r: -50.0,
            cci: 0.0,
            momentum: 100.0,
            force_index: 0.0,
            volume_ratio: 1.0,
            price_change: 0.0,
            volatility: 0.0,
            spread: 0.0,
            session_hour: 0,
            is_news_time: false,
            day_of_week: 1,
            month: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serialized_keys_match_field_names() {
        let value = serde_json::to_value(FeatureVector::default()).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), FeatureVector::FIELD_NAMES.len());
        for name in FeatureVector::FIELD_NAMES {
            assert!(obj.contains_key(name), "missing key {}", name);
        }
    }

    #[test]
    fn test_payload_is_flat() {
        let value = serde_json::to_value(FeatureVector::default()).unwrap();
        assert!(
            value
                .as_object()
                .unwrap()
                .values()
                .all(|v| !v.is_object() && !v.is_array())
        );
    }

    #[test]
    fn test_session_context() {
        // 2024-03-15 was a Friday
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let fv = FeatureVector::default().with_session_context(at);

        assert_eq!(fv.session_hour, 14);
        assert_eq!(fv.day_of_week, 5);
        assert_eq!(fv.month, 3);
        assert!(fv.validate().is_ok());
    }

    #[test]
    fn test_non_finite_feature_rejected() {
        let fv = FeatureVector {
            cci: f64::NAN,
            ..Default::default()
        };

        match fv.validate() {
            Err(PredictionError::RequestBuild { reason }) => assert!(reason.contains("cci")),
            other => panic!("expected RequestBuild, got {:?}", other),
        }
    }

    #[test]
    fn test_calendar_ranges() {
        let fv = FeatureVector {
            month: 0,
            ..Default::default()
        };
        assert!(fv.validate().is_err());

        let fv = FeatureVector {
            session_hour: 24,
            ..Default::default()
        };
        assert!(fv.validate().is_err());
    }
}
