use crate::domain::ml::prediction::{Prediction, SignalDirection};
use tracing::debug;

/// Largest stop-loss scaling at either confidence extreme (±10%).
const STOP_LOSS_SENSITIVITY: f64 = 0.2;
const HIGH_CONFIDENCE: f64 = 0.7;
const LOW_CONFIDENCE: f64 = 0.4;
const HIGH_CONFIDENCE_SIZE: f64 = 1.2;
const LOW_CONFIDENCE_SIZE: f64 = 0.8;

/// Risk parameters after applying a prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAdjustment {
    pub signal_valid: bool,
    pub stop_loss: f64,
    pub lot_size: f64,
    pub stop_loss_factor: f64,
    pub size_multiplier: f64,
}

/// Turns prediction confidence into go/no-go and risk scaling.
///
/// The sizing rule is a step function on purpose: three tiers are easy for an
/// operator to audit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    min_confidence: f64,
    max_confidence: f64,
}

impl DecisionPolicy {
    pub fn new(min_confidence: f64, max_confidence: f64) -> Self {
        Self {
            min_confidence,
            max_confidence,
        }
    }

    /// True iff the prediction is structurally valid and its confidence lies
    /// within `[min_confidence, max_confidence]`.
    pub fn is_signal_valid(&self, prediction: &Prediction) -> bool {
        if !prediction.is_valid {
            return false;
        }

        let c = prediction.confidence;
        if c < self.min_confidence || c > self.max_confidence {
            debug!(
                "DecisionPolicy: confidence {:.3} outside [{:.2}, {:.2}]",
                c, self.min_confidence, self.max_confidence
            );
            return false;
        }
        true
    }

    /// `1 + (confidence - 0.5) * 0.2`, or 1.0 for an invalid prediction.
    pub fn stop_loss_factor(prediction: &Prediction) -> f64 {
        if !prediction.is_valid {
            return 1.0;
        }
        1.0 + (prediction.confidence - 0.5) * STOP_LOSS_SENSITIVITY
    }

    /// Buy stops are multiplied by the factor, sell stops divided by it.
    /// Hold and invalid predictions leave `base` untouched.
    pub fn adjust_stop_loss(
        &self,
        base: f64,
        prediction: &Prediction,
        direction: SignalDirection,
    ) -> f64 {
        if !prediction.is_valid {
            return base;
        }

        let factor = Self::stop_loss_factor(prediction);
        match direction {
            SignalDirection::Buy => base * factor,
            SignalDirection::Sell => base / factor,
            SignalDirection::Hold => base,
        }
    }

    pub fn size_multiplier(prediction: &Prediction) -> f64 {
        if !prediction.is_valid {
            return 1.0;
        }

        if prediction.confidence > HIGH_CONFIDENCE {
            HIGH_CONFIDENCE_SIZE
        } else if prediction.confidence < LOW_CONFIDENCE {
            LOW_CONFIDENCE_SIZE
        } else {
            1.0
        }
    }

    pub fn adjust_position_size(&self, base: f64, prediction: &Prediction) -> f64 {
        if !prediction.is_valid {
            return base;
        }
        base * Self::size_multiplier(prediction)
    }

    pub fn evaluate(
        &self,
        base_stop_loss: f64,
        base_lot_size: f64,
        prediction: &Prediction,
        direction: SignalDirection,
    ) -> RiskAdjustment {
        let stop_loss = self.adjust_stop_loss(base_stop_loss, prediction, direction);
        let lot_size = self.adjust_position_size(base_lot_size, prediction);

        RiskAdjustment {
            signal_valid: self.is_signal_valid(prediction),
            stop_loss,
            lot_size,
            stop_loss_factor: match direction {
                SignalDirection::Hold => 1.0,
                _ => Self::stop_loss_factor(prediction),
            },
            size_multiplier: Self::size_multiplier(prediction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PredictionError;

    fn with_confidence(c: f64) -> Prediction {
        Prediction::from_fields("buy", c, 0.6, "m", "k")
    }

    fn policy() -> DecisionPolicy {
        DecisionPolicy::new(0.30, 0.85)
    }

    #[test]
    fn test_signal_valid_iff_within_bounds() {
        let policy = policy();
        for (c, expected) in [
            (0.29, false),
            (0.30, true),
            (0.5, true),
            (0.85, true),
            (0.86, false),
            (0.99, false),
        ] {
            assert_eq!(
                policy.is_signal_valid(&with_confidence(c)),
                expected,
                "confidence {}",
                c
            );
        }
    }

    #[test]
    fn test_invalid_prediction_never_signals() {
        let p = Prediction::invalid(PredictionError::NotConnected);
        assert!(!policy().is_signal_valid(&p));
    }

    #[test]
    fn test_stop_loss_buy_scales_up_at_most_ten_percent() {
        let policy = policy();
        let mut previous = 100.0;
        for step in 1..=50 {
            let c = 0.5 + step as f64 * 0.01;
            let sl = policy.adjust_stop_loss(100.0, &with_confidence(c), SignalDirection::Buy);
            assert!(sl > previous);
            assert!(sl <= 110.0 + 1e-9);
            previous = sl;
        }
    }

    #[test]
    fn test_stop_loss_sell_divides_by_factor() {
        let p = with_confidence(0.65);
        let sl = policy().adjust_stop_loss(100.0, &p, SignalDirection::Sell);
        assert!((sl - 100.0 / 1.03).abs() < 1e-9);
    }

    #[test]
    fn test_stop_loss_unchanged_for_hold_and_invalid() {
        let policy = policy();
        assert_eq!(
            policy.adjust_stop_loss(100.0, &with_confidence(0.9), SignalDirection::Hold),
            100.0
        );

        let invalid = Prediction::invalid(PredictionError::Disabled);
        assert_eq!(
            policy.adjust_stop_loss(100.0, &invalid, SignalDirection::Buy),
            100.0
        );
    }

    #[test]
    fn test_position_size_tiers() {
        let policy = policy();
        assert!((policy.adjust_position_size(1.0, &with_confidence(0.71)) - 1.2).abs() < 1e-12);
        assert_eq!(policy.adjust_position_size(1.0, &with_confidence(0.7)), 1.0);
        assert_eq!(policy.adjust_position_size(1.0, &with_confidence(0.4)), 1.0);
        assert!((policy.adjust_position_size(1.0, &with_confidence(0.39)) - 0.8).abs() < 1e-12);

        let invalid = Prediction::invalid(PredictionError::NotConnected);
        assert_eq!(policy.adjust_position_size(0.5, &invalid), 0.5);
    }

    #[test]
    fn test_evaluate_bundles_adjustments() {
        let adj = policy().evaluate(50.0, 0.1, &with_confidence(0.65), SignalDirection::Buy);

        assert!(adj.signal_valid);
        assert!((adj.stop_loss_factor - 1.03).abs() < 1e-12);
        assert!((adj.stop_loss - 51.5).abs() < 1e-9);
        assert_eq!(adj.size_multiplier, 1.0);
        assert_eq!(adj.lot_size, 0.1);
    }
}
