use crate::domain::ml::feature_vector::FeatureVector;
use crate::domain::ml::prediction::{Prediction, SignalDirection};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const STATUS_OPEN: &str = "OPEN";
pub const STATUS_CLOSED: &str = "CLOSED";

/// How a trade most likely ended, inferred from the sign of its P&L.
/// The actual exit trigger is not observed by this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    ManualClose,
}

impl ExitReason {
    pub fn from_profit_loss(profit_loss: f64) -> Self {
        if profit_loss > 0.0 {
            ExitReason::TakeProfit
        } else if profit_loss < 0.0 {
            ExitReason::StopLoss
        } else {
            ExitReason::ManualClose
        }
    }
}

/// Trade fields supplied by the host when a position is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOpen {
    pub trade_id: String,
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub lot_size: f64,
}

/// Trade fields supplied by the host when a position is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeClose {
    pub trade_id: String,
    pub close_price: f64,
    pub profit_loss: f64,
    pub profit_loss_pips: f64,
    pub close_time: DateTime<Utc>,
}

/// Flat document posted to `/ml_trade_log`.
#[derive(Debug, Clone, Serialize)]
pub struct TradeOpenEvent {
    pub trade_id: String,
    pub strategy: String,
    pub symbol: String,
    pub timeframe: String,
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub lot_size: f64,
    pub ml_direction: String,
    pub ml_confidence: f64,
    pub ml_probability: f64,
    pub ml_model_type: String,
    pub ml_model_key: String,
    pub ml_valid: bool,
    pub open_time: DateTime<Utc>,
    pub status: &'static str,
    #[serde(flatten)]
    pub features: FeatureVector,
}

impl TradeOpenEvent {
    pub fn new(
        strategy: &str,
        symbol: &str,
        timeframe: &str,
        trade: &TradeOpen,
        prediction: &Prediction,
        features: &FeatureVector,
        open_time: DateTime<Utc>,
    ) -> Self {
        Self {
            trade_id: trade.trade_id.clone(),
            strategy: strategy.to_string(),
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            direction: trade.direction,
            entry_price: trade.entry_price,
            stop_loss: trade.stop_loss,
            take_profit: trade.take_profit,
            lot_size: trade.lot_size,
            ml_direction: prediction.raw_direction.clone(),
            ml_confidence: prediction.confidence,
            ml_probability: prediction.probability,
            ml_model_type: prediction.model_type.clone(),
            ml_model_key: prediction.model_key.clone(),
            ml_valid: prediction.is_valid,
            open_time,
            status: STATUS_OPEN,
            features: features.clone(),
        }
    }
}

/// Flat document posted to `/ml_trade_close`.
#[derive(Debug, Clone, Serialize)]
pub struct TradeCloseEvent {
    pub trade_id: String,
    pub strategy: String,
    pub symbol: String,
    pub close_price: f64,
    pub profit_loss: f64,
    pub profit_loss_pips: f64,
    pub close_time: DateTime<Utc>,
    pub exit_reason: ExitReason,
    pub status: &'static str,
}

impl TradeCloseEvent {
    pub fn new(strategy: &str, symbol: &str, trade: &TradeClose) -> Self {
        Self {
            trade_id: trade.trade_id.clone(),
            strategy: strategy.to_string(),
            symbol: symbol.to_string(),
            close_price: trade.close_price,
            profit_loss: trade.profit_loss,
            profit_loss_pips: trade.profit_loss_pips,
            close_time: trade.close_time,
            exit_reason: ExitReason::from_profit_loss(trade.profit_loss),
            status: STATUS_CLOSED,
        }
    }
}
