pub mod feature_vector;
pub mod prediction;
pub mod telemetry;

pub use feature_vector::{FEATURE_SCHEMA_VERSION, FeatureVector};
pub use prediction::{Prediction, SignalDirection};
pub use telemetry::{ExitReason, TradeClose, TradeCloseEvent, TradeOpen, TradeOpenEvent};
