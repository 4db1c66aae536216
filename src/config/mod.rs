//! Configuration module for the ML integration layer.
//!
//! Settings are read from environment variables (optionally seeded from a
//! `.env` file by the binary) and validated once, up front.

mod ml_config;

pub use ml_config::MlConfig;
