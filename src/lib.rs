pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::ml::MlAssist;

#[cfg(test)]
mod config_tests;
