pub mod connection_health_service;

pub use connection_health_service::{ConnectionHealthMonitor, ConnectionState, ConnectionStatus};
