// Domain-specific error types
pub mod errors;

// Feature vectors, predictions and trade telemetry documents
pub mod ml;

// Port interfaces
pub mod ports;
