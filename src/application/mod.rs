// Scoring client, decision policy and trade telemetry
pub mod ml;

// Connectivity tracking
pub mod monitoring;
