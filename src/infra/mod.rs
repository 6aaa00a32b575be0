//! Infrastructure adapters: telemetry and outbound HTTP.

pub mod assistant;
pub mod error;
pub mod telemetry;
