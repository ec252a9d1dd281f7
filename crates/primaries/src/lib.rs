pub mod config;
pub mod determination;
pub mod error;
pub mod telemetry;
