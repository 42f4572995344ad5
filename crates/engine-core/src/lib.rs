pub mod connectors;
pub mod metrics;
