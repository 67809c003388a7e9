pub mod autoscaling;
pub mod collectors;
pub mod config;
pub mod errors;
pub mod identity;
pub mod metrics;
pub mod pipeline;
pub mod publish;
