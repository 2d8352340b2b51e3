//utilities shared by both components: configuration, cancellation, run metrics
pub mod config;
pub mod metrics;
pub mod shutdown;
