//! Server-wide counters

pub mod metrics;

pub use metrics::{ServerStats, StatsSnapshot};
