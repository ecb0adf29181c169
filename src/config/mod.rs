//! Learner configuration and per-training statistics.

mod params;
mod stats;

pub use params::{ConfigError, LearnerConfig};
pub use stats::Statistics;
