//! Tier-based rule induction.

pub mod builder;
pub mod discrepancy;
pub mod learner;
pub mod output;
pub mod rule;
pub mod tier;
pub mod tsp;

pub use builder::{BuildError, LearnerBuilder};
pub use discrepancy::{Discrepancy, Occurrence};
pub use learner::{Form, Learner, Pair, TrainError};
pub use output::TrainingReport;
pub use rule::{Context, ContextSpec, Direction, Prediction, Rule, RuleBuilder, RuleError};
pub use tier::{Projection, Tier, TierError, TierSpec};
pub use tsp::{tsp, tsp_correct};
