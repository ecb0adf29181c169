//! Tier-based induction of phonological harmony and disharmony rules.
//!
//! Segments are feature vectors interned in a [`SegmentInventory`]. Given
//! UR/SR pairs that differ in one set of features, a [`Learner`] searches for a
//! single rule that copies (or inverts) those features from an adjacent
//! segment, projecting onto progressively narrower tiers until the rule passes
//! the Tolerance/Sufficiency Principle.

pub mod config;
pub mod data;
pub mod induction;
pub mod parser;
pub mod regression;

pub use config::{ConfigError, LearnerConfig, Statistics};
pub use data::{
    FeatureSpace, FeatureValue, InventoryError, NaturalClass, Segment, SegmentId,
    SegmentInventory, SegmentSequence, SignedFeature,
};
pub use induction::{
    tsp, tsp_correct, BuildError, Context, ContextSpec, Direction, Discrepancy, Form, Learner,
    LearnerBuilder, Pair, Projection, Rule, RuleBuilder, RuleError, Tier, TierError, TierSpec,
    TrainError, TrainingReport,
};
pub use parser::{load_pairs, parse_pairs, FeatureTable, ParseError, TrainingPair};
pub use regression::{
    RegressionGroupSummary, RegressionSummary, ScenarioCase, ScenarioExecutor, ScenarioResult,
    ScenarioSuite,
};

#[cfg(test)]
mod tests {
    use super::regression::ScenarioSuite;

    #[test]
    fn default_scenario_suite_exists() {
        let suite = ScenarioSuite::default();
        assert!(suite.root().exists(), "scenario root must be present");
    }
}
