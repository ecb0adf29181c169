use std::collections::HashMap;
use std::io;

use tracing::debug;

use super::{ScenarioCase, ScenarioSuite};
use crate::induction::LearnerBuilder;

/// Result of running one scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioResult {
    pub case: ScenarioCase,
    pub success: bool,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub accuracy: Option<f64>,
    pub error: Option<String>,
}

impl ScenarioResult {
    fn failed(case: ScenarioCase, error: String) -> Self {
        Self {
            case,
            success: false,
            expected: None,
            actual: None,
            accuracy: None,
            error: Some(error),
        }
    }
}

/// Aggregated summary describing the outcome of a regression run.
#[derive(Clone, Debug, PartialEq)]
pub struct RegressionSummary {
    pub results: Vec<ScenarioResult>,
    pub successes: usize,
    pub failures: usize,
    pub errors: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegressionGroupSummary {
    pub group: String,
    pub successes: usize,
    pub failures: usize,
}

impl RegressionSummary {
    pub fn from_results(results: Vec<ScenarioResult>) -> Self {
        let successes = results.iter().filter(|r| r.success).count();
        let errors = results.iter().filter(|r| r.error.is_some()).count();
        let failures = results.len() - successes;
        Self { results, successes, failures, errors }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn iter_failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|result| !result.success)
    }

    /// Successes and failures per scenario directory.
    pub fn by_group(&self) -> Vec<RegressionGroupSummary> {
        let mut grouped: HashMap<String, RegressionGroupSummary> = HashMap::new();
        for result in &self.results {
            let group = result
                .case
                .pairs
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|os| os.to_str())
                .unwrap_or("root")
                .to_string();
            let entry = grouped
                .entry(group.clone())
                .or_insert(RegressionGroupSummary { group, successes: 0, failures: 0 });
            if result.success {
                entry.successes += 1;
            } else {
                entry.failures += 1;
            }
        }
        let mut summaries: Vec<_> = grouped.into_values().collect();
        summaries.sort_by(|a, b| a.group.cmp(&b.group));
        summaries
    }

    pub fn render_table(&self) -> String {
        let groups = self.by_group();
        if groups.is_empty() {
            return String::from("(no scenarios)");
        }
        let mut lines = vec![format!("{:<20} {:>7} {:>7}", "Group", "Success", "Failure")];
        for summary in groups {
            lines.push(format!(
                "{:<20} {:>7} {:>7}",
                summary.group, summary.successes, summary.failures
            ));
        }
        lines.join("\n")
    }
}

/// Trains a fresh learner on every scenario and compares the rendered rule
/// with the golden file.
#[derive(Clone, Debug)]
pub struct ScenarioExecutor {
    suite: ScenarioSuite,
}

impl ScenarioExecutor {
    pub fn new(suite: ScenarioSuite) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> &ScenarioSuite {
        &self.suite
    }

    /// Run every scenario under the suite root. Fails only when the root
    /// cannot be scanned; per-scenario problems become failed results.
    pub fn run(&self) -> io::Result<RegressionSummary> {
        let cases = self.suite.available_cases()?;
        let results = cases.into_iter().map(|case| self.run_case(case)).collect();
        Ok(RegressionSummary::from_results(results))
    }

    pub fn run_case(&self, case: ScenarioCase) -> ScenarioResult {
        let pairs = match case.load_pairs() {
            Ok(pairs) => pairs,
            Err(err) => {
                return ScenarioResult::failed(case, format!("failed to load pairs: {}", err))
            }
        };
        let expected = match case.load_expected_rule() {
            Ok(Some(expected)) => expected,
            Ok(None) => return ScenarioResult::failed(case, "no `.rule` file".to_string()),
            Err(err) => {
                return ScenarioResult::failed(case, format!("failed to load golden rule: {}", err))
            }
        };
        let config = match case.load_config() {
            Ok(config) => config,
            Err(err) => return ScenarioResult::failed(case, err.to_string()),
        };
        let mut learner = match LearnerBuilder::new().with_config(config).build() {
            Ok(learner) => learner,
            Err(err) => return ScenarioResult::failed(case, err.to_string()),
        };

        let tuples: Vec<(&str, &str)> =
            pairs.iter().map(|pair| (pair.ur.as_str(), pair.sr.as_str())).collect();
        if let Err(err) = learner.train(tuples.iter().copied()) {
            return ScenarioResult::failed(case, format!("training failed: {}", err));
        }
        let actual = learner.render_rule();
        let accuracy = match learner.accuracy(tuples.iter().copied()) {
            Ok(accuracy) => accuracy,
            Err(err) => return ScenarioResult::failed(case, err.to_string()),
        };
        debug!(scenario = ?case.name(), rule = %actual, accuracy, "scenario trained");

        ScenarioResult {
            case,
            success: expected == actual,
            expected: Some(expected),
            actual: Some(actual),
            accuracy: Some(accuracy),
            error: None,
        }
    }
}
