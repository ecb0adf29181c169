//! Bundled training sets with golden rule renderings.
//!
//! A scenario is a `<name>.tsv` file of `UR<TAB>SR` pairs next to a
//! `<name>.rule` file holding the rendering training must produce (`None`
//! when no rule should be found). An optional `<name>.toml` overrides the
//! learner configuration for that scenario.

mod executor;

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use executor::{
    RegressionGroupSummary, RegressionSummary, ScenarioExecutor, ScenarioResult,
};

use crate::config::{ConfigError, LearnerConfig};
use crate::parser::{load_pairs, ParseError, TrainingPair};

/// A single scenario identified by its `.tsv` pairs and optional golden rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioCase {
    pub pairs: PathBuf,
    pub expected_rule: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl ScenarioCase {
    pub fn name(&self) -> Option<&OsStr> {
        self.pairs.file_stem()
    }

    pub fn load_pairs(&self) -> Result<Vec<TrainingPair>, ParseError> {
        load_pairs(&self.pairs, '\t')
    }

    pub fn load_expected_rule(&self) -> io::Result<Option<String>> {
        match &self.expected_rule {
            Some(path) => fs::read_to_string(path).map(|text| Some(text.trim().to_string())),
            None => Ok(None),
        }
    }

    pub fn load_config(&self) -> Result<LearnerConfig, ConfigError> {
        match &self.config {
            Some(path) => LearnerConfig::load(path),
            None => Ok(LearnerConfig::default()),
        }
    }
}

/// The scenario files under one root directory.
#[derive(Clone, Debug)]
pub struct ScenarioSuite {
    root: PathBuf,
}

impl Default for ScenarioSuite {
    fn default() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("scenarios"))
    }
}

impl ScenarioSuite {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn available_pairs(&self) -> io::Result<Vec<PathBuf>> {
        self.collect_with_extension("tsv")
    }

    pub fn available_cases(&self) -> io::Result<Vec<ScenarioCase>> {
        let mut rules = self.stems_of("rule")?;
        let mut configs = self.stems_of("toml")?;

        let mut cases = Vec::new();
        for pairs in self.available_pairs()? {
            let Some(key) = stem_key(&pairs) else { continue };
            cases.push(ScenarioCase {
                expected_rule: rules.remove(&key),
                config: configs.remove(&key),
                pairs,
            });
        }
        cases.sort_by(|a, b| a.pairs.cmp(&b.pairs));
        Ok(cases)
    }

    fn stems_of(&self, ext: &str) -> io::Result<HashMap<PathBuf, PathBuf>> {
        Ok(self
            .collect_with_extension(ext)?
            .into_iter()
            .filter_map(|path| Some((stem_key(&path)?, path)))
            .collect())
    }

    fn collect_with_extension(&self, ext: &str) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        self.walk(&self.root, ext, &mut paths)?;
        paths.sort();
        Ok(paths)
    }

    fn walk(&self, dir: &Path, ext: &str, acc: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.walk(&path, ext, acc)?;
            } else if path.extension().and_then(OsStr::to_str) == Some(ext) {
                acc.push(path);
            }
        }
        Ok(())
    }
}

/// Path without its extension, so siblings of one scenario share a key.
fn stem_key(path: &Path) -> Option<PathBuf> {
    Some(path.parent()?.join(path.file_stem()?))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{ScenarioExecutor, ScenarioSuite};

    #[test]
    fn enumerate_scenarios() {
        let suite = ScenarioSuite::default();
        let cases = suite.available_cases().expect("scan scenarios");
        assert!(!cases.is_empty(), "expected at least one scenario");
        for case in &cases {
            assert!(case.expected_rule.is_some(), "{:?} has no golden rule", case.name());
            assert!(!case.load_pairs().expect("read pairs").is_empty());
        }
    }

    #[test]
    fn bundled_scenarios_pass() {
        let summary = ScenarioExecutor::new(ScenarioSuite::default()).run().expect("scan");
        let failures: Vec<_> = summary.iter_failures().collect();
        assert!(failures.is_empty(), "failing scenarios: {:#?}", failures);
        assert!(!summary.by_group().is_empty());
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing");
        assert!(ScenarioExecutor::new(ScenarioSuite::new(missing)).run().is_err());
    }

    #[test]
    fn scenario_without_golden_rule_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("orphan.tsv"), "a t\ta t\n").expect("write pairs");
        fs::write(dir.path().join("checked.tsv"), "a t\ta t\n").expect("write pairs");
        fs::write(dir.path().join("checked.rule"), "None\n").expect("write rule");

        let summary = ScenarioExecutor::new(ScenarioSuite::new(dir.path())).run().expect("scan");
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.successes, 1);
        let failure = summary.iter_failures().next().expect("one failure");
        assert_eq!(failure.case.name().and_then(|n| n.to_str()), Some("orphan"));
        assert!(failure.error.is_some());
    }
}
