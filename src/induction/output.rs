//! Summaries of a training run.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use serde::Serialize;

use super::learner::Learner;
use super::rule::Direction;
use crate::data::FeatureValue;

/// What training produced, in a form that serialises to JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Rendered rule, or `None`.
    pub rule: String,
    pub found: bool,
    pub harmony: Option<bool>,
    pub direction: Option<&'static str>,
    pub target: Vec<String>,
    pub features: Vec<String>,
    pub tier: Option<String>,
    pub defaults: Option<BTreeMap<String, FeatureValue>>,
    /// Scope and correct count of the rule over the training pairs.
    pub n: usize,
    pub m: usize,
    pub accuracy: f64,
    pub stats: BTreeMap<String, u64>,
}

impl TrainingReport {
    /// Summarise `learner`, scoring its rule on its training pairs.
    pub fn new(learner: &Learner) -> Self {
        let inventory = learner.inventory();
        let stats = learner.stats().snapshot();
        let Some(rule) = learner.rule() else {
            return Self {
                rule: learner.render_rule(),
                found: false,
                harmony: None,
                direction: None,
                target: Vec::new(),
                features: Vec::new(),
                tier: None,
                defaults: None,
                n: 0,
                m: 0,
                accuracy: 0.0,
                stats,
            };
        };
        let (n, m) = rule.tsp_stats(inventory, learner.training_pairs());
        let mut target: Vec<String> =
            rule.target().iter().map(|id| inventory.symbol(*id).to_string()).collect();
        target.sort();
        Self {
            rule: rule.render(inventory),
            found: true,
            harmony: Some(rule.is_harmony()),
            direction: Some(match rule.direction() {
                Direction::LeftToRight => "left-to-right",
                Direction::RightToLeft => "right-to-left",
            }),
            target,
            features: rule.features().iter().cloned().collect(),
            tier: rule.tier().map(|tier| tier.render(inventory)),
            defaults: rule.defaults().cloned(),
            n,
            m,
            accuracy: if n == 0 { 0.0 } else { m as f64 / n as f64 },
            stats,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rule: {}", self.rule)?;
        if self.found {
            writeln!(f, "scope: n = {}, m = {} (accuracy {:.3})", self.n, self.m, self.accuracy)?;
            if let Some(defaults) = &self.defaults {
                let mut rendered = String::new();
                for (feature, value) in defaults {
                    if !rendered.is_empty() {
                        rendered.push(',');
                    }
                    write!(rendered, "{}{}", value, feature)?;
                }
                writeln!(f, "defaults: [{}]", rendered)?;
            }
        }
        for (name, value) in &self.stats {
            writeln!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}
