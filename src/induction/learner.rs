//! The Distant-to-Local (D2L) induction engine.
//!
//! Training normalises the pairs, extracts the single discrepancy they
//! exhibit, and then searches for the most accurate productive rule. The
//! search starts with no tier and, while the best candidate fails the TSP
//! gate, grows a delset of segments that misled the rule and re-projects
//! onto a tier that hides them. It stops as soon as a candidate is
//! productive or the delset stops growing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;
use tracing::{debug, info, trace};

use super::builder::LearnerBuilder;
use super::discrepancy::Discrepancy;
use super::output::TrainingReport;
use super::rule::{Context, ContextSpec, Direction, Rule, RuleError};
use super::tier::{Projection, Tier, TierSpec};
use super::tsp::tsp_correct;
use crate::config::{LearnerConfig, Statistics};
use crate::data::{
    FeatureValue, InventoryError, NaturalClass, SegmentId, SegmentInventory, SegmentSequence,
    SignedFeature,
};

/// A `(UR, SR)` training pair.
pub type Pair = (SegmentSequence, SegmentSequence);

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(
        "only alternations without insertion or deletion are supported, but `{ur}` \
         ({ur_len} segments) and `{sr}` ({sr_len} segments) differ in length"
    )]
    LengthMismatch { ur: String, sr: String, ur_len: usize, sr_len: usize },
    #[error("`{ur}` alternates on {found}, but earlier alternations are on {expected}")]
    InconsistentDiscrepancy { expected: String, found: String, ur: String },
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// A UR or SR as given to the learner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Form {
    /// Space-separated segment symbols.
    Symbols(String),
    Sequence(SegmentSequence),
}

impl From<&str> for Form {
    fn from(text: &str) -> Self {
        Form::Symbols(text.to_string())
    }
}

impl From<String> for Form {
    fn from(text: String) -> Self {
        Form::Symbols(text)
    }
}

impl From<&String> for Form {
    fn from(text: &String) -> Self {
        Form::Symbols(text.clone())
    }
}

impl From<SegmentSequence> for Form {
    fn from(seq: SegmentSequence) -> Self {
        Form::Sequence(seq)
    }
}

impl From<&SegmentSequence> for Form {
    fn from(seq: &SegmentSequence) -> Self {
        Form::Sequence(seq.clone())
    }
}

/// Learns at most one harmony or disharmony rule from UR/SR pairs.
#[derive(Clone, Debug)]
pub struct Learner {
    inventory: SegmentInventory,
    config: LearnerConfig,
    rule: Option<Rule>,
    discrepancy: Option<Discrepancy>,
    pairs: Vec<Pair>,
    stats: Statistics,
}

impl Learner {
    pub fn new(inventory: SegmentInventory, config: LearnerConfig) -> Self {
        Self {
            inventory,
            config,
            rule: None,
            discrepancy: None,
            pairs: Vec::new(),
            stats: Statistics::new(),
        }
    }

    pub fn builder() -> LearnerBuilder {
        LearnerBuilder::new()
    }

    pub fn inventory(&self) -> &SegmentInventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut SegmentInventory {
        &mut self.inventory
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// The trained rule; `None` before training or when nothing generalises.
    pub fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    pub fn discrepancy(&self) -> Option<&Discrepancy> {
        self.discrepancy.as_ref()
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Unique pairs from the last training call.
    pub fn training_pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn report(&self) -> TrainingReport {
        TrainingReport::new(self)
    }

    /// Rendering of the trained rule, or `None`.
    pub fn render_rule(&self) -> String {
        self.rule
            .as_ref()
            .map(|rule| rule.render(&self.inventory))
            .unwrap_or_else(|| "None".to_string())
    }

    /// Train on `(UR, SR)` pairs. Duplicate pairs count once.
    pub fn train<I, U, S>(&mut self, pairs: I) -> Result<&mut Self, TrainError>
    where
        I: IntoIterator<Item = (U, S)>,
        U: Into<Form>,
        S: Into<Form>,
    {
        self.rule = None;
        self.discrepancy = None;
        self.pairs.clear();
        self.stats.clear();

        let tokenised: Vec<(Vec<String>, Vec<String>)> = pairs
            .into_iter()
            .map(|(ur, sr)| (self.symbols_of(ur.into()), self.symbols_of(sr.into())))
            .collect();
        info!(pairs = tokenised.len(), "training started");

        for (ur, sr) in &tokenised {
            if ur.len() != sr.len() {
                return Err(TrainError::LengthMismatch {
                    ur: ur.join(" "),
                    sr: sr.join(" "),
                    ur_len: ur.len(),
                    sr_len: sr.len(),
                });
            }
        }
        self.synthesize_abstract(&tokenised)?;

        let mut unique: BTreeSet<Pair> = BTreeSet::new();
        for (ur, sr) in &tokenised {
            let ur = self.inventory.sequence_from_symbols(ur)?;
            let sr = self.inventory.sequence_from_symbols(sr)?;
            unique.insert((ur, sr));
        }
        // Symbol order, so nothing downstream depends on registration order.
        let inventory = &self.inventory;
        let mut pairs: Vec<Pair> = unique.into_iter().collect();
        pairs.sort_by(|(ur_a, sr_a), (ur_b, sr_b)| {
            ur_a.cmp_symbols(ur_b, inventory).then_with(|| sr_a.cmp_symbols(sr_b, inventory))
        });
        self.stats.set(Statistics::PAIRS, pairs.len() as u64);
        self.pairs = pairs.clone();

        let Some(discrepancy) = self.extract_discrepancy(&pairs)? else {
            info!("no discrepancy between URs and SRs; no rule needed");
            return Ok(self);
        };
        debug!(discrepancy = %discrepancy.render(&self.inventory), "extracted discrepancy");

        let mut search = Search {
            inventory: &self.inventory,
            config: &self.config,
            pairs: &pairs,
            discrepancy: &discrepancy,
            targets: discrepancy.alternating_ur_segments(),
            stats: &mut self.stats,
        };
        let harmony = if self.config.harmony { search.run(true)? } else { None };
        let disharmony = if self.config.disharmony { search.run(false)? } else { None };

        self.rule = match (harmony, disharmony) {
            (Some(h), Some(d)) => {
                let h_acc = h.accuracy(&self.inventory, &pairs);
                let d_acc = d.accuracy(&self.inventory, &pairs);
                Some(if d_acc > h_acc { d } else { h })
            }
            (h, d) => h.or(d),
        };
        self.discrepancy = Some(discrepancy);

        match &self.rule {
            Some(rule) => info!(rule = %rule.render(&self.inventory), "rule retained"),
            None => info!("no productive rule found"),
        }
        Ok(self)
    }

    /// Apply the trained rule to `ur`; the identity when there is none.
    pub fn produce(&mut self, ur: impl Into<Form>) -> Result<SegmentSequence, InventoryError> {
        let ur = self.materialize(ur.into())?;
        Ok(match &self.rule {
            Some(rule) => rule.produce(&self.inventory, &ur),
            None => ur,
        })
    }

    /// [`Learner::produce`], rendered as space-separated symbols.
    pub fn produce_symbols(&mut self, ur: &str) -> Result<String, InventoryError> {
        let sr = self.produce(ur)?;
        Ok(self.inventory.render(&sr))
    }

    /// Fraction of the unique pairs whose SR the model produces exactly.
    pub fn accuracy<I, U, S>(&mut self, pairs: I) -> Result<f64, TrainError>
    where
        I: IntoIterator<Item = (U, S)>,
        U: Into<Form>,
        S: Into<Form>,
    {
        let mut unique = BTreeSet::new();
        for (ur, sr) in pairs {
            let ur = self.materialize(ur.into())?;
            let sr = self.materialize(sr.into())?;
            if ur.len() != sr.len() {
                return Err(TrainError::LengthMismatch {
                    ur: self.inventory.render(&ur),
                    sr: self.inventory.render(&sr),
                    ur_len: ur.len(),
                    sr_len: sr.len(),
                });
            }
            unique.insert((ur, sr));
        }
        if unique.is_empty() {
            return Ok(0.0);
        }
        let correct = unique
            .iter()
            .filter(|(ur, sr)| match &self.rule {
                Some(rule) => &rule.produce(&self.inventory, ur) == sr,
                None => ur == sr,
            })
            .count();
        Ok(correct as f64 / unique.len() as f64)
    }

    fn symbols_of(&self, form: Form) -> Vec<String> {
        match form {
            Form::Symbols(text) => text.split_whitespace().map(str::to_string).collect(),
            Form::Sequence(seq) => {
                seq.iter().map(|id| self.inventory.symbol(id).to_string()).collect()
            }
        }
    }

    fn materialize(&mut self, form: Form) -> Result<SegmentSequence, InventoryError> {
        match form {
            Form::Symbols(text) => self.inventory.sequence(&text),
            Form::Sequence(seq) => Ok(seq),
        }
    }

    /// Register every UR symbol unknown to both the inventory and the base
    /// table as a custom segment carrying the features its realisations share.
    fn synthesize_abstract(
        &mut self,
        pairs: &[(Vec<String>, Vec<String>)],
    ) -> Result<(), TrainError> {
        let mut realisations: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (ur, sr) in pairs {
            for (u, s) in ur.iter().zip(sr) {
                if u != s && !self.inventory.contains(u) && !self.inventory.in_base_table(u) {
                    realisations.entry(u.as_str()).or_default().insert(s.as_str());
                }
            }
        }

        for (symbol, surface) in realisations {
            let ids = self.inventory.add_segments(&surface)?;
            let shared: HashMap<String, FeatureValue> = self
                .inventory
                .feature_intersection(ids, false)
                .into_iter()
                .map(|SignedFeature { value, feature }| (feature, value))
                .collect();
            let features: Vec<(String, FeatureValue)> = self
                .inventory
                .feature_space()
                .iter()
                .map(|name| {
                    let value = shared.get(name).copied().unwrap_or(FeatureValue::Underspecified);
                    (name.to_string(), value)
                })
                .collect();
            self.inventory.add_custom(symbol, features)?;
            self.stats.increment(Statistics::ABSTRACT_SEGMENTS);
            debug!(symbol, realisations = ?surface, "synthesized abstract segment");
        }
        Ok(())
    }

    fn extract_discrepancy(&self, pairs: &[Pair]) -> Result<Option<Discrepancy>, TrainError> {
        let mut discrepancy: Option<Discrepancy> = None;
        for (ur, sr) in pairs {
            for (pos, (u, s)) in ur.iter().zip(sr.iter()).enumerate() {
                if u == s {
                    continue;
                }
                let diff = self.inventory.feature_diff(u, s);
                if diff.is_empty() {
                    // Featurally identical; nothing alternates.
                    continue;
                }
                let disc = discrepancy.get_or_insert_with(|| Discrepancy::new(diff.clone()));
                if disc.features() != &diff {
                    return Err(TrainError::InconsistentDiscrepancy {
                        expected: disc.render_features(),
                        found: format!("{{{}}}", diff.into_iter().collect::<Vec<_>>().join(",")),
                        ur: self.inventory.render(ur),
                    });
                }
                disc.tabulate(ur, pos, u, s);
            }
        }
        Ok(discrepancy)
    }
}

/// State shared by the harmony and disharmony searches of one training call.
struct Search<'a> {
    inventory: &'a SegmentInventory,
    config: &'a LearnerConfig,
    pairs: &'a [Pair],
    discrepancy: &'a Discrepancy,
    targets: BTreeSet<SegmentId>,
    stats: &'a mut Statistics,
}

impl Search<'_> {
    /// Refine the tier until a productive rule appears or the delset stops
    /// growing.
    fn run(&mut self, harmony: bool) -> Result<Option<Rule>, TrainError> {
        let mut tier: Option<Tier> = None;
        let mut delset: BTreeSet<SegmentId> = BTreeSet::new();

        loop {
            let iteration = self.stats.increment(Statistics::SEARCH_ITERATIONS);
            let (left_ctxts, right_ctxts) = self.contexts(tier.as_ref());
            let left = self.candidate(
                ContextSpec::Explicit(left_ctxts),
                Direction::LeftToRight,
                &tier,
                harmony,
            )?;
            let right = self.candidate(
                ContextSpec::Explicit(right_ctxts),
                Direction::RightToLeft,
                &tier,
                harmony,
            )?;

            let left_acc = left.accuracy(self.inventory, self.pairs);
            let right_acc = right.accuracy(self.inventory, self.pairs);
            let best = if left_acc >= right_acc { &left } else { &right };
            let (n, m) = best.tsp_stats(self.inventory, self.pairs);
            debug!(
                iteration,
                harmony,
                tier = %self.render_tier(tier.as_ref()),
                left_acc,
                right_acc,
                n,
                m,
                "search iteration"
            );

            if tsp_correct(n, m) {
                return Ok(Some(self.widen(best.clone(), tier.as_ref())?));
            }

            let errant: BTreeSet<SegmentId> = left
                .errant_contexts(self.inventory, self.pairs)
                .into_iter()
                .chain(right.errant_contexts(self.inventory, self.pairs))
                .filter_map(Context::segment)
                .filter(|id| !self.targets.contains(id))
                .collect();
            let before = delset.len();
            delset.extend(errant);
            if delset.len() == before {
                debug!(harmony, "delset did not grow; no rule");
                return Ok(None);
            }

            let Some(class) = covering_class(
                self.inventory,
                &delset,
                &self.targets,
                self.config.max_class_literals,
            ) else {
                debug!(
                    harmony,
                    delset = %self.inventory.render_set(&delset),
                    "no class covers the delset"
                );
                return Ok(None);
            };
            let refined = refine_tier(self.inventory, class);
            self.stats.increment(Statistics::TIER_REFINEMENTS);
            debug!(
                delset = %self.inventory.render_set(&delset),
                tier = %refined.render(self.inventory),
                "refined tier"
            );
            tier = Some(refined);
        }
    }

    /// Left and right neighbours, on the tier, of every target in every
    /// discrepancy UR.
    fn contexts(&self, tier: Option<&Tier>) -> (BTreeSet<Context>, BTreeSet<Context>) {
        let mut left = BTreeSet::new();
        let mut right = BTreeSet::new();
        for ur in self.discrepancy.urs() {
            let proj = match tier {
                Some(tier) => tier.project(self.inventory, ur),
                None => Projection::identity(ur),
            };
            for (pos, seg) in proj.iter().enumerate() {
                if !self.targets.contains(&seg) {
                    continue;
                }
                left.insert(
                    pos.checked_sub(1)
                        .map(|prev| Context::Segment(proj[prev]))
                        .unwrap_or(Context::LeftBoundary),
                );
                right.insert(
                    proj.get(pos + 1)
                        .map(Context::Segment)
                        .unwrap_or(Context::RightBoundary),
                );
            }
        }
        (left, right)
    }

    /// A candidate rule, with defaults from its majority under-extension.
    fn candidate(
        &mut self,
        contexts: ContextSpec,
        direction: Direction,
        tier: &Option<Tier>,
        harmony: bool,
    ) -> Result<Rule, TrainError> {
        let builder = Rule::builder(
            self.targets.iter().copied(),
            self.discrepancy.features().iter().cloned(),
        )
        .tier(tier.clone())
        .harmony(harmony);
        let builder = match direction {
            Direction::LeftToRight => builder.left(contexts),
            Direction::RightToLeft => builder.right(contexts),
        };
        let rule = builder.clone().build(self.inventory)?;
        let rule = match rule.majority_defaults(self.inventory, self.pairs) {
            Some(defaults) => builder.defaults(defaults).build(self.inventory)?,
            None => rule,
        };
        self.stats.increment(Statistics::CANDIDATES_EVALUATED);
        trace!(rule = %rule.render(self.inventory), "candidate");
        Ok(rule)
    }

    /// Swap the explicit context set for the tier's own membership when that
    /// is at least as accurate.
    fn widen(&self, rule: Rule, tier: Option<&Tier>) -> Result<Rule, TrainError> {
        let Some(tier) = tier.filter(|_| self.config.widen_contexts) else {
            return Ok(rule);
        };
        let widened: ContextSpec = match tier.spec() {
            TierSpec::Class(class) if !tier.is_delset() => class.clone().into(),
            _ => ContextSpec::explicit(tier.members(self.inventory)),
        };
        let builder = rule.to_builder();
        let candidate = match rule.direction() {
            Direction::LeftToRight => builder.left(widened),
            Direction::RightToLeft => builder.right(widened),
        }
        .build(self.inventory)?;
        let accuracy = candidate.accuracy(self.inventory, self.pairs);
        if accuracy >= rule.accuracy(self.inventory, self.pairs) {
            debug!(rule = %candidate.render(self.inventory), "widened contexts to the tier");
            Ok(candidate)
        } else {
            Ok(rule)
        }
    }

    fn render_tier(&self, tier: Option<&Tier>) -> String {
        tier.map(|tier| tier.render(self.inventory)).unwrap_or_else(|| "none".to_string())
    }
}

/// The smallest natural class containing every delset member and no target.
///
/// Conjunctions of the delset's shared features are tried by increasing size
/// up to `max_literals`; within a size the smallest extension wins, then the
/// smallest rendering. Falls back to the full shared-feature class.
fn covering_class(
    inventory: &SegmentInventory,
    delset: &BTreeSet<SegmentId>,
    targets: &BTreeSet<SegmentId>,
    max_literals: usize,
) -> Option<NaturalClass> {
    let literals: Vec<SignedFeature> =
        inventory.feature_intersection(delset.iter().copied(), true).into_iter().collect();
    let excludes_targets =
        |class: &NaturalClass| !inventory.extension(class).iter().any(|id| targets.contains(id));

    for size in 1..=max_literals.min(literals.len()) {
        let best = combinations(&literals, size)
            .into_iter()
            .map(NaturalClass::new)
            .filter(|class| excludes_targets(class))
            .map(|class| (inventory.extension(&class).len(), class.to_string(), class))
            .min_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        if let Some((_, _, class)) = best {
            return Some(class);
        }
    }

    let full = NaturalClass::new(literals);
    (!full.is_empty() && excludes_targets(&full)).then_some(full)
}

/// The tier that hides `class`: its sign-flipped class when that picks out
/// exactly the complement, otherwise `class` read as a delset.
fn refine_tier(inventory: &SegmentInventory, class: NaturalClass) -> Tier {
    let flipped = class.flipped();
    if inventory.extension(&flipped) == inventory.extension_complement(&class) {
        Tier::from_class(flipped)
    } else {
        Tier::from_class(class).into_delset()
    }
}

/// All `k`-element subsets of `items`, in lexicographic index order.
fn combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut idxs: Vec<usize> = (0..k).collect();
    loop {
        out.push(idxs.iter().map(|&i| items[i].clone()).collect());
        let Some(pos) = (0..k).rev().find(|&i| idxs[i] != i + n - k) else {
            return out;
        };
        idxs[pos] += 1;
        for j in pos + 1..k {
            idxs[j] = idxs[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{combinations, covering_class, refine_tier, Learner, TrainError};
    use crate::config::{LearnerConfig, Statistics};
    use crate::data::SegmentInventory;
    use std::collections::BTreeSet;

    fn learner() -> Learner {
        Learner::new(SegmentInventory::bundled().expect("bundled table"), LearnerConfig::default())
    }

    #[test]
    fn combinations_enumerate_subsets() {
        let items = ['a', 'b', 'c', 'd'];
        assert_eq!(combinations(&items, 1).len(), 4);
        assert_eq!(combinations(&items, 2).len(), 6);
        assert_eq!(combinations(&items, 4), vec![vec!['a', 'b', 'c', 'd']]);
        assert!(combinations(&items, 5).is_empty());
        assert_eq!(combinations(&items, 2)[0], vec!['a', 'b']);
    }

    #[test]
    fn covering_class_prefers_small_conjunctions() {
        let mut inv = SegmentInventory::bundled().expect("bundled table");
        let ids = inv
            .add_segments(["a", "i", "o", "u", "k", "s", "ʃ", "t", "n"])
            .expect("segments");
        let delset: BTreeSet<_> = ids[..4].iter().copied().collect();
        let targets: BTreeSet<_> = [ids[5]].into_iter().collect();
        let class = covering_class(&inv, &delset, &targets, 3).expect("class");
        assert_eq!(class.to_string(), "[+syl]");
        let tier = refine_tier(&inv, class);
        assert_eq!(tier.render(&inv), "[-syl]");

        let everything: BTreeSet<_> = ids.iter().copied().collect();
        assert!(covering_class(&inv, &everything, &targets, 3).is_none());
    }

    #[test]
    fn unclean_complements_refine_to_a_delset() {
        let mut inv = SegmentInventory::bundled().expect("bundled table");
        let ids = inv.add_segments(["t", "d", "k", "o", "e"]).expect("segments");
        let delset: BTreeSet<_> = ids[..2].iter().copied().collect();
        let targets: BTreeSet<_> = [ids[3]].into_iter().collect();
        let class = covering_class(&inv, &delset, &targets, 3).expect("class");
        assert_eq!(class.to_string(), "[+ant]");
        let tier = refine_tier(&inv, class);
        assert!(tier.is_delset());
        assert_eq!(tier.render(&inv), "¬[+ant]");
        assert_eq!(inv.render_set(&tier.members(&inv)), "{e,k,o}");
    }

    #[test]
    fn training_pairs_are_kept_in_symbol_order() {
        let mut learner = learner();
        learner.train([("t a", "t a"), ("a t", "a t"), ("t a", "t a")]).expect("train");
        let inv = learner.inventory();
        let urs: Vec<String> =
            learner.training_pairs().iter().map(|(ur, _)| inv.render(ur)).collect();
        assert_eq!(urs, ["a t", "t a"]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut learner = learner();
        let err = learner.train([("a t a", "a t")]).map(|_| ()).expect_err("length");
        assert!(matches!(err, TrainError::LengthMismatch { ur_len: 3, sr_len: 2, .. }));
        assert!(learner.rule().is_none());
    }

    #[test]
    fn inconsistent_discrepancies_are_rejected() {
        let mut learner = learner();
        let err = learner
            .train([("a t", "a d"), ("i", "e")])
            .map(|_| ())
            .expect_err("two discrepancies");
        assert!(matches!(err, TrainError::InconsistentDiscrepancy { .. }));
    }

    #[test]
    fn identical_pairs_need_no_rule() {
        let mut learner = learner();
        learner.train([("a t a", "a t a"), ("t a", "t a")]).expect("train");
        assert!(learner.rule().is_none());
        assert!(learner.discrepancy().is_none());
        assert_eq!(learner.render_rule(), "None");
        assert_eq!(learner.produce_symbols("t a t").expect("produce"), "t a t");
        assert_eq!(learner.stats().count(Statistics::PAIRS), 2);
    }

    #[test]
    fn abstract_urs_are_synthesized() {
        let mut learner = learner();
        learner.train([("a S", "a s"), ("i S", "i ʃ")]).expect("train");
        let inv = learner.inventory();
        let abstract_s = inv.lookup("S").expect("synthesized");
        assert_eq!(inv.value(abstract_s, "ant").expect("ant").to_string(), "0");
        assert_eq!(inv.value(abstract_s, "strid").expect("strid").to_string(), "+");
        assert_eq!(learner.stats().count(Statistics::ABSTRACT_SEGMENTS), 1);
    }
}
