//! Harmony and disharmony rules.
//!
//! A rule rewrites every target segment by copying the alternating features
//! from its adjacent context (or their opposites, for disharmony). Contexts are
//! read one-sidedly: a left-context rule scans left to right and a
//! right-context rule scans right to left. Each rewrite is written back into
//! the working projection before the scan moves on, so one pass spreads a
//! value across a whole run of targets.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use super::tier::{Projection, Tier};
use crate::data::symbols::{FUNCTION_COMPOSITION, LWB, RWB};
use crate::data::{FeatureValue, NaturalClass, SegmentId, SegmentInventory, SegmentSequence};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("a rule cannot have both left and right contexts")]
    BothContexts,
    #[error("a rule needs either left or right contexts")]
    NoContext,
    #[error(
        "defaults must give one value per alternating feature (missing: {}; extra: {})",
        .missing.join(","),
        .extra.join(",")
    )]
    DefaultsMismatch { missing: Vec<String>, extra: Vec<String> },
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
}

/// The neighbour a target is read against: a segment, or a word edge when
/// the target has no neighbour in the scan direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Context {
    Segment(SegmentId),
    LeftBoundary,
    RightBoundary,
}

impl Context {
    pub fn segment(self) -> Option<SegmentId> {
        match self {
            Context::Segment(id) => Some(id),
            Context::LeftBoundary | Context::RightBoundary => None,
        }
    }

    pub fn is_boundary(self) -> bool {
        self.segment().is_none()
    }

    /// Value of the feature at `idx`; boundaries are underspecified for all.
    fn value(self, inventory: &SegmentInventory, idx: usize) -> FeatureValue {
        self.segment()
            .and_then(|id| inventory.get(id))
            .and_then(|seg| seg.value(idx))
            .unwrap_or(FeatureValue::Underspecified)
    }

    pub fn render<'a>(&self, inventory: &'a SegmentInventory) -> &'a str {
        match self {
            Context::Segment(id) => inventory.symbol(*id),
            Context::LeftBoundary => LWB,
            Context::RightBoundary => RWB,
        }
    }
}

impl From<SegmentId> for Context {
    fn from(id: SegmentId) -> Self {
        Context::Segment(id)
    }
}

/// The set of contexts that trigger a rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextSpec {
    Explicit(BTreeSet<Context>),
    Class(NaturalClass),
}

impl ContextSpec {
    pub fn explicit<I, C>(contexts: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Context>,
    {
        ContextSpec::Explicit(contexts.into_iter().map(Into::into).collect())
    }

    /// Boundaries never belong to a natural class.
    pub fn contains(&self, inventory: &SegmentInventory, context: Context) -> bool {
        match self {
            ContextSpec::Explicit(set) => set.contains(&context),
            ContextSpec::Class(class) => {
                context.segment().is_some_and(|id| class.contains(inventory, id))
            }
        }
    }

    pub fn render(&self, inventory: &SegmentInventory) -> String {
        match self {
            ContextSpec::Class(class) => class.to_string(),
            ContextSpec::Explicit(set) => {
                let symbols: BTreeSet<&str> = set.iter().map(|ctx| ctx.render(inventory)).collect();
                format!("{{{}}}", symbols.into_iter().collect::<Vec<_>>().join(","))
            }
        }
    }
}

impl From<NaturalClass> for ContextSpec {
    fn from(class: NaturalClass) -> Self {
        ContextSpec::Class(class)
    }
}

impl From<BTreeSet<Context>> for ContextSpec {
    fn from(set: BTreeSet<Context>) -> Self {
        ContextSpec::Explicit(set)
    }
}

impl From<BTreeSet<SegmentId>> for ContextSpec {
    fn from(set: BTreeSet<SegmentId>) -> Self {
        ContextSpec::explicit(set)
    }
}

/// Scan direction, fixed by which side the context is on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left context; scans left to right.
    LeftToRight,
    /// Right context; scans right to left.
    RightToLeft,
}

/// One rewrite decision made while applying a rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Prediction {
    /// Position in the original (unprojected) sequence.
    pub index: usize,
    pub segment: SegmentId,
    pub context: Context,
    /// Whether the context matched; otherwise defaults (if any) applied.
    pub triggered: bool,
}

/// Full feature vector to segment, built once per application.
type VectorIndex<'a> = HashMap<&'a [FeatureValue], SegmentId>;

/// A single harmony or disharmony rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    target: BTreeSet<SegmentId>,
    features: BTreeSet<String>,
    feature_idxs: Vec<usize>,
    context: ContextSpec,
    direction: Direction,
    tier: Option<Tier>,
    defaults: Option<BTreeMap<String, FeatureValue>>,
    default_values: Vec<FeatureValue>,
    harmony: bool,
}

/// Builder for [`Rule`].
#[derive(Clone, Debug)]
pub struct RuleBuilder {
    target: BTreeSet<SegmentId>,
    features: BTreeSet<String>,
    left: Option<ContextSpec>,
    right: Option<ContextSpec>,
    tier: Option<Tier>,
    defaults: Option<BTreeMap<String, FeatureValue>>,
    harmony: bool,
}

impl RuleBuilder {
    pub fn left(mut self, contexts: impl Into<ContextSpec>) -> Self {
        self.left = Some(contexts.into());
        self
    }

    pub fn right(mut self, contexts: impl Into<ContextSpec>) -> Self {
        self.right = Some(contexts.into());
        self
    }

    pub fn tier(mut self, tier: impl Into<Option<Tier>>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn defaults(mut self, defaults: impl Into<Option<BTreeMap<String, FeatureValue>>>) -> Self {
        self.defaults = defaults.into();
        self
    }

    pub fn harmony(mut self, harmony: bool) -> Self {
        self.harmony = harmony;
        self
    }

    /// Validate against `inventory`'s feature space and build the rule.
    pub fn build(self, inventory: &SegmentInventory) -> Result<Rule, RuleError> {
        let (context, direction) = match (self.left, self.right) {
            (Some(_), Some(_)) => return Err(RuleError::BothContexts),
            (None, None) => return Err(RuleError::NoContext),
            (Some(left), None) => (left, Direction::LeftToRight),
            (None, Some(right)) => (right, Direction::RightToLeft),
        };

        let feature_idxs = self
            .features
            .iter()
            .map(|name| {
                inventory
                    .feature_space()
                    .index_of(name)
                    .ok_or_else(|| RuleError::UnknownFeature(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let default_values = match &self.defaults {
            None => Vec::new(),
            Some(defaults) => {
                let missing: Vec<String> =
                    self.features.iter().filter(|f| !defaults.contains_key(*f)).cloned().collect();
                let extra: Vec<String> =
                    defaults.keys().filter(|f| !self.features.contains(*f)).cloned().collect();
                if !missing.is_empty() || !extra.is_empty() {
                    return Err(RuleError::DefaultsMismatch { missing, extra });
                }
                defaults.values().copied().collect()
            }
        };

        Ok(Rule {
            target: self.target,
            features: self.features,
            feature_idxs,
            context,
            direction,
            tier: self.tier,
            defaults: self.defaults,
            default_values,
            harmony: self.harmony,
        })
    }
}

impl Rule {
    /// Start a harmony rule rewriting `target` on `features`.
    pub fn builder<T, F, S>(target: T, features: F) -> RuleBuilder
    where
        T: IntoIterator<Item = SegmentId>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RuleBuilder {
            target: target.into_iter().collect(),
            features: features.into_iter().map(Into::into).collect(),
            left: None,
            right: None,
            tier: None,
            defaults: None,
            harmony: true,
        }
    }

    /// A builder pre-loaded with this rule's configuration.
    pub fn to_builder(&self) -> RuleBuilder {
        let (left, right) = match self.direction {
            Direction::LeftToRight => (Some(self.context.clone()), None),
            Direction::RightToLeft => (None, Some(self.context.clone())),
        };
        RuleBuilder {
            target: self.target.clone(),
            features: self.features.clone(),
            left,
            right,
            tier: self.tier.clone(),
            defaults: self.defaults.clone(),
            harmony: self.harmony,
        }
    }

    pub fn target(&self) -> &BTreeSet<SegmentId> {
        &self.target
    }

    pub fn features(&self) -> &BTreeSet<String> {
        &self.features
    }

    pub fn context(&self) -> &ContextSpec {
        &self.context
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn tier(&self) -> Option<&Tier> {
        self.tier.as_ref()
    }

    pub fn defaults(&self) -> Option<&BTreeMap<String, FeatureValue>> {
        self.defaults.as_ref()
    }

    pub fn is_harmony(&self) -> bool {
        self.harmony
    }

    /// Apply the rule to `ur`.
    pub fn produce(&self, inventory: &SegmentInventory, ur: &SegmentSequence) -> SegmentSequence {
        let mut out = ur.clone();
        for (idx, seg) in self.predictions(inventory, ur) {
            if let Some(slot) = out.as_mut_slice().get_mut(idx) {
                *slot = seg;
            }
        }
        out
    }

    /// `(original index, new segment)` for every target the rule visits.
    pub fn predictions(
        &self,
        inventory: &SegmentInventory,
        seq: &SegmentSequence,
    ) -> Vec<(usize, SegmentId)> {
        self.trace(inventory, seq).into_iter().map(|p| (p.index, p.segment)).collect()
    }

    /// Every rewrite decision, with the context that drove it.
    pub fn trace(&self, inventory: &SegmentInventory, seq: &SegmentSequence) -> Vec<Prediction> {
        let index = inventory.vector_index();
        self.trace_with(inventory, &index, seq)
    }

    fn trace_with(
        &self,
        inventory: &SegmentInventory,
        vectors: &VectorIndex<'_>,
        seq: &SegmentSequence,
    ) -> Vec<Prediction> {
        let mut proj = match &self.tier {
            Some(tier) => tier.project(inventory, seq),
            None => Projection::identity(seq),
        };
        let order: Vec<usize> = match self.direction {
            Direction::LeftToRight => (0..proj.len()).collect(),
            Direction::RightToLeft => (0..proj.len()).rev().collect(),
        };

        let mut preds = Vec::new();
        for pos in order {
            let seg = proj[pos];
            if !self.target.contains(&seg) {
                continue;
            }
            let context = match self.direction {
                Direction::LeftToRight => pos
                    .checked_sub(1)
                    .map(|prev| Context::Segment(proj[prev]))
                    .unwrap_or(Context::LeftBoundary),
                Direction::RightToLeft => {
                    proj.get(pos + 1).map(Context::Segment).unwrap_or(Context::RightBoundary)
                }
            };
            let triggered = self.context.contains(inventory, context);
            let new_seg = if triggered {
                self.assimilate(inventory, vectors, seg, context)
            } else if self.defaults.is_some() {
                self.apply_defaults(inventory, vectors, seg)
            } else {
                seg
            };
            preds.push(Prediction {
                index: proj.original_index(pos).unwrap_or(pos),
                segment: new_seg,
                context,
                triggered,
            });
            proj.set(pos, new_seg);
        }
        preds
    }

    fn assimilate(
        &self,
        inventory: &SegmentInventory,
        vectors: &VectorIndex<'_>,
        seg: SegmentId,
        context: Context,
    ) -> SegmentId {
        let values = self.feature_idxs.iter().map(|&idx| {
            let value = context.value(inventory, idx);
            if self.harmony {
                value
            } else {
                value.flipped()
            }
        });
        Self::rewrite(inventory, vectors, seg, self.feature_idxs.iter().copied().zip(values))
    }

    fn apply_defaults(
        &self,
        inventory: &SegmentInventory,
        vectors: &VectorIndex<'_>,
        seg: SegmentId,
    ) -> SegmentId {
        let values = self.default_values.iter().copied();
        Self::rewrite(inventory, vectors, seg, self.feature_idxs.iter().copied().zip(values))
    }

    /// The segment whose vector is `seg`'s with `changes` applied, or `seg`
    /// itself when no realised segment has that vector.
    fn rewrite(
        inventory: &SegmentInventory,
        vectors: &VectorIndex<'_>,
        seg: SegmentId,
        changes: impl Iterator<Item = (usize, FeatureValue)>,
    ) -> SegmentId {
        let Some(segment) = inventory.get(seg) else {
            return seg;
        };
        let mut values = segment.values().to_vec();
        for (idx, value) in changes {
            if let Some(slot) = values.get_mut(idx) {
                *slot = value;
            }
        }
        vectors.get(values.as_slice()).copied().unwrap_or(seg)
    }

    fn unique_pairs<'a, I>(pairs: I) -> BTreeSet<&'a (SegmentSequence, SegmentSequence)>
    where
        I: IntoIterator<Item = &'a (SegmentSequence, SegmentSequence)>,
    {
        pairs.into_iter().collect()
    }

    /// Scope `n` and correct count `m` over the unique pairs.
    pub fn tsp_stats<'a, I>(&self, inventory: &SegmentInventory, pairs: I) -> (usize, usize)
    where
        I: IntoIterator<Item = &'a (SegmentSequence, SegmentSequence)>,
    {
        let vectors = inventory.vector_index();
        let (mut n, mut m) = (0, 0);
        for (ur, sr) in Self::unique_pairs(pairs) {
            for pred in self.trace_with(inventory, &vectors, ur) {
                n += 1;
                if sr.get(pred.index) == Some(pred.segment) {
                    m += 1;
                }
            }
        }
        (n, m)
    }

    /// `m / n`, or `0.0` when the rule never applies.
    pub fn accuracy<'a, I>(&self, inventory: &SegmentInventory, pairs: I) -> f64
    where
        I: IntoIterator<Item = &'a (SegmentSequence, SegmentSequence)>,
    {
        match self.tsp_stats(inventory, pairs) {
            (0, _) => 0.0,
            (n, m) => m as f64 / n as f64,
        }
    }

    /// Surface realisations of targets the rule left unchanged but should
    /// have rewritten, with counts.
    pub fn underextension_srs<'a, I>(
        &self,
        inventory: &SegmentInventory,
        pairs: I,
    ) -> BTreeMap<SegmentId, usize>
    where
        I: IntoIterator<Item = &'a (SegmentSequence, SegmentSequence)>,
    {
        let vectors = inventory.vector_index();
        let mut tally = BTreeMap::new();
        for (ur, sr) in Self::unique_pairs(pairs) {
            for pred in self.trace_with(inventory, &vectors, ur) {
                let Some(actual) = sr.get(pred.index) else { continue };
                if self.target.contains(&pred.segment) && actual != pred.segment {
                    *tally.entry(actual).or_insert(0) += 1;
                }
            }
        }
        tally
    }

    /// Contexts that matched the rule yet produced a wrong surface segment.
    pub fn errant_contexts<'a, I>(
        &self,
        inventory: &SegmentInventory,
        pairs: I,
    ) -> BTreeSet<Context>
    where
        I: IntoIterator<Item = &'a (SegmentSequence, SegmentSequence)>,
    {
        let vectors = inventory.vector_index();
        let mut errant = BTreeSet::new();
        for (ur, sr) in Self::unique_pairs(pairs) {
            for pred in self.trace_with(inventory, &vectors, ur) {
                if pred.triggered && sr.get(pred.index) != Some(pred.segment) {
                    errant.insert(pred.context);
                }
            }
        }
        errant
    }

    /// Defaults taken from the majority under-extended realisation; ties go
    /// to the smallest symbol. `None` when nothing is under-extended.
    pub fn majority_defaults<'a, I>(
        &self,
        inventory: &SegmentInventory,
        pairs: I,
    ) -> Option<BTreeMap<String, FeatureValue>>
    where
        I: IntoIterator<Item = &'a (SegmentSequence, SegmentSequence)>,
    {
        let tally = self.underextension_srs(inventory, pairs);
        let (winner, _) = tally.into_iter().max_by(|(a, a_count), (b, b_count)| {
            a_count.cmp(b_count).then_with(|| inventory.symbol(*b).cmp(inventory.symbol(*a)))
        })?;
        let segment = inventory.get(winner)?;
        Some(
            self.features
                .iter()
                .zip(&self.feature_idxs)
                .map(|(name, &idx)| {
                    (name.clone(), segment.value(idx).unwrap_or(FeatureValue::Underspecified))
                })
                .collect(),
        )
    }

    /// Canonical rendering, e.g. `Agree({S},{ant,distr}) / [+strid] __ ∘ proj([+strid])`.
    pub fn render(&self, inventory: &SegmentInventory) -> String {
        let head = if self.harmony { "Agree" } else { "Disagree" };
        let features = self.features.iter().cloned().collect::<Vec<_>>().join(",");
        let adj = format!("{}({},{{{}}})", head, inventory.render_set(&self.target), features);
        let tier = self
            .tier
            .as_ref()
            .map(|tier| format!(" {} proj({})", FUNCTION_COMPOSITION, tier.render(inventory)))
            .unwrap_or_default();
        let context = self.context.render(inventory);
        match self.direction {
            Direction::LeftToRight => format!("{} / {} __{}", adj, context, tier),
            Direction::RightToLeft => format!("{} / __ {}{}", adj, context, tier),
        }
    }
}
