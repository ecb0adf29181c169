use std::collections::BTreeSet;
use std::fmt;

use super::{FeatureSpace, Segment, SegmentId, SegmentInventory, SignedFeature};
use crate::parser::ParseError;

/// A natural class: the conjunction of a set of signed feature literals.
///
/// A segment belongs to the class iff its value for every literal's feature
/// equals the literal's sign. Literals naming a feature outside the feature
/// space never match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalClass {
    literals: BTreeSet<SignedFeature>,
}

impl NaturalClass {
    pub fn new(literals: impl IntoIterator<Item = SignedFeature>) -> Self {
        Self { literals: literals.into_iter().collect() }
    }

    /// Build a class from textual literals such as `["+syl", "-cons"]`.
    pub fn parse<I, S>(literals: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        literals
            .into_iter()
            .map(|lit| lit.as_ref().parse::<SignedFeature>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map(|literals| Self { literals })
    }

    pub fn literals(&self) -> &BTreeSet<SignedFeature> {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// The class with every literal's sign flipped (`[+syl]` becomes `[-syl]`).
    pub fn flipped(&self) -> Self {
        Self::new(self.literals.iter().map(SignedFeature::flipped))
    }

    pub fn matches(&self, segment: &Segment, space: &FeatureSpace) -> bool {
        self.literals.iter().all(|lit| {
            space
                .index_of(&lit.feature)
                .and_then(|idx| segment.value(idx))
                .is_some_and(|value| value == lit.value)
        })
    }

    pub fn contains(&self, inventory: &SegmentInventory, id: SegmentId) -> bool {
        inventory
            .get(id)
            .is_some_and(|segment| self.matches(segment, inventory.feature_space()))
    }

    pub fn extension(&self, inventory: &SegmentInventory) -> BTreeSet<SegmentId> {
        inventory.extension(self)
    }

    pub fn extension_complement(&self, inventory: &SegmentInventory) -> BTreeSet<SegmentId> {
        inventory.extension_complement(self)
    }
}

impl fmt::Display for NaturalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.literals.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", rendered.join(","))
    }
}

impl FromIterator<SignedFeature> for NaturalClass {
    fn from_iter<T: IntoIterator<Item = SignedFeature>>(iter: T) -> Self {
        Self::new(iter)
    }
}
