use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::FeatureValue;

/// Identifier for a segment registered in a [`SegmentInventory`].
///
/// Within one inventory a symbol is registered exactly once, so two ids are
/// equal iff their symbols are equal.
///
/// [`SegmentInventory`]: super::SegmentInventory
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub(crate) u32);

impl SegmentId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A phonological segment: a display symbol plus a value for every feature in
/// the owning inventory's feature space.
///
/// Identity is the symbol alone. Feature values may be edited after
/// construction, but equality, hashing and ordering never look at them.
#[derive(Clone, Debug)]
pub struct Segment {
    symbol: String,
    features: Vec<FeatureValue>,
}

impl Segment {
    pub fn new(symbol: impl Into<String>, features: Vec<FeatureValue>) -> Self {
        Self { symbol: symbol.into(), features }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Feature values in feature-space order.
    pub fn values(&self) -> &[FeatureValue] {
        &self.features
    }

    pub fn value(&self, feature_idx: usize) -> Option<FeatureValue> {
        self.features.get(feature_idx).copied()
    }

    pub(crate) fn set_value(&mut self, feature_idx: usize, value: FeatureValue) {
        if let Some(slot) = self.features.get_mut(feature_idx) {
            *slot = value;
        }
    }

    pub(crate) fn extend_values(&mut self, values: impl IntoIterator<Item = FeatureValue>) {
        self.features.extend(values);
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::Segment;
    use crate::data::FeatureValue::{Minus, Plus, Underspecified};
    use std::collections::HashSet;

    #[test]
    fn identity_is_the_symbol() {
        let a = Segment::new("i", vec![Plus, Plus, Underspecified]);
        let b = Segment::new("i", vec![Minus, Minus, Minus]);
        let c = Segment::new("iː", vec![Plus, Plus, Underspecified]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn values_can_be_edited() {
        let mut seg = Segment::new("i", vec![Minus, Plus]);
        seg.set_value(0, Plus);
        assert_eq!(seg.value(0), Some(Plus));
        assert!(seg.value(5).is_none());
        assert!(Segment::new("a", vec![]) < Segment::new("b", vec![]));
    }
}
