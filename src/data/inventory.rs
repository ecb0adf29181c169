//! The segment inventory: the universe of segments realised in one modelling
//! session.
//!
//! An inventory owns the feature space and the base feature table it was
//! created from. Segments are materialised lazily from the table the first
//! time their symbol is seen, and abstract (custom) segments can be added with
//! an explicit feature bundle. The inventory only grows.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;
use tracing::debug;

use super::symbols::{BOUNDARY_FEATURES, BOUNDARY_SEGMENTS};
use super::{
    FeatureSpace, FeatureValue, NaturalClass, Segment, SegmentId, SegmentSequence, SignedFeature,
};
use crate::parser::{FeatureTable, ParseError};

/// Errors raised while registering or looking up segments.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error(
        "segment `{symbol}` is neither in the inventory nor in the feature table \
         from {source_name}"
    )]
    UnknownSegment { symbol: String, source_name: String },
    #[error("the symbol \"{symbol}\" is already a symbol in the feature table from {source_name}")]
    SymbolCollision { symbol: String, source_name: String },
    #[error("the features do not match those in the feature space")]
    FeatureSpaceMismatch,
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
}

/// Segments realised so far, indexed by symbol, over a fixed feature space.
#[derive(Clone, Debug)]
pub struct SegmentInventory {
    source_name: String,
    space: FeatureSpace,
    base: HashMap<String, Vec<FeatureValue>>,
    segments: Vec<Segment>,
    by_symbol: HashMap<String, SegmentId>,
}

impl SegmentInventory {
    /// Create an empty inventory over the given base feature table.
    pub fn new(table: FeatureTable) -> Self {
        let (source_name, space, base) = table.into_parts();
        Self { source_name, space, base, segments: Vec::new(), by_symbol: HashMap::new() }
    }

    /// Create an empty inventory over the feature table bundled with the crate.
    pub fn bundled() -> Result<Self, ParseError> {
        FeatureTable::bundled().map(Self::new)
    }

    /// Extend the feature space with boundary features and register the
    /// boundary segments `⋊ ⋉ . +`.
    pub fn with_boundary_symbols(mut self) -> Result<Self, InventoryError> {
        for (symbol, _) in BOUNDARY_SEGMENTS {
            if self.base.contains_key(symbol) {
                return Err(InventoryError::SymbolCollision {
                    symbol: symbol.to_string(),
                    source_name: self.source_name.clone(),
                });
            }
        }
        let added: Vec<&str> =
            BOUNDARY_FEATURES.iter().copied().filter(|f| !self.space.contains(f)).collect();
        for feature in &added {
            self.space.push(*feature);
        }
        let padding = || std::iter::repeat(FeatureValue::Minus).take(added.len());
        for values in self.base.values_mut() {
            values.extend(padding());
        }
        for segment in &mut self.segments {
            segment.extend_values(padding());
        }

        for (symbol, own_feature) in BOUNDARY_SEGMENTS {
            let features: Vec<(String, FeatureValue)> = self
                .space
                .iter()
                .map(|feature| {
                    let value = if feature == "B" || feature == own_feature {
                        FeatureValue::Plus
                    } else if BOUNDARY_FEATURES.contains(&feature) {
                        FeatureValue::Minus
                    } else {
                        FeatureValue::Underspecified
                    };
                    (feature.to_string(), value)
                })
                .collect();
            self.add_custom(symbol, features)?;
        }
        Ok(self)
    }

    /// Human-readable description of where the base feature table came from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Ids of every realised segment, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.segments.len() as u32).map(SegmentId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments.iter().enumerate().map(|(idx, seg)| (SegmentId(idx as u32), seg))
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    /// Symbol for `id`, or `?` for an id minted by another inventory.
    pub fn symbol(&self, id: SegmentId) -> &str {
        self.get(id).map(Segment::symbol).unwrap_or("?")
    }

    pub fn lookup(&self, symbol: &str) -> Option<SegmentId> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    /// Whether `symbol` has a row in the base feature table.
    pub fn in_base_table(&self, symbol: &str) -> bool {
        self.base.contains_key(symbol)
    }

    /// Value of `feature` for segment `id`.
    pub fn value(&self, id: SegmentId, feature: &str) -> Result<FeatureValue, InventoryError> {
        let idx = self.feature_index(feature)?;
        Ok(self.get(id).and_then(|seg| seg.value(idx)).unwrap_or(FeatureValue::Underspecified))
    }

    /// Return the segment for `symbol`, materialising it from the base
    /// feature table on first use.
    pub fn get_or_add(&mut self, symbol: &str) -> Result<SegmentId, InventoryError> {
        if let Some(id) = self.lookup(symbol) {
            return Ok(id);
        }
        let values = self.base.get(symbol).cloned().ok_or_else(|| InventoryError::UnknownSegment {
            symbol: symbol.to_string(),
            source_name: self.source_name.clone(),
        })?;
        Ok(self.insert(Segment::new(symbol, values)))
    }

    pub fn add_segments<I, S>(&mut self, symbols: I) -> Result<Vec<SegmentId>, InventoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        symbols.into_iter().map(|symbol| self.get_or_add(symbol.as_ref())).collect()
    }

    /// Register every symbol in a space-separated string.
    pub fn add_segments_by_str(&mut self, text: &str) -> Result<Vec<SegmentId>, InventoryError> {
        self.add_segments(text.split_whitespace())
    }

    /// Register an abstract segment with a full feature bundle.
    ///
    /// Fails without touching the inventory if `symbol` is a base-table symbol
    /// or if the feature names are not exactly the feature space. Re-adding a
    /// custom symbol replaces its features and keeps its id.
    pub fn add_custom<I, S>(
        &mut self,
        symbol: &str,
        features: I,
    ) -> Result<SegmentId, InventoryError>
    where
        I: IntoIterator<Item = (S, FeatureValue)>,
        S: AsRef<str>,
    {
        if self.base.contains_key(symbol) {
            return Err(InventoryError::SymbolCollision {
                symbol: symbol.to_string(),
                source_name: self.source_name.clone(),
            });
        }
        let given: HashMap<String, FeatureValue> =
            features.into_iter().map(|(name, value)| (name.as_ref().to_string(), value)).collect();
        if given.len() != self.space.len() {
            return Err(InventoryError::FeatureSpaceMismatch);
        }
        let values = self
            .space
            .iter()
            .map(|name| given.get(name).copied())
            .collect::<Option<Vec<_>>>()
            .ok_or(InventoryError::FeatureSpaceMismatch)?;

        debug!(symbol, "registering custom segment");
        if let Some(id) = self.lookup(symbol) {
            self.segments[id.index()] = Segment::new(symbol, values);
            return Ok(id);
        }
        Ok(self.insert(Segment::new(symbol, values)))
    }

    /// Edit one feature value of an already-realised segment.
    pub fn set_feature(
        &mut self,
        symbol: &str,
        feature: &str,
        value: FeatureValue,
    ) -> Result<(), InventoryError> {
        let idx = self.feature_index(feature)?;
        let id = self.lookup(symbol).ok_or_else(|| InventoryError::UnknownSegment {
            symbol: symbol.to_string(),
            source_name: self.source_name.clone(),
        })?;
        self.segments[id.index()].set_value(idx, value);
        Ok(())
    }

    /// Realised segments belonging to `class`.
    pub fn extension(&self, class: &NaturalClass) -> BTreeSet<SegmentId> {
        self.iter().filter(|(_, seg)| class.matches(seg, &self.space)).map(|(id, _)| id).collect()
    }

    /// Realised segments not belonging to `class`. Boundary segments are
    /// never part of a complement.
    pub fn extension_complement(&self, class: &NaturalClass) -> BTreeSet<SegmentId> {
        self.iter()
            .filter(|&(id, seg)| !class.matches(seg, &self.space) && !self.is_boundary(id))
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether `id` is one of the boundary segments registered by
    /// [`SegmentInventory::with_boundary_symbols`].
    pub fn is_boundary(&self, id: SegmentId) -> bool {
        self.space
            .index_of("B")
            .and_then(|idx| self.get(id)?.value(idx))
            .is_some_and(|value| value == FeatureValue::Plus)
    }

    /// Signed features shared by every segment in `ids`.
    ///
    /// With `exclude_underspecified`, features some member leaves
    /// underspecified are dropped. An empty input shares nothing.
    pub fn feature_intersection<I>(
        &self,
        ids: I,
        exclude_underspecified: bool,
    ) -> BTreeSet<SignedFeature>
    where
        I: IntoIterator<Item = SegmentId>,
    {
        let mut shared: Option<Vec<Option<FeatureValue>>> = None;
        for id in ids {
            let Some(segment) = self.get(id) else { continue };
            let values = segment.values();
            match shared.as_mut() {
                None => shared = Some(values.iter().copied().map(Some).collect()),
                Some(acc) => {
                    for (slot, value) in acc.iter_mut().zip(values) {
                        if *slot != Some(*value) {
                            *slot = None;
                        }
                    }
                }
            }
        }
        shared
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| {
                let value = value?;
                if exclude_underspecified && !value.is_specified() {
                    return None;
                }
                self.space.name(idx).map(|name| SignedFeature::new(value, name))
            })
            .collect()
    }

    /// Names of the features on which `a` and `b` disagree.
    pub fn feature_diff(&self, a: SegmentId, b: SegmentId) -> BTreeSet<String> {
        let (Some(a), Some(b)) = (self.get(a), self.get(b)) else {
            return BTreeSet::new();
        };
        a.values()
            .iter()
            .zip(b.values())
            .enumerate()
            .filter(|(_, (x, y))| x != y)
            .filter_map(|(idx, _)| self.space.name(idx).map(str::to_string))
            .collect()
    }

    /// Map from full feature vector to segment. When two segments share a
    /// vector the earlier registration wins.
    pub fn vector_index(&self) -> HashMap<&[FeatureValue], SegmentId> {
        let mut index = HashMap::with_capacity(self.segments.len());
        for (id, segment) in self.iter() {
            index.entry(segment.values()).or_insert(id);
        }
        index
    }

    /// Parse a space-separated string into a sequence, registering any unseen
    /// base-table symbols.
    pub fn sequence(&mut self, text: &str) -> Result<SegmentSequence, InventoryError> {
        self.add_segments_by_str(text).map(SegmentSequence::from)
    }

    pub fn sequence_from_symbols<I, S>(
        &mut self,
        symbols: I,
    ) -> Result<SegmentSequence, InventoryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_segments(symbols).map(SegmentSequence::from)
    }

    /// Space-separated symbols of `seq`.
    pub fn render(&self, seq: &SegmentSequence) -> String {
        seq.iter().map(|id| self.symbol(id)).collect::<Vec<_>>().join(" ")
    }

    /// Render a set of segments as `{a,b,c}`, sorted by symbol.
    pub fn render_set<'a, I>(&self, ids: I) -> String
    where
        I: IntoIterator<Item = &'a SegmentId>,
    {
        let symbols: BTreeSet<&str> = ids.into_iter().map(|id| self.symbol(*id)).collect();
        format!("{{{}}}", symbols.into_iter().collect::<Vec<_>>().join(","))
    }

    /// Feature map of a segment keyed by feature name.
    pub fn features(&self, id: SegmentId) -> BTreeMap<String, FeatureValue> {
        self.get(id)
            .map(|seg| {
                self.space
                    .iter()
                    .zip(seg.values())
                    .map(|(name, value)| (name.to_string(), *value))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn feature_index(&self, feature: &str) -> Result<usize, InventoryError> {
        self.space
            .index_of(feature)
            .ok_or_else(|| InventoryError::UnknownFeature(feature.to_string()))
    }

    fn insert(&mut self, segment: Segment) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.by_symbol.insert(segment.symbol().to_string(), id);
        self.segments.push(segment);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{InventoryError, SegmentInventory};
    use crate::data::{FeatureValue, NaturalClass, SignedFeature};
    use std::collections::BTreeSet;

    fn inventory() -> SegmentInventory {
        SegmentInventory::bundled().expect("bundled table")
    }

    fn symbols(inv: &SegmentInventory, ids: &BTreeSet<crate::data::SegmentId>) -> BTreeSet<String> {
        ids.iter().map(|id| inv.symbol(*id).to_string()).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_grows_monotonically() {
        let mut inv = inventory();
        inv.get_or_add("i").expect("i");
        assert_eq!(inv.len(), 1);
        inv.add_segments(["p", "b", "t", "d"]).expect("stops");
        assert_eq!(inv.len(), 5);
        inv.add_segments_by_str("eː n t j ə").expect("string");
        assert_eq!(inv.len(), 9);
        assert!(inv.contains("eː"));
        inv.get_or_add("i").expect("again");
        assert_eq!(inv.len(), 9);
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let mut inv = inventory();
        let err = inv.get_or_add("Q").expect_err("not in table");
        assert!(matches!(err, InventoryError::UnknownSegment { ref symbol, .. } if symbol == "Q"));
        assert!(inv.is_empty());
    }

    #[test]
    fn add_custom_checks_symbol_and_features() {
        let mut inv = inventory();
        let s = inv.get_or_add("s").expect("s");
        let sh = inv.get_or_add("ʃ").expect("ʃ");
        let shared: BTreeSet<String> = inv
            .feature_intersection([s, sh], false)
            .into_iter()
            .map(|lit| lit.feature)
            .collect();
        let features: Vec<(String, FeatureValue)> = inv
            .features(s)
            .into_iter()
            .map(|(name, value)| {
                let value =
                    if shared.contains(&name) { value } else { FeatureValue::Underspecified };
                (name, value)
            })
            .collect();

        let abstract_s = inv.add_custom("S", features.clone()).expect("custom S");
        assert!(inv.contains("S"));
        assert_eq!(inv.value(abstract_s, "ant"), Ok(FeatureValue::Underspecified));
        assert_eq!(inv.value(abstract_s, "strid"), Ok(FeatureValue::Plus));

        let before = inv.len();
        let err = inv.add_custom("V", [("voi", FeatureValue::Plus)]).expect_err("partial");
        assert_eq!(err, InventoryError::FeatureSpaceMismatch);
        assert_eq!(err.to_string(), "the features do not match those in the feature space");
        let err = inv.add_custom("s", features).expect_err("collision");
        assert!(matches!(err, InventoryError::SymbolCollision { .. }));
        assert_eq!(inv.len(), before);
    }

    #[test]
    fn extensions_and_complements() {
        let mut inv = inventory();
        inv.add_segments(["a", "e", "i", "o", "u", "p", "b", "t", "d", "k", "g", "s", "m", "n"])
            .expect("segments");
        let syl = NaturalClass::parse(["+syl"]).expect("class");
        assert_eq!(symbols(&inv, &inv.extension(&syl)), set(&["a", "e", "i", "o", "u"]));
        let voiced = NaturalClass::parse(["-syl", "+voi"]).expect("class");
        assert_eq!(symbols(&inv, &inv.extension(&voiced)), set(&["b", "d", "g", "m", "n"]));
        assert_eq!(
            symbols(&inv, &inv.extension_complement(&voiced)),
            set(&["a", "e", "i", "o", "u", "p", "t", "k", "s"])
        );
    }

    #[test]
    fn intersection_and_diff() {
        let mut inv = inventory();
        let vowels = inv.add_segments(["a", "e", "i", "o", "u"]).expect("vowels");
        let shared = inv.feature_intersection(vowels.iter().copied(), true);
        assert!(shared.contains(&SignedFeature::plus("syl")));
        assert!(shared.contains(&SignedFeature::minus("cons")));
        assert!(!shared.iter().any(|lit| lit.feature == "hi" || lit.feature == "ant"));

        let t = inv.get_or_add("t").expect("t");
        let d = inv.get_or_add("d").expect("d");
        assert_eq!(inv.feature_diff(t, d), set(&["voi"]));
        let i = inv.lookup("i").expect("i");
        let e = inv.lookup("e").expect("e");
        assert_eq!(inv.feature_diff(i, e), set(&["hi"]));
    }

    #[test]
    fn set_feature_edits_in_place() {
        let mut inv = inventory();
        let i = inv.get_or_add("i").expect("i");
        inv.set_feature("i", "syl", FeatureValue::Minus).expect("edit");
        assert_eq!(inv.value(i, "syl"), Ok(FeatureValue::Minus));
        assert!(inv.set_feature("i", "bogus", FeatureValue::Plus).is_err());
        assert!(inv.set_feature("z", "syl", FeatureValue::Plus).is_err());
    }

    #[test]
    fn boundary_symbols_extend_the_space() {
        let mut inv = inventory();
        inv.get_or_add("a").expect("a");
        let inv = inv.with_boundary_symbols().expect("boundaries");
        assert!(inv.feature_space().contains("MORPHB"));
        let lwb = inv.lookup("⋊").expect("left boundary");
        assert_eq!(inv.value(lwb, "B"), Ok(FeatureValue::Plus));
        assert_eq!(inv.value(lwb, "LWB"), Ok(FeatureValue::Plus));
        assert_eq!(inv.value(lwb, "RWB"), Ok(FeatureValue::Minus));
        assert_eq!(inv.value(lwb, "syl"), Ok(FeatureValue::Underspecified));
        let a = inv.lookup("a").expect("a");
        assert_eq!(inv.value(a, "B"), Ok(FeatureValue::Minus));
        assert!(inv.is_boundary(lwb));
        assert!(!inv.is_boundary(a));
    }

    #[test]
    fn complements_leave_out_boundaries() {
        let mut inv = inventory();
        inv.add_segments(["a", "s", "t"]).expect("segments");
        let mut inv = inv.with_boundary_symbols().expect("boundaries");
        inv.get_or_add("ʃ").expect("ʃ");
        let strid = NaturalClass::parse(["-strid"]).expect("class");
        assert_eq!(symbols(&inv, &inv.extension_complement(&strid)), set(&["s", "ʃ"]));
        assert_eq!(
            inv.extension(&strid.flipped()),
            inv.extension_complement(&strid),
            "the flipped class is the clean complement"
        );
        let boundary = NaturalClass::parse(["+B"]).expect("class");
        assert_eq!(inv.extension(&boundary).len(), 4);
    }
}
