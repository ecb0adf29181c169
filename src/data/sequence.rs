use std::cmp::Ordering;
use std::ops::{Add, Index};

use super::{SegmentId, SegmentInventory};

/// An ordered, immutable run of segments from one inventory.
///
/// Equality, hashing and ordering are element-wise over segment identity, so
/// the derived order follows registration order. Use
/// [`SegmentSequence::cmp_symbols`] to order by symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentSequence {
    segments: Vec<SegmentId>,
}

impl SegmentSequence {
    pub fn new(segments: Vec<SegmentId>) -> Self {
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<SegmentId> {
        self.segments.get(idx).copied()
    }

    pub fn as_slice(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = SegmentId> + ExactSizeIterator + '_ {
        self.segments.iter().copied()
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains(&id)
    }

    pub fn count(&self, id: SegmentId) -> usize {
        self.segments.iter().filter(|&&seg| seg == id).count()
    }

    pub fn starts_with(&self, prefix: &[SegmentId]) -> bool {
        self.segments.starts_with(prefix)
    }

    pub fn ends_with(&self, suffix: &[SegmentId]) -> bool {
        self.segments.ends_with(suffix)
    }

    /// Copy of the subsequence `[start, end)`, clamped to the sequence bounds.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self::new(self.segments[start..end].to_vec())
    }

    /// Copy of the sequence with position `idx` replaced.
    pub fn with_segment(&self, idx: usize, id: SegmentId) -> Self {
        let mut segments = self.segments.clone();
        if let Some(slot) = segments.get_mut(idx) {
            *slot = id;
        }
        Self::new(segments)
    }

    /// Space-separated symbols.
    pub fn render(&self, inventory: &SegmentInventory) -> String {
        inventory.render(self)
    }

    /// Symbols concatenated with no separator.
    pub fn concat_symbols(&self, inventory: &SegmentInventory) -> String {
        self.iter().map(|id| inventory.symbol(id)).collect()
    }

    /// Lexicographic comparison by segment symbols.
    pub fn cmp_symbols(&self, other: &Self, inventory: &SegmentInventory) -> Ordering {
        self.iter()
            .map(|id| inventory.symbol(id))
            .cmp(other.iter().map(|id| inventory.symbol(id)))
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [SegmentId] {
        &mut self.segments
    }
}

impl From<Vec<SegmentId>> for SegmentSequence {
    fn from(segments: Vec<SegmentId>) -> Self {
        Self::new(segments)
    }
}

impl FromIterator<SegmentId> for SegmentSequence {
    fn from_iter<T: IntoIterator<Item = SegmentId>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for SegmentSequence {
    type Output = SegmentId;

    fn index(&self, idx: usize) -> &SegmentId {
        &self.segments[idx]
    }
}

impl Add for &SegmentSequence {
    type Output = SegmentSequence;

    fn add(self, rhs: &SegmentSequence) -> SegmentSequence {
        self.iter().chain(rhs.iter()).collect()
    }
}

impl Add<SegmentId> for &SegmentSequence {
    type Output = SegmentSequence;

    fn add(self, rhs: SegmentId) -> SegmentSequence {
        self.iter().chain(std::iter::once(rhs)).collect()
    }
}

impl<'a> IntoIterator for &'a SegmentSequence {
    type Item = SegmentId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, SegmentId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::data::SegmentInventory;

    #[test]
    fn sequences_compare_by_segments() {
        let mut inv = SegmentInventory::bundled().expect("bundled table");
        let a = inv.sequence("t a k").expect("tak");
        let b = inv.sequence("t a k").expect("tak");
        let c = inv.sequence("t a").expect("ta");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(c < a);
        assert_eq!(a.render(&inv), "t a k");
        assert_eq!(a.concat_symbols(&inv), "tak");
    }

    #[test]
    fn symbol_order_ignores_registration_order() {
        let mut inv = SegmentInventory::bundled().expect("bundled table");
        let t = inv.sequence("t").expect("t");
        let a = inv.sequence("a").expect("a");
        let at = inv.sequence("a t").expect("at");
        assert_eq!(a.cmp_symbols(&t, &inv), Ordering::Less);
        assert_eq!(t.cmp_symbols(&a, &inv), Ordering::Greater);
        assert_eq!(a.cmp_symbols(&at, &inv), Ordering::Less);
        assert_eq!(at.cmp_symbols(&at.clone(), &inv), Ordering::Equal);
    }

    #[test]
    fn slicing_and_concatenation() {
        let mut inv = SegmentInventory::bundled().expect("bundled table");
        let seq = inv.sequence("b a n a n a").expect("banana");
        let a = inv.lookup("a").expect("a");
        let n = inv.lookup("n").expect("n");
        assert_eq!(seq.count(a), 3);
        assert!(seq.ends_with(&[n, a]));
        assert!(!seq.starts_with(&[a]));
        let head = seq.slice(0, 2);
        assert_eq!(head.render(&inv), "b a");
        assert_eq!((&head + n).render(&inv), "b a n");
        assert_eq!((&head + &head).render(&inv), "b a b a");
        assert_eq!(seq.slice(4, 99).render(&inv), "n a");
        assert_eq!(seq.with_segment(0, n).render(&inv), "n a n a n a");
    }
}
