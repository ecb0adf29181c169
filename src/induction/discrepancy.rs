use std::collections::BTreeSet;

use crate::data::{SegmentId, SegmentInventory, SegmentSequence};

/// One position at which a UR and its SR disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    pub ur: SegmentSequence,
    pub position: usize,
    pub sr_segment: SegmentId,
}

/// What differs between the URs and SRs of one training call: the alternating
/// segment pairs, the features they differ on, and every place it happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrepancy {
    features: BTreeSet<String>,
    alternations: BTreeSet<(SegmentId, SegmentId)>,
    occurrences: Vec<Occurrence>,
}

impl Discrepancy {
    pub fn new(features: BTreeSet<String>) -> Self {
        Self { features, alternations: BTreeSet::new(), occurrences: Vec::new() }
    }

    /// Alternating feature names.
    pub fn features(&self) -> &BTreeSet<String> {
        &self.features
    }

    pub fn tabulate(
        &mut self,
        ur: &SegmentSequence,
        position: usize,
        ur_segment: SegmentId,
        sr_segment: SegmentId,
    ) {
        self.occurrences.push(Occurrence { ur: ur.clone(), position, sr_segment });
        self.alternations.insert((ur_segment, sr_segment));
    }

    pub fn contains(&self, ur_segment: SegmentId, sr_segment: SegmentId) -> bool {
        self.alternations.contains(&(ur_segment, sr_segment))
    }

    /// Distinct `(UR segment, SR segment)` pairs.
    pub fn alternations(&self) -> &BTreeSet<(SegmentId, SegmentId)> {
        &self.alternations
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// UR segments observed to alternate; the target set of any rule.
    pub fn alternating_ur_segments(&self) -> BTreeSet<SegmentId> {
        self.alternations.iter().map(|&(ur, _)| ur).collect()
    }

    /// Every segment on either side of an alternation.
    pub fn alternating_segments(&self) -> BTreeSet<SegmentId> {
        self.alternations.iter().flat_map(|&(ur, sr)| [ur, sr]).collect()
    }

    /// Distinct URs exhibiting the discrepancy.
    pub fn urs(&self) -> BTreeSet<&SegmentSequence> {
        self.occurrences.iter().map(|occ| &occ.ur).collect()
    }

    pub fn render_features(&self) -> String {
        format!("{{{}}}", self.features.iter().cloned().collect::<Vec<_>>().join(","))
    }

    pub fn render(&self, inventory: &SegmentInventory) -> String {
        let pairs: Vec<String> = self
            .alternations
            .iter()
            .map(|&(ur, sr)| format!("{}~{}", inventory.symbol(ur), inventory.symbol(sr)))
            .collect();
        format!("{} over {}", pairs.join(" "), self.render_features())
    }
}

#[cfg(test)]
mod tests {
    use super::Discrepancy;
    use crate::data::SegmentInventory;

    #[test]
    fn tabulates_alternations_and_urs() {
        let mut inv = SegmentInventory::bundled().expect("bundled table");
        let ur = inv.sequence("a t a d").expect("ur");
        let other = inv.sequence("d a").expect("ur");
        let t = inv.lookup("t").expect("t");
        let d = inv.lookup("d").expect("d");
        let diff = inv.feature_diff(t, d);

        let mut disc = Discrepancy::new(diff);
        disc.tabulate(&ur, 3, d, t);
        disc.tabulate(&other, 0, d, t);
        disc.tabulate(&other, 0, d, t);

        assert_eq!(disc.render_features(), "{voi}");
        assert!(disc.contains(d, t));
        assert!(!disc.contains(t, d));
        assert_eq!(disc.alternating_ur_segments().len(), 1);
        assert_eq!(disc.alternating_segments().len(), 2);
        assert_eq!(disc.urs().len(), 2);
        assert_eq!(disc.occurrences().len(), 3);
        assert_eq!(disc.render(&inv), "d~t over {voi}");
    }
}
