//! Tiers and tier projection.

use std::collections::BTreeSet;
use std::ops::Deref;

use thiserror::Error;

use crate::data::symbols::DELSET;
use crate::data::{NaturalClass, SegmentId, SegmentInventory, SegmentSequence};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TierError {
    #[error("a tier takes either a natural class or a segment set, not both")]
    BothSpecified,
    #[error("a tier needs a natural class or a segment set, but neither was given")]
    NoneSpecified,
}

/// What a tier is defined over.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TierSpec {
    Class(NaturalClass),
    Segments(BTreeSet<SegmentId>),
}

/// A membership test used to filter sequences down to the segments a rule
/// can see. A delset tier keeps exactly the segments its spec rejects.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tier {
    spec: TierSpec,
    delset: bool,
}

impl Tier {
    /// Build a tier from exactly one of a natural class or an explicit set.
    /// Empty classes and empty sets count as missing.
    pub fn new(
        feats: Option<NaturalClass>,
        segs: Option<BTreeSet<SegmentId>>,
        as_delset: bool,
    ) -> Result<Self, TierError> {
        let feats = feats.filter(|class| !class.is_empty());
        let segs = segs.filter(|set| !set.is_empty());
        let spec = match (feats, segs) {
            (Some(_), Some(_)) => return Err(TierError::BothSpecified),
            (None, None) => return Err(TierError::NoneSpecified),
            (Some(class), None) => TierSpec::Class(class),
            (None, Some(set)) => TierSpec::Segments(set),
        };
        Ok(Self { spec, delset: as_delset })
    }

    pub fn from_class(class: NaturalClass) -> Self {
        Self { spec: TierSpec::Class(class), delset: false }
    }

    pub fn from_segments(segs: BTreeSet<SegmentId>) -> Self {
        Self { spec: TierSpec::Segments(segs), delset: false }
    }

    /// The same spec read as a delset.
    pub fn into_delset(mut self) -> Self {
        self.delset = true;
        self
    }

    pub fn spec(&self) -> &TierSpec {
        &self.spec
    }

    pub fn is_delset(&self) -> bool {
        self.delset
    }

    pub fn contains(&self, inventory: &SegmentInventory, id: SegmentId) -> bool {
        let in_spec = match &self.spec {
            TierSpec::Class(class) => class.contains(inventory, id),
            TierSpec::Segments(set) => set.contains(&id),
        };
        in_spec != self.delset
    }

    /// Realised segments that belong to the tier, boundary segments aside.
    pub fn members(&self, inventory: &SegmentInventory) -> BTreeSet<SegmentId> {
        inventory
            .ids()
            .filter(|&id| !inventory.is_boundary(id) && self.contains(inventory, id))
            .collect()
    }

    /// Keep the members of `seq`, in order, remembering where each came from.
    pub fn project(&self, inventory: &SegmentInventory, seq: &SegmentSequence) -> Projection {
        let (idxs, segs): (Vec<usize>, Vec<SegmentId>) = seq
            .iter()
            .enumerate()
            .filter(|&(_, id)| self.contains(inventory, id))
            .unzip();
        Projection { seq: SegmentSequence::new(segs), idxs }
    }

    pub fn render(&self, inventory: &SegmentInventory) -> String {
        let body = match &self.spec {
            TierSpec::Class(class) => class.to_string(),
            TierSpec::Segments(set) => inventory.render_set(set),
        };
        if self.delset {
            format!("{}{}", DELSET, body)
        } else {
            body
        }
    }
}

/// A projected sequence plus the original position of every projected segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    seq: SegmentSequence,
    idxs: Vec<usize>,
}

impl Projection {
    /// The identity projection of `seq`.
    pub fn identity(seq: &SegmentSequence) -> Self {
        Self { seq: seq.clone(), idxs: (0..seq.len()).collect() }
    }

    pub fn idxs(&self) -> &[usize] {
        &self.idxs
    }

    pub fn original_index(&self, projected: usize) -> Option<usize> {
        self.idxs.get(projected).copied()
    }

    pub fn sequence(&self) -> &SegmentSequence {
        &self.seq
    }

    pub(crate) fn set(&mut self, projected: usize, id: SegmentId) {
        if let Some(slot) = self.seq.as_mut_slice().get_mut(projected) {
            *slot = id;
        }
    }
}

impl Deref for Projection {
    type Target = SegmentSequence;

    fn deref(&self) -> &SegmentSequence {
        &self.seq
    }
}
