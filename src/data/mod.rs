//! Core data structures: features, segments, natural classes, the segment
//! inventory, and segment sequences.

pub mod feature;
pub mod inventory;
pub mod natclass;
pub mod segment;
pub mod sequence;
pub mod symbols;

pub use feature::{FeatureSpace, FeatureValue, SignedFeature};
pub use inventory::{InventoryError, SegmentInventory};
pub use natclass::NaturalClass;
pub use segment::{Segment, SegmentId};
pub use sequence::SegmentSequence;
