//! Display symbols shared across the crate.

/// Marker for an underspecified feature value.
pub const UNDERSPECIFIED: char = '0';

/// Left word boundary.
pub const LWB: &str = "⋊";

/// Right word boundary.
pub const RWB: &str = "⋉";

/// Syllable boundary.
pub const SYLB: &str = ".";

/// Morpheme boundary.
pub const MORPHB: &str = "+";

/// Function composition, used when rendering a rule applied over a tier.
pub const FUNCTION_COMPOSITION: &str = "∘";

/// Prefix marking a tier defined by the segments it deletes.
pub const DELSET: &str = "¬";

/// Features appended to the feature space when boundary segments are enabled.
pub const BOUNDARY_FEATURES: [&str; 5] = ["B", "LWB", "RWB", "SYLB", "MORPHB"];

/// Boundary segments paired with the boundary feature each one is `+` for.
pub const BOUNDARY_SEGMENTS: [(&str, &str); 4] =
    [(LWB, "LWB"), (RWB, "RWB"), (SYLB, "SYLB"), (MORPHB, "MORPHB")];
