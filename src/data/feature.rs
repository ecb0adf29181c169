//! Feature values, signed feature literals, and the ordered feature space.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::data::symbols::UNDERSPECIFIED;
use crate::parser::ParseError;

/// Value of a single phonological feature.
///
/// The derived ordering (`+` < `-` < `0`) matches the ordering of the
/// rendered symbols, so sorting literals by value and then by name sorts
/// them the same way their text forms would sort.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureValue {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "0")]
    Underspecified,
}

impl FeatureValue {
    /// Flip `+` and `-`; underspecified stays underspecified.
    pub const fn flipped(self) -> Self {
        match self {
            FeatureValue::Plus => FeatureValue::Minus,
            FeatureValue::Minus => FeatureValue::Plus,
            FeatureValue::Underspecified => FeatureValue::Underspecified,
        }
    }

    pub const fn is_specified(self) -> bool {
        !matches!(self, FeatureValue::Underspecified)
    }

    pub const fn symbol(self) -> char {
        match self {
            FeatureValue::Plus => '+',
            FeatureValue::Minus => '-',
            FeatureValue::Underspecified => UNDERSPECIFIED,
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(FeatureValue::Plus),
            '-' => Some(FeatureValue::Minus),
            UNDERSPECIFIED => Some(FeatureValue::Underspecified),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for FeatureValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => FeatureValue::from_symbol(c).ok_or_else(|| {
                ParseError::new(0, 0, format!("invalid feature value `{}`", s))
            }),
            _ => Err(ParseError::new(0, 0, format!("invalid feature value `{}`", s))),
        }
    }
}

/// A feature literal such as `+syl` or `-voi`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignedFeature {
    pub value: FeatureValue,
    pub feature: String,
}

impl SignedFeature {
    pub fn new(value: FeatureValue, feature: impl Into<String>) -> Self {
        Self { value, feature: feature.into() }
    }

    pub fn plus(feature: impl Into<String>) -> Self {
        Self::new(FeatureValue::Plus, feature)
    }

    pub fn minus(feature: impl Into<String>) -> Self {
        Self::new(FeatureValue::Minus, feature)
    }

    pub fn flipped(&self) -> Self {
        Self::new(self.value.flipped(), self.feature.clone())
    }
}

impl fmt::Display for SignedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.feature)
    }
}

impl FromStr for SignedFeature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let value = chars
            .next()
            .and_then(FeatureValue::from_symbol)
            .ok_or_else(|| ParseError::new(0, 0, format!("literal `{}` has no sign", s)))?;
        let feature = chars.as_str();
        if feature.is_empty() {
            return Err(ParseError::new(0, 0, format!("literal `{}` has no feature name", s)));
        }
        Ok(Self::new(value, feature))
    }
}

/// Ordered list of feature names shared by every segment of an inventory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureSpace {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSpace {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut space = Self::default();
        for name in names {
            space.push(name);
        }
        space
    }

    /// Append a feature name; returns its index. Duplicates keep their first index.
    pub fn push(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        if let Some(&idx) = self.index.get(&name) {
            return idx;
        }
        let idx = self.names.len();
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        idx
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureSpace, FeatureValue, SignedFeature};

    #[test]
    fn literal_round_trips_through_text() {
        let lit: SignedFeature = "+syl".parse().expect("parse literal");
        assert_eq!(lit, SignedFeature::plus("syl"));
        assert_eq!(lit.to_string(), "+syl");
        assert_eq!(lit.flipped().to_string(), "-syl");
        assert!("syl".parse::<SignedFeature>().is_err());
        assert!("+".parse::<SignedFeature>().is_err());
    }

    #[test]
    fn literal_order_matches_rendered_order() {
        let mut lits = vec![
            SignedFeature::minus("syl"),
            SignedFeature::plus("son"),
            SignedFeature::new(FeatureValue::Underspecified, "ant"),
            SignedFeature::minus("cons"),
        ];
        lits.sort();
        let rendered: Vec<String> = lits.iter().map(ToString::to_string).collect();
        let mut expected = rendered.clone();
        expected.sort();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn flipping_keeps_underspecified() {
        assert_eq!(FeatureValue::Plus.flipped(), FeatureValue::Minus);
        assert_eq!(FeatureValue::Minus.flipped(), FeatureValue::Plus);
        assert_eq!(FeatureValue::Underspecified.flipped(), FeatureValue::Underspecified);
    }

    #[test]
    fn feature_space_indexes_names() {
        let mut space = FeatureSpace::new(["syl", "son"]);
        assert_eq!(space.index_of("son"), Some(1));
        assert_eq!(space.push("syl"), 0);
        assert_eq!(space.push("cons"), 2);
        assert_eq!(space.len(), 3);
        assert!(space.index_of("voi").is_none());
    }
}
