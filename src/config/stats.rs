use std::collections::BTreeMap;

/// Named counters collected during one training call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    counters: BTreeMap<String, u64>,
}

impl Statistics {
    pub const PAIRS: &'static str = "pairs";
    pub const ABSTRACT_SEGMENTS: &'static str = "abstract_segments";
    pub const SEARCH_ITERATIONS: &'static str = "search_iterations";
    pub const CANDIDATES_EVALUATED: &'static str = "candidates_evaluated";
    pub const TIER_REFINEMENTS: &'static str = "tier_refinements";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: u64) {
        self.counters.insert(name.into(), value);
    }

    pub fn increment(&mut self, name: impl Into<String>) -> u64 {
        self.increment_by(name, 1)
    }

    pub fn increment_by(&mut self, name: impl Into<String>, amount: u64) -> u64 {
        let entry = self.counters.entry(name.into()).or_insert(0);
        *entry += amount;
        *entry
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }

    /// Counter value, treating unset counters as zero.
    pub fn count(&self, name: &str) -> u64 {
        self.get(name).unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn counters_increment() {
        let mut stats = Statistics::new();
        assert_eq!(stats.increment(Statistics::SEARCH_ITERATIONS), 1);
        assert_eq!(stats.increment_by(Statistics::SEARCH_ITERATIONS, 4), 5);
        assert_eq!(stats.get("search_iterations"), Some(5));
        assert_eq!(stats.count(Statistics::PAIRS), 0);
        stats.clear();
        assert!(stats.get(Statistics::SEARCH_ITERATIONS).is_none());
    }
}
