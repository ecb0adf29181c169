//! Builder to construct a learner from a feature table and configuration.

use thiserror::Error;

use super::learner::Learner;
use crate::config::LearnerConfig;
use crate::data::symbols::LWB;
use crate::data::{InventoryError, SegmentInventory};
use crate::parser::{FeatureTable, ParseError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Table(#[from] ParseError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Build a [`Learner`] over the bundled feature table unless told otherwise.
#[derive(Debug, Default)]
pub struct LearnerBuilder {
    config: LearnerConfig,
    table: Option<FeatureTable>,
    inventory: Option<SegmentInventory>,
}

impl LearnerBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: LearnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Create the inventory over `table` instead of the bundled one.
    pub fn feature_table(mut self, table: FeatureTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Train into an existing inventory. Takes precedence over
    /// [`LearnerBuilder::feature_table`].
    pub fn inventory(mut self, inventory: SegmentInventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn harmony(mut self, enabled: bool) -> Self {
        self.config.harmony = enabled;
        self
    }

    pub fn disharmony(mut self, enabled: bool) -> Self {
        self.config.disharmony = enabled;
        self
    }

    pub fn build(self) -> Result<Learner, BuildError> {
        let inventory = match (self.inventory, self.table) {
            (Some(inventory), _) => inventory,
            (None, Some(table)) => SegmentInventory::new(table),
            (None, None) => SegmentInventory::bundled()?,
        };
        let inventory = if self.config.boundary_symbols && !inventory.contains(LWB) {
            inventory.with_boundary_symbols()?
        } else {
            inventory
        };
        Ok(Learner::new(inventory, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::LearnerBuilder;
    use crate::config::LearnerConfig;
    use crate::parser::FeatureTable;

    #[test]
    fn defaults_to_the_bundled_table() {
        let learner = LearnerBuilder::new().build().expect("learner");
        assert_eq!(learner.inventory().feature_space().len(), 24);
        assert!(learner.inventory().is_empty());
        assert!(learner.config().harmony);
    }

    #[test]
    fn applies_configuration() {
        let config = LearnerConfig { boundary_symbols: true, ..LearnerConfig::default() };
        let table = FeatureTable::parse_str("sym\tsyl\na\t+\nt\t-\n", '\t', "inline")
            .expect("table");
        let learner = LearnerBuilder::new()
            .with_config(config)
            .feature_table(table)
            .disharmony(false)
            .build()
            .expect("learner");
        assert!(!learner.config().disharmony);
        assert!(learner.inventory().contains("⋉"));
        assert_eq!(learner.inventory().feature_space().len(), 6);
    }
}
