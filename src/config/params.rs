use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid learner config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Knobs for one induction run. Every key is optional in TOML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Search for a harmony rule.
    pub harmony: bool,
    /// Search for a disharmony rule.
    pub disharmony: bool,
    /// Replace a productive explicit context set with the tier itself when
    /// that does not lower accuracy.
    pub widen_contexts: bool,
    /// Largest conjunction tried when looking for a class covering the delset.
    pub max_class_literals: usize,
    /// Register the boundary segments when the inventory is created.
    pub boundary_symbols: bool,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            harmony: true,
            disharmony: true,
            widen_contexts: true,
            max_class_literals: 3,
            boundary_symbols: false,
        }
    }
}

impl LearnerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LearnerConfig};

    #[test]
    fn missing_keys_take_defaults() {
        let config = LearnerConfig::from_toml_str("disharmony = false\n").expect("config");
        assert!(config.harmony);
        assert!(!config.disharmony);
        assert_eq!(config.max_class_literals, 3);
        assert_eq!(LearnerConfig::from_toml_str("").expect("empty"), LearnerConfig::default());
    }

    #[test]
    fn rejects_bad_types() {
        let err = LearnerConfig::from_toml_str("max_class_literals = \"two\"").expect_err("type");
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("learner.toml");
        std::fs::write(&path, "widen_contexts = false\nboundary_symbols = true\n").expect("write");
        let config = LearnerConfig::load(&path).expect("load");
        assert!(!config.widen_contexts);
        assert!(config.boundary_symbols);
        assert!(matches!(
            LearnerConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
