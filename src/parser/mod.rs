//! Parsers for the two external file formats: feature tables and training
//! pairs.

mod pairs;
mod table;

use std::path::PathBuf;

use thiserror::Error;

pub use pairs::{load_pairs, parse_pairs, TrainingPair};
pub use table::FeatureTable;

/// Parser error information.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parse error at {}:{}: {message}", .line + 1, .column + 1)]
    Syntax { line: usize, column: usize, message: String },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Syntax error at a zero-based line and column.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax { line, column, message: message.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParseError::Io { path: path.into(), source }
    }

    /// Zero-based line of a syntax error.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Io { .. } => None,
        }
    }
}
