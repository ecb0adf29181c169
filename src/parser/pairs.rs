use std::fs;
use std::path::Path;

use super::ParseError;

/// One training record: an underlying form and its surface realisation, each a
/// space-separated string of segment symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingPair {
    pub ur: String,
    pub sr: String,
}

impl TrainingPair {
    pub fn new(ur: impl Into<String>, sr: impl Into<String>) -> Self {
        Self { ur: ur.into(), sr: sr.into() }
    }
}

/// Parse `UR<sep>SR` records. Blank lines and lines starting with `#` are
/// skipped; columns after the second are ignored.
pub fn parse_pairs(source: &str, sep: char) -> Result<Vec<TrainingPair>, ParseError> {
    let mut pairs = Vec::new();
    for (line_idx, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = raw_line.split(sep).map(str::trim);
        let ur = fields.next().unwrap_or_default();
        let sr = fields.next().unwrap_or_default();
        if ur.is_empty() || sr.is_empty() {
            return Err(ParseError::new(
                line_idx,
                0,
                format!("expected `UR{}SR`, found `{}`", sep.escape_default(), line),
            ));
        }
        pairs.push(TrainingPair::new(ur, sr));
    }
    Ok(pairs)
}

pub fn load_pairs(path: impl AsRef<Path>, sep: char) -> Result<Vec<TrainingPair>, ParseError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|err| ParseError::io(path, err))?;
    parse_pairs(&source, sep)
}
