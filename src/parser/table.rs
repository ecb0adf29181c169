use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::ParseError;
use crate::data::{FeatureSpace, FeatureValue};

const BUNDLED_TABLE: &str = include_str!("../../data/features.tsv");

/// Symbols that stand in for each other when a table only lists one of them.
const ALIASES: [(&str, &str); 1] = [("g", "ɡ")];

/// A base feature table: one header row naming the features, then one row per
/// symbol with a `+`, `-` or `0` value for each feature.
#[derive(Clone, Debug)]
pub struct FeatureTable {
    source_name: String,
    space: FeatureSpace,
    rows: HashMap<String, Vec<FeatureValue>>,
}

impl FeatureTable {
    /// The tab-separated table shipped with the crate.
    pub fn bundled() -> Result<Self, ParseError> {
        Self::parse_str(BUNDLED_TABLE, '\t', "the bundled feature table")
    }

    pub fn load(path: impl AsRef<Path>, sep: char) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| ParseError::io(path, err))?;
        Self::parse_str(&source, sep, path.display().to_string())
    }

    pub fn parse_str(
        source: &str,
        sep: char,
        source_name: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let mut lines = source
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| ParseError::new(0, 0, "feature table is empty"))?;
        let names: Vec<&str> = header.split(sep).skip(1).map(str::trim).collect();
        if names.is_empty() {
            return Err(ParseError::new(0, 0, "feature table header names no features"));
        }
        let space = FeatureSpace::new(names.iter().copied());
        if space.len() != names.len() {
            return Err(ParseError::new(0, 0, "feature table header repeats a feature"));
        }

        let mut rows = HashMap::new();
        for (line_idx, line) in lines {
            let mut fields = line.split(sep).map(str::trim);
            let symbol = fields.next().unwrap_or_default();
            if symbol.is_empty() {
                return Err(ParseError::new(line_idx, 0, "row has no symbol"));
            }
            let values = fields
                .enumerate()
                .map(|(col, field)| {
                    field.parse::<FeatureValue>().map_err(|_| {
                        ParseError::new(
                            line_idx,
                            col + 1,
                            format!("invalid value `{}` for `{}`", field, symbol),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if values.len() != space.len() {
                return Err(ParseError::new(
                    line_idx,
                    0,
                    format!(
                        "row `{}` has {} values, expected {}",
                        symbol,
                        values.len(),
                        space.len()
                    ),
                ));
            }
            if rows.insert(symbol.to_string(), values).is_some() {
                return Err(ParseError::new(
                    line_idx,
                    0,
                    format!("symbol `{}` appears twice", symbol),
                ));
            }
        }

        for (a, b) in ALIASES {
            match (rows.get(a).cloned(), rows.get(b).cloned()) {
                (Some(values), None) => {
                    rows.insert(b.to_string(), values);
                }
                (None, Some(values)) => {
                    rows.insert(a.to_string(), values);
                }
                _ => {}
            }
        }

        Ok(Self { source_name: source_name.into(), space, rows })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn row(&self, symbol: &str) -> Option<&[FeatureValue]> {
        self.rows.get(symbol).map(Vec::as_slice)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.rows.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, FeatureSpace, HashMap<String, Vec<FeatureValue>>) {
        (self.source_name, self.space, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::FeatureTable;
    use crate::data::FeatureValue;

    #[test]
    fn bundled_table_loads() {
        let table = FeatureTable::bundled().expect("bundled table");
        assert_eq!(table.feature_space().len(), 24);
        assert_eq!(table.feature_space().name(0), Some("syl"));
        assert!(table.contains("ʃ"));
        assert_eq!(table.row("g"), table.row("ɡ"));
    }

    #[test]
    fn custom_separator_and_values() {
        let source = "sym,syl,voi\n\na,+,+\nt,-,-\nʔ,-,0\n";
        let table = FeatureTable::parse_str(source, ',', "inline").expect("table");
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.row("ʔ"),
            Some(&[FeatureValue::Minus, FeatureValue::Underspecified][..])
        );
    }

    #[test]
    fn malformed_rows_report_their_line() {
        let err = FeatureTable::parse_str("sym\tsyl\tvoi\na\t+\n", '\t', "inline")
            .expect_err("short row");
        assert_eq!(err.line(), Some(1));
        let err = FeatureTable::parse_str("sym\tsyl\na\t?\n", '\t', "inline")
            .expect_err("bad value");
        assert!(err.to_string().starts_with("parse error at 2:2"));
        let err = FeatureTable::parse_str("sym\tsyl\na\t+\na\t-\n", '\t', "inline")
            .expect_err("duplicate");
        assert!(err.to_string().contains("appears twice"));
    }
}
