//! Line parser for the `;`-delimited NAV feed.

use crate::core::nav::COL_SCHEME_CODE;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

pub const DELIMITER: char = ';';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no header line containing \"{0}\" found in feed")]
    HeaderNotFound(&'static str),
}

/// One feed row keyed by header column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Splits the feed into rows keyed by the columns of the first line that
/// contains `Scheme Code`. Blank lines, lines without a delimiter (AMC and
/// category headings) and rows whose field count differs from the header are
/// skipped. Rows keep their source order.
pub fn parse_feed(text: &str) -> Result<Vec<RawRow>, ParseError> {
    let mut lines = text.lines().map(str::trim);

    let header = lines
        .by_ref()
        .find(|line| line.contains(COL_SCHEME_CODE))
        .ok_or(ParseError::HeaderNotFound(COL_SCHEME_CODE))?;
    let columns: Vec<&str> = header.split(DELIMITER).map(str::trim).collect();

    let mut rows: Vec<RawRow> = Vec::new();
    let mut malformed = 0usize;
    for line in lines {
        if line.is_empty() || !line.contains(DELIMITER) {
            continue;
        }
        let values: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if values.len() != columns.len() {
            malformed += 1;
            continue;
        }
        rows.push(columns.iter().copied().zip(values).collect());
    }

    debug!(rows = rows.len(), malformed, "Parsed NAV feed");
    Ok(rows)
}
