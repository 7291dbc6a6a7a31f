//! Cutoff filtering and per-scheme deduplication.

use super::parse::RawRow;
use crate::core::nav::{
    COL_DATE, COL_ISIN_GROWTH, COL_ISIN_REINVESTMENT, COL_NAV, COL_SCHEME_CODE, COL_SCHEME_NAME,
    NavRecord, parse_nav_date,
};
use chrono::Datelike;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

fn optional_field(row: &RawRow, column: &str) -> Option<String> {
    row.get(column)
        .filter(|v| !v.is_empty() && *v != "-")
        .map(str::to_string)
}

/// Converts a raw row, or `None` when it has no scheme code or no parseable date.
pub fn to_record(row: &RawRow) -> Option<NavRecord> {
    let scheme_code = row.get(COL_SCHEME_CODE).filter(|c| !c.is_empty())?;
    let date = parse_nav_date(row.get(COL_DATE)?)?;

    Some(NavRecord {
        scheme_code: scheme_code.to_string(),
        isin_growth: optional_field(row, COL_ISIN_GROWTH),
        isin_reinvestment: optional_field(row, COL_ISIN_REINVESTMENT),
        scheme_name: row.get(COL_SCHEME_NAME).unwrap_or_default().to_string(),
        net_asset_value: row.get(COL_NAV).unwrap_or_default().to_string(),
        date,
    })
}

/// Keeps rows dated in `cutoff_year` or later.
pub fn filter_by_year(rows: &[RawRow], cutoff_year: i32) -> Vec<NavRecord> {
    rows.iter()
        .filter_map(to_record)
        .filter(|r| r.date.year() >= cutoff_year)
        .collect()
}

/// Collapses records sharing a scheme code into the one with the latest
/// date. On equal dates the first seen record wins. Output follows the order
/// in which each code first appeared.
pub fn dedup_latest(records: Vec<NavRecord>) -> Vec<NavRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut latest: Vec<NavRecord> = Vec::new();

    for record in records {
        match index.entry(record.scheme_code.clone()) {
            Entry::Occupied(slot) => {
                let current = &mut latest[*slot.get()];
                if record.date > current.date {
                    *current = record;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(latest.len());
                latest.push(record);
            }
        }
    }
    latest
}

/// Filter then dedup; produces the cleaned generation.
pub fn clean(rows: &[RawRow], cutoff_year: i32) -> Vec<NavRecord> {
    let recent = filter_by_year(rows, cutoff_year);
    let kept = recent.len();
    let cleaned = dedup_latest(recent);
    debug!(
        rows = rows.len(),
        kept,
        unique = cleaned.len(),
        cutoff_year,
        "Filtered NAV rows"
    );
    cleaned
}
