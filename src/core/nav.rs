//! NAV record types shared by the pipeline, the cache and the HTTP layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names used by the AMFI `NAVAll.txt` feed.
pub const COL_SCHEME_CODE: &str = "Scheme Code";
pub const COL_ISIN_GROWTH: &str = "ISIN Div Payout/ ISIN Growth";
pub const COL_ISIN_REINVESTMENT: &str = "ISIN Div Reinvestment";
pub const COL_SCHEME_NAME: &str = "Scheme Name";
pub const COL_NAV: &str = "Net Asset Value";
pub const COL_DATE: &str = "Date";

/// Date format used by the feed, e.g. `05-Jan-2025`.
pub const NAV_DATE_FORMAT: &str = "%d-%b-%Y";

/// Value substituted when scheme metadata is unavailable.
pub const UNKNOWN: &str = "Unknown";

/// Latest published valuation of a single scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavRecord {
    #[serde(rename = "Scheme Code")]
    pub scheme_code: String,
    #[serde(rename = "ISIN Div Payout/ ISIN Growth", default)]
    pub isin_growth: Option<String>,
    #[serde(rename = "ISIN Div Reinvestment", default)]
    pub isin_reinvestment: Option<String>,
    #[serde(rename = "Scheme Name")]
    pub scheme_name: String,
    /// Kept as text to avoid any precision loss.
    #[serde(rename = "Net Asset Value")]
    pub net_asset_value: String,
    #[serde(rename = "Date", with = "nav_date")]
    pub date: NaiveDate,
}

/// A [`NavRecord`] annotated with scheme category and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedNavRecord {
    #[serde(flatten)]
    pub record: NavRecord,
    pub category: String,
    #[serde(rename = "type")]
    pub scheme_type: String,
}

impl EnrichedNavRecord {
    pub fn new(record: NavRecord, category: Option<String>, scheme_type: Option<String>) -> Self {
        Self {
            record,
            category: category.unwrap_or_else(|| UNKNOWN.to_string()),
            scheme_type: scheme_type.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    pub fn unknown(record: NavRecord) -> Self {
        Self::new(record, None, None)
    }
}

pub fn parse_nav_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), NAV_DATE_FORMAT).ok()
}

mod nav_date {
    use super::NAV_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(NAV_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_nav_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid NAV date: {raw}")))
    }
}
