use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeMeta {
    #[serde(default)]
    pub fund_house: Option<String>,
    #[serde(default)]
    pub scheme_type: Option<String>,
    #[serde(default)]
    pub scheme_category: Option<String>,
    #[serde(default)]
    pub scheme_name: Option<String>,
}

/// A single historical NAV point, newest first in [`SchemeDetails::data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    pub date: String,
    pub nav: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeDetails {
    #[serde(default)]
    pub meta: Option<SchemeMeta>,
    #[serde(default)]
    pub data: Vec<NavPoint>,
}

impl SchemeDetails {
    pub fn category(&self) -> Option<String> {
        self.meta.as_ref().and_then(|m| m.scheme_category.clone())
    }

    pub fn scheme_type(&self) -> Option<String> {
        self.meta.as_ref().and_then(|m| m.scheme_type.clone())
    }

    /// Keeps only the `limit` most recent points.
    pub fn truncate_history(mut self, limit: usize) -> Self {
        self.data.truncate(limit);
        self
    }
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_metadata(&self, scheme_code: &str) -> anyhow::Result<SchemeDetails>;
}
