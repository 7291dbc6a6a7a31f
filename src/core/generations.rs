//! Owned cache of the three pipeline generations.
//!
//! Each generation lives both in a [`GenerationStore`] (durable) and in memory
//! (serving). Snapshots are shared as `Arc<Vec<_>>` and only ever replaced
//! wholesale, so readers never observe a partially updated generation.

use crate::core::nav::{EnrichedNavRecord, NavRecord};
use crate::store::{Generation, GenerationStore};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

pub struct CacheManager {
    store: Arc<dyn GenerationStore>,
    cleaned: RwLock<Arc<Vec<NavRecord>>>,
    shuffled: RwLock<Arc<Vec<NavRecord>>>,
    enriched: RwLock<Arc<Vec<EnrichedNavRecord>>>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn GenerationStore>) -> Self {
        Self {
            store,
            cleaned: RwLock::default(),
            shuffled: RwLock::default(),
            enriched: RwLock::default(),
        }
    }

    pub async fn cleaned(&self) -> Arc<Vec<NavRecord>> {
        Arc::clone(&*self.cleaned.read().await)
    }

    pub async fn shuffled(&self) -> Arc<Vec<NavRecord>> {
        Arc::clone(&*self.shuffled.read().await)
    }

    pub async fn enriched(&self) -> Arc<Vec<EnrichedNavRecord>> {
        Arc::clone(&*self.enriched.read().await)
    }

    /// Replaces the cleaned and shuffled generations of one run together.
    ///
    /// Both are persisted before either in-memory snapshot is swapped. If the
    /// second write fails the stored cleaned generation is rolled back, so
    /// neither generation changes.
    pub async fn replace_run(&self, cleaned: Vec<NavRecord>, shuffled: Vec<NavRecord>) -> Result<()> {
        let previous = self
            .store
            .read(Generation::Cleaned)
            .await
            .context("Failed to read current cleaned generation")?;
        let cleaned = self.persist(Generation::Cleaned, cleaned).await?;
        let shuffled = match self.persist(Generation::Shuffled, shuffled).await {
            Ok(shuffled) => shuffled,
            Err(e) => {
                self.roll_back(Generation::Cleaned, previous).await;
                return Err(e);
            }
        };

        info!(
            cleaned = cleaned.len(),
            shuffled = shuffled.len(),
            "Cleaned and shuffled generations replaced"
        );
        *self.cleaned.write().await = cleaned;
        *self.shuffled.write().await = shuffled;
        Ok(())
    }

    pub async fn replace_enriched(&self, records: Vec<EnrichedNavRecord>) -> Result<()> {
        let records = self.persist(Generation::Enriched, records).await?;
        info!(count = records.len(), "Enriched generation replaced");
        *self.enriched.write().await = records;
        Ok(())
    }

    /// Loads the last persisted generations into memory. Only the enriched
    /// generation is needed for serving; the others are loaded when present.
    /// Returns the number of enriched records now in memory.
    pub async fn load_from_store(&self) -> Result<usize> {
        if let Some(records) = self.load::<NavRecord>(Generation::Cleaned).await {
            *self.cleaned.write().await = Arc::new(records);
        }
        if let Some(records) = self.load::<NavRecord>(Generation::Shuffled).await {
            *self.shuffled.write().await = Arc::new(records);
        }

        let Some(bytes) = self.store.read(Generation::Enriched).await? else {
            info!("No enriched cache on disk yet");
            return Ok(0);
        };
        let records: Vec<EnrichedNavRecord> =
            serde_json::from_slice(&bytes).context("Failed to parse enriched cache")?;
        let count = records.len();
        *self.enriched.write().await = Arc::new(records);
        info!(count, "Loaded enriched cache");
        Ok(count)
    }

    async fn load<T: DeserializeOwned>(&self, generation: Generation) -> Option<Vec<T>> {
        let bytes = match self.store.read(generation).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(%generation, error = %e, "Failed to read cached generation");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => Some(records),
            Err(e) => {
                warn!(%generation, error = %e, "Ignoring unreadable cached generation");
                None
            }
        }
    }

    async fn roll_back(&self, generation: Generation, previous: Option<Vec<u8>>) {
        let result = match previous {
            Some(bytes) => self.store.write(generation, &bytes).await,
            None => self.store.remove(generation).await,
        };
        match result {
            Ok(()) => warn!(%generation, "Rolled back partially written run"),
            Err(e) => error!(%generation, error = ?e, "Failed to roll back generation"),
        }
    }

    async fn persist<T: Serialize>(
        &self,
        generation: Generation,
        records: Vec<T>,
    ) -> Result<Arc<Vec<T>>> {
        let bytes = serde_json::to_vec(&records)
            .with_context(|| format!("Failed to serialize {generation} generation"))?;
        self.store
            .write(generation, &bytes)
            .await
            .with_context(|| format!("Failed to persist {generation} generation"))?;
        debug!(%generation, count = records.len(), "Generation persisted");
        Ok(Arc::new(records))
    }
}
