//! NAV ingestion pipeline.
//!
//! fetch → parse → filter/dedup → cleaned generation → shuffle → shuffled
//! generation → background enrichment → enriched generation.

pub mod amc;
pub mod enrich;
pub mod filter;
pub mod parse;
pub mod shuffle;

use crate::core::config::PipelineConfig;
use crate::core::{CacheManager, MetadataProvider, NavFeedProvider};
use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Clears the running flag when the run, including its enrichment task, ends.
struct RunGuard(Arc<AtomicBool>);

impl RunGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub parsed_rows: usize,
    pub cleaned: usize,
    /// Resolves to the enriched record count, or `None` if the enriched
    /// generation could not be written. May be dropped to detach.
    pub enrichment: JoinHandle<Option<usize>>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Started(RunReport),
    /// Another run was still in progress.
    Skipped,
}

pub struct Pipeline {
    feed: Arc<dyn NavFeedProvider>,
    metadata: Arc<dyn MetadataProvider>,
    cache: Arc<CacheManager>,
    config: PipelineConfig,
    running: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(
        feed: Arc<dyn NavFeedProvider>,
        metadata: Arc<dyn MetadataProvider>,
        cache: Arc<CacheManager>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            feed,
            metadata,
            cache,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Runs the pipeline up to the shuffled generation and spawns enrichment.
    ///
    /// Returns once the cleaned and shuffled generations are written. Any
    /// failure before that leaves all existing generations untouched.
    pub async fn run(&self) -> Result<RunOutcome> {
        let Some(guard) = RunGuard::acquire(&self.running) else {
            warn!("Pipeline run already in progress, skipping");
            return Ok(RunOutcome::Skipped);
        };
        info!("Pipeline run started");

        let text = self.feed.fetch_feed().await?;
        let rows = parse::parse_feed(&text).context("Failed to parse NAV feed")?;
        let cleaned = filter::clean(&rows, self.config.cutoff_year);
        if cleaned.is_empty() {
            bail!(
                "NAV feed had no rows dated {} or later",
                self.config.cutoff_year
            );
        }

        let shuffled = shuffle::shuffled(&cleaned);
        let report_cleaned = cleaned.len();
        self.cache.replace_run(cleaned, shuffled.clone()).await?;

        let metadata = Arc::clone(&self.metadata);
        let cache = Arc::clone(&self.cache);
        let limit = self.config.enrich_limit;
        let batch_size = self.config.batch_size;
        let enrichment = tokio::spawn(async move {
            let _guard = guard;
            let enriched = enrich::enrich(&shuffled, metadata.as_ref(), limit, batch_size).await;
            let count = enriched.len();
            match cache.replace_enriched(enriched).await {
                Ok(()) => {
                    info!(count, "Enrichment finished");
                    Some(count)
                }
                Err(e) => {
                    error!(error = ?e, "Failed to store enriched generation");
                    None
                }
            }
        });

        info!(
            parsed_rows = rows.len(),
            cleaned = report_cleaned,
            "Pipeline run servable, enrichment continues in background"
        );
        Ok(RunOutcome::Started(RunReport {
            parsed_rows: rows.len(),
            cleaned: report_cleaned,
            enrichment,
        }))
    }
}

/// AMC prefixes across every row of the feed, without cutoff filtering.
pub async fn feed_amc_prefixes(feed: &dyn NavFeedProvider) -> Result<BTreeSet<String>> {
    let text = feed.fetch_feed().await?;
    let rows = parse::parse_feed(&text).context("Failed to parse NAV feed")?;
    Ok(amc::amc_prefixes(
        rows.iter()
            .filter_map(|r| r.get(crate::core::nav::COL_SCHEME_NAME)),
    ))
}
