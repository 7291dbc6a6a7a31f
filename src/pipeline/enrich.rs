use crate::core::{EnrichedNavRecord, MetadataProvider, NavRecord};
use futures::future::join_all;
use tracing::{debug, warn};

async fn enrich_one(record: &NavRecord, provider: &dyn MetadataProvider) -> EnrichedNavRecord {
    if record.scheme_code.is_empty() {
        return EnrichedNavRecord::unknown(record.clone());
    }
    match provider.fetch_metadata(&record.scheme_code).await {
        Ok(details) => {
            EnrichedNavRecord::new(record.clone(), details.category(), details.scheme_type())
        }
        Err(e) => {
            warn!(
                scheme_code = %record.scheme_code,
                error = %e,
                "Metadata lookup failed, marking as unknown"
            );
            EnrichedNavRecord::unknown(record.clone())
        }
    }
}

/// Annotates the first `limit` records with category and type.
///
/// Lookups run `batch_size` at a time; each batch completes before the next
/// starts. A failed lookup yields `"Unknown"` for that record only. Output
/// preserves input order.
pub async fn enrich(
    records: &[NavRecord],
    provider: &dyn MetadataProvider,
    limit: usize,
    batch_size: usize,
) -> Vec<EnrichedNavRecord> {
    let selected = &records[..records.len().min(limit)];
    let mut enriched = Vec::with_capacity(selected.len());

    for (batch_no, batch) in selected.chunks(batch_size.max(1)).enumerate() {
        let results = join_all(batch.iter().map(|r| enrich_one(r, provider))).await;
        enriched.extend(results);
        debug!(
            batch = batch_no + 1,
            done = enriched.len(),
            total = selected.len(),
            "Enrichment batch complete"
        );
    }
    enriched
}
