//! Sync orchestration.
//!
//! [`run_sync()`] takes the sources to process, handles them one after
//! another, and folds every source's [`SyncResult`] into one
//! [`AggregateSyncResult`]. Failures that are expected during a sync (an
//! unreachable sheet, an empty export, a rejected row) end up as error
//! strings in the result. Only a failure to record the sync metadata is
//! returned as an `Err`.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    config::SourceConfig,
    fetch::SheetFetcher,
    merge::{SyncResult, merge_rows},
    record,
    store::{OrderStore, SettingsStore, SyncMetadata},
};

/// The result of one source, labelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub label: String,
    #[serde(flatten)]
    pub result: SyncResult,
}

/// Totals over every source of one run, plus the per-source breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSyncResult {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub sources: Vec<SourceReport>,
}

impl AggregateSyncResult {
    pub fn absorb(&mut self, label: &str, result: SyncResult) {
        self.created += result.created;
        self.updated += result.updated;
        self.skipped += result.skipped;
        self.errors
            .extend(result.errors.iter().map(|err| format!("{label}: {err}")));
        self.sources.push(SourceReport {
            label: label.to_string(),
            result,
        });
    }

    /// Number of orders written by the run.
    pub fn synced(&self) -> usize {
        self.created + self.updated
    }
}

/// Fetches, parses and merges a single source.
pub fn sync_source<S>(source: &SourceConfig, fetcher: &dyn SheetFetcher, store: &mut S) -> SyncResult
where
    S: OrderStore + ?Sized,
{
    info!("Syncing '{}' ({})", source.label, source.variant);
    let text = match fetcher.fetch_csv(source) {
        Ok(text) => text,
        Err(err) => {
            warn!("Fetching '{}' failed: {}", source.label, err);
            return SyncResult::failed(format!("fetch failed: {err}"));
        }
    };
    let rows = match record::parse_sheet(&text, source.variant) {
        Ok(rows) => rows,
        Err(err) => {
            warn!("Sheet '{}' unusable: {}", source.label, err);
            return SyncResult::failed(err.to_string());
        }
    };
    let result = merge_rows(store, rows);
    info!(
        "✓ '{}': {} created, {} updated, {} skipped, {} error(s)",
        source.label,
        result.created,
        result.updated,
        result.skipped,
        result.errors.len()
    );
    result
}

/// Syncs `sources` in order and records the run's sync metadata.
pub fn run_sync<S>(
    sources: &[SourceConfig],
    fetcher: &dyn SheetFetcher,
    store: &mut S,
) -> Result<AggregateSyncResult>
where
    S: OrderStore + SettingsStore + ?Sized,
{
    let mut aggregate = AggregateSyncResult::default();
    for source in sources {
        let result = sync_source(source, fetcher, store);
        aggregate.absorb(&source.label, result);
    }

    let metadata = SyncMetadata {
        last_sync_time: Utc::now(),
        last_sync_count: aggregate.synced(),
    };
    store
        .upsert_sync_metadata(metadata)
        .context("Recording sync metadata")?;
    info!(
        "Sync finished for {} source(s): {} created, {} updated, {} skipped, {} error(s)",
        sources.len(),
        aggregate.created,
        aggregate.updated,
        aggregate.skipped,
        aggregate.errors.len()
    );
    Ok(aggregate)
}
