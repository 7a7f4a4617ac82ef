//! Matches normalized records against stored orders and writes them.
//!
//! Each row is its own unit of work. A row either creates an order, updates
//! the one sharing its natural key, is skipped for lacking a name, or fails
//! in the store. A failure is recorded in the [`SyncResult`] and the next row
//! runs regardless.

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::StoreError,
    normalize::default_range_for_trim,
    record::{NormalizedOrderRecord, ParsedRow},
    store::{NaturalKey, OrderStore, PersistedOrder},
};

/// What happened to one sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Created(Uuid),
    Updated(Uuid),
    /// The row had no name.
    Skipped,
    /// The store rejected the write; the message names the row.
    Failed(String),
}

/// Counters and error messages for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl SyncResult {
    /// A result holding a single source-level failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created(_) => self.created += 1,
            RowOutcome::Updated(_) => self.updated += 1,
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Failed(message) => {
                self.skipped += 1;
                self.errors.push(message);
            }
        }
    }
}

/// Creates or updates the stored order matching `record`'s natural key.
///
/// On update the stored `id`, `created_at` and `archived` flag are kept. A
/// row with no range from the sheet gets one inferred from its trim, except
/// that an update with an unchanged trim keeps the stored range.
pub fn merge_record<S>(store: &mut S, record: NormalizedOrderRecord) -> Result<RowOutcome, StoreError>
where
    S: OrderStore + ?Sized,
{
    let existing = store.find_by_key(&NaturalKey::of(&record))?;
    let now = Utc::now();
    match existing {
        Some(mut order) => {
            let mut fields = record;
            if fields.range.is_none() {
                fields.range = if fields.model == order.fields.model {
                    order.fields.range.take()
                } else {
                    Some(default_range_for_trim(fields.model.as_deref()).to_string())
                };
            }
            order.fields = fields;
            order.updated_at = now;
            let id = order.id;
            store.update(order)?;
            Ok(RowOutcome::Updated(id))
        }
        None => {
            let mut fields = record;
            if fields.range.is_none() {
                fields.range = Some(default_range_for_trim(fields.model.as_deref()).to_string());
            }
            let order = PersistedOrder {
                id: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
                archived: false,
                fields,
            };
            let id = order.id;
            store.create(order)?;
            Ok(RowOutcome::Created(id))
        }
    }
}

/// Merges one parsed row, turning store errors into a [`RowOutcome::Failed`].
pub fn merge_row<S>(store: &mut S, row: ParsedRow) -> RowOutcome
where
    S: OrderStore + ?Sized,
{
    let Some(record) = row.record else {
        debug!("Row {}: no name, skipped", row.row_number);
        return RowOutcome::Skipped;
    };
    let name = record.name.clone();
    match merge_record(store, record) {
        Ok(outcome) => {
            debug!("Row {} ({}): {:?}", row.row_number, name, outcome);
            outcome
        }
        Err(err) => {
            warn!("Row {} ({}) failed: {}", row.row_number, name, err);
            RowOutcome::Failed(format!("row {} ({}): {}", row.row_number, name, err))
        }
    }
}

/// Merges all rows of one sheet in order.
pub fn merge_rows<S, I>(store: &mut S, rows: I) -> SyncResult
where
    S: OrderStore + ?Sized,
    I: IntoIterator<Item = ParsedRow>,
{
    let mut result = SyncResult::default();
    for row in rows {
        result.record(merge_row(store, row));
    }
    result
}
