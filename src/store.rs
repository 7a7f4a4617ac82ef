//! Order and settings persistence.
//!
//! The sync pipeline only needs a narrow surface from storage: look an order
//! up by its natural key, create one, update one, and overwrite the singleton
//! sync metadata. [`OrderStore`] and [`SettingsStore`] describe that surface.
//! [`MemoryStore`] keeps everything in memory; [`JsonFileStore`] adds a JSON
//! file underneath and rewrites it after every change, so each row's write
//! stands on its own if a run stops halfway.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::StoreError, record::NormalizedOrderRecord, vehicle::VehicleLine};

/// A stored order. `id`, `created_at` and `archived` are owned by the store
/// and survive every sync update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedOrder {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived: bool,
    #[serde(flatten)]
    pub fields: NormalizedOrderRecord,
}

/// Business fields that identify "the same order" across sync runs.
///
/// The order date matches exactly when both sides have one, and a missing
/// date only matches another missing date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaturalKey<'a> {
    pub name: &'a str,
    pub order_date: Option<NaiveDate>,
    pub vehicle_type: VehicleLine,
}

impl<'a> NaturalKey<'a> {
    pub fn of(record: &'a NormalizedOrderRecord) -> Self {
        Self {
            name: &record.name,
            order_date: record.order_date,
            vehicle_type: record.vehicle_type,
        }
    }

    pub fn matches(&self, order: &PersistedOrder) -> bool {
        order.fields.name == self.name
            && order.fields.order_date == self.order_date
            && order.fields.vehicle_type == self.vehicle_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetadata {
    pub last_sync_time: DateTime<Utc>,
    pub last_sync_count: usize,
}

pub trait OrderStore {
    fn find_by_key(&self, key: &NaturalKey<'_>) -> Result<Option<PersistedOrder>, StoreError>;
    fn create(&mut self, order: PersistedOrder) -> Result<(), StoreError>;
    fn update(&mut self, order: PersistedOrder) -> Result<(), StoreError>;
    fn count(&self) -> Result<usize, StoreError>;
}

pub trait SettingsStore {
    fn upsert_sync_metadata(&mut self, metadata: SyncMetadata) -> Result<(), StoreError>;
    fn sync_metadata(&self) -> Result<Option<SyncMetadata>, StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    orders: Vec<PersistedOrder>,
    #[serde(default)]
    metadata: Option<SyncMetadata>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[PersistedOrder] {
        &self.orders
    }

    fn position(&self, id: Uuid) -> Result<usize, StoreError> {
        self.orders
            .iter()
            .position(|order| order.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

impl OrderStore for MemoryStore {
    fn find_by_key(&self, key: &NaturalKey<'_>) -> Result<Option<PersistedOrder>, StoreError> {
        Ok(self.orders.iter().find(|order| key.matches(order)).cloned())
    }

    fn create(&mut self, order: PersistedOrder) -> Result<(), StoreError> {
        self.orders.push(order);
        Ok(())
    }

    fn update(&mut self, order: PersistedOrder) -> Result<(), StoreError> {
        let idx = self.position(order.id)?;
        self.orders[idx] = order;
        Ok(())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.orders.len())
    }
}

impl SettingsStore for MemoryStore {
    fn upsert_sync_metadata(&mut self, metadata: SyncMetadata) -> Result<(), StoreError> {
        self.metadata = Some(metadata);
        Ok(())
    }

    fn sync_metadata(&self) -> Result<Option<SyncMetadata>, StoreError> {
        Ok(self.metadata.clone())
    }
}

/// A [`MemoryStore`] mirrored to a JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let inner = if path.exists() {
            let file = File::open(path).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                StoreError::Serialization {
                    path: path.to_path_buf(),
                    source,
                }
            })?
        } else {
            MemoryStore::new()
        };
        debug!(
            "Opened store {:?} with {} order(s)",
            path,
            inner.orders.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn orders(&self) -> &[PersistedOrder] {
        self.inner.orders()
    }

    /// Writes the document to a sibling temp file and renames it over the
    /// store file.
    fn persist(&self) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let file = File::create(&tmp).map_err(io_error)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.inner).map_err(|source| {
                StoreError::Serialization {
                    path: self.path.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(io_error)?;
        }
        fs::rename(&tmp, &self.path).map_err(io_error)
    }
}

impl OrderStore for JsonFileStore {
    fn find_by_key(&self, key: &NaturalKey<'_>) -> Result<Option<PersistedOrder>, StoreError> {
        self.inner.find_by_key(key)
    }

    fn create(&mut self, order: PersistedOrder) -> Result<(), StoreError> {
        self.inner.create(order)?;
        if let Err(err) = self.persist() {
            self.inner.orders.pop();
            return Err(err);
        }
        Ok(())
    }

    fn update(&mut self, order: PersistedOrder) -> Result<(), StoreError> {
        let idx = self.inner.position(order.id)?;
        let previous = std::mem::replace(&mut self.inner.orders[idx], order);
        if let Err(err) = self.persist() {
            self.inner.orders[idx] = previous;
            return Err(err);
        }
        Ok(())
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.inner.count()
    }
}

impl SettingsStore for JsonFileStore {
    fn upsert_sync_metadata(&mut self, metadata: SyncMetadata) -> Result<(), StoreError> {
        let previous = self.inner.metadata.replace(metadata);
        if let Err(err) = self.persist() {
            self.inner.metadata = previous;
            return Err(err);
        }
        Ok(())
    }

    fn sync_metadata(&self) -> Result<Option<SyncMetadata>, StoreError> {
        self.inner.sync_metadata()
    }
}
