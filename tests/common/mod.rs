#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use order_sync::columns::SchemaVariant;
use order_sync::config::SourceConfig;
use order_sync::error::{FetchError, StoreError};
use order_sync::fetch::SheetFetcher;
use order_sync::store::{
    MemoryStore, NaturalKey, OrderStore, PersistedOrder, SettingsStore, SyncMetadata,
};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Reads a fixture under `tests/data` as UTF-8 text.
pub fn fixture_text(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("read fixture")
}

/// Builds a source whose remote id is derived from its label.
pub fn source(label: &str, variant: SchemaVariant) -> SourceConfig {
    SourceConfig {
        label: label.to_string(),
        remote_id: format!("{label}-sheet"),
        tab_id: "0".to_string(),
        variant,
    }
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Serves canned sheet text per source label; unknown labels answer 404.
#[derive(Default)]
pub struct StubFetcher {
    sheets: HashMap<String, String>,
}

impl StubFetcher {
    /// Registers the sheet text served for `label`.
    pub fn with_sheet(mut self, label: &str, text: impl Into<String>) -> Self {
        self.sheets.insert(label.to_string(), text.into());
        self
    }
}

impl SheetFetcher for StubFetcher {
    fn fetch_csv(&self, source: &SourceConfig) -> Result<String, FetchError> {
        self.sheets
            .get(&source.label)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: format!("stub://{}", source.remote_id),
                status: 404,
            })
    }
}

/// A [`MemoryStore`] whose n-th create (1-based) fails.
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_on_create: usize,
    creates: usize,
}

impl FailingStore {
    /// Wraps an empty [`MemoryStore`] that rejects the `n`-th create.
    pub fn failing_on_create(n: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on_create: n,
            creates: 0,
        }
    }
}

impl OrderStore for FailingStore {
    fn find_by_key(&self, key: &NaturalKey<'_>) -> Result<Option<PersistedOrder>, StoreError> {
        self.inner.find_by_key(key)
    }

    fn create(&mut self, order: PersistedOrder) -> Result<(), StoreError> {
        self.creates += 1;
        if self.creates == self.fail_on_create {
            return Err(StoreError::Backend("simulated write failure".to_string()));
        }
        self.inner.create(order)
    }

    fn update(&mut self, order: PersistedOrder) -> Result<(), StoreError> {
        self.inner.update(order)
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.inner.count()
    }
}

impl SettingsStore for FailingStore {
    fn upsert_sync_metadata(&mut self, metadata: SyncMetadata) -> Result<(), StoreError> {
        self.inner.upsert_sync_metadata(metadata)
    }

    fn sync_metadata(&self) -> Result<Option<SyncMetadata>, StoreError> {
        self.inner.sync_metadata()
    }
}
