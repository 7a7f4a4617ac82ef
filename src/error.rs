//! Error types shared across the sync pipeline.
//!
//! Command handlers wrap these in `anyhow` with context. Inside a sync run
//! they are caught per source or per row and reported as strings.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// A sheet export that cannot be processed at all.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("no data: sheet has {rows} row(s)")]
    NoData { rows: usize },
}

/// Failure to download a sheet export.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("reading response body from {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure inside an order or settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} does not exist")]
    NotFound(Uuid),

    #[error("store file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path:?} is not valid JSON: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failure reported by a store implementation outside this crate, such
    /// as a database-backed [`OrderStore`](crate::store::OrderStore).
    #[error("{0}")]
    Backend(String),
}

/// Problems found while loading the source configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no sources configured")]
    NoSources,

    #[error("source label '{0}' is configured more than once")]
    DuplicateLabel(String),

    #[error("url template must contain {{remote_id}} and {{tab_id}}: {0}")]
    InvalidTemplate(String),

    #[error("current source '{0}' is not a configured label")]
    UnknownCurrentSource(String),
}
