//! JSON file storage for crawl output, keyed by product slug.
//!
//! Raw fetch snapshots are kept per run (`<slug>_<YYYYmmdd_HHMMSS>.json`);
//! processed records keep only the latest version (`<slug>_latest.json`).

mod slug;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use pricetl_core::ProcessedRecord;

pub use slug::{sanitize_filename, slug_from_url};

const LATEST_SUFFIX: &str = "_latest.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse stored file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Envelope metadata written next to every stored payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMetadata {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub slug: String,
}

/// A processed record as persisted: `{ metadata, data }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub metadata: StoredMetadata,
    pub data: ProcessedRecord,
}

/// Directory pair holding raw snapshots and processed records.
#[derive(Debug, Clone)]
pub struct Store {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl Store {
    /// Opens the store, creating both directories if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if a directory cannot be created.
    pub fn open(
        raw_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let store = Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
        };
        for dir in [&store.raw_dir, &store.processed_dir] {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        }
        Ok(store)
    }

    #[must_use]
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    #[must_use]
    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Writes a timestamped raw snapshot of a fetch.
    ///
    /// `extra_metadata` entries are merged into the envelope metadata after
    /// `url`, `timestamp` and `slug`, which they cannot override.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the payload cannot be serialized or written.
    pub fn save_raw<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
        extra_metadata: Map<String, Value>,
        timestamp: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        let slug = slug_from_url(url);
        let envelope_meta = StoredMetadata {
            url: url.to_string(),
            timestamp,
            slug: slug.clone(),
        };

        let mut metadata = extra_metadata;
        if let Value::Object(base) = to_value(&envelope_meta, "raw metadata")? {
            metadata.extend(base);
        }

        let mut envelope = Map::new();
        envelope.insert("metadata".to_string(), Value::Object(metadata));
        envelope.insert("data".to_string(), to_value(payload, "raw payload")?);

        let path = self
            .raw_dir
            .join(format!("{slug}_{}.json", timestamp.format("%Y%m%d_%H%M%S")));
        write_json(&path, &Value::Object(envelope))?;
        tracing::debug!(path = %path.display(), "saved raw snapshot");
        Ok(path)
    }

    /// Writes the processed record, replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be serialized or written.
    pub fn save_processed(
        &self,
        url: &str,
        record: &ProcessedRecord,
        timestamp: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        let slug = slug_from_url(url);
        let stored = StoredRecord {
            metadata: StoredMetadata {
                url: url.to_string(),
                timestamp,
                slug: slug.clone(),
            },
            data: record.clone(),
        };
        let path = self.processed_path(&slug);
        write_json(&path, &to_value(&stored, "processed record")?)?;
        tracing::debug!(path = %path.display(), offers = record.offers.len(), "saved processed record");
        Ok(path)
    }

    /// Reads the latest processed record for `slug`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or parsed.
    pub fn load_processed(&self, slug: &str) -> Result<Option<StoredRecord>, StoreError> {
        let path = self.processed_path(&sanitize_filename(slug));
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(io_error(&path, source)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: path.display().to_string(),
                source,
            })
    }

    /// Paths of all processed records, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be listed.
    pub fn list_processed(&self) -> Result<Vec<PathBuf>, StoreError> {
        list_json(&self.processed_dir, |name| name.ends_with(LATEST_SUFFIX))
    }

    /// Paths of raw snapshots, optionally only those of `slug`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be listed.
    pub fn list_raw(&self, slug: Option<&str>) -> Result<Vec<PathBuf>, StoreError> {
        let prefix = slug.map(|s| format!("{}_", sanitize_filename(s)));
        list_json(&self.raw_dir, |name| {
            prefix.as_deref().is_none_or(|p| name.starts_with(p))
        })
    }

    fn processed_path(&self, slug: &str) -> PathBuf {
        self.processed_dir.join(format!("{slug}{LATEST_SUFFIX}"))
    }
}

/// Slug of a processed record file name, e.g. `banany` for `banany_latest.json`.
#[must_use]
pub fn slug_of_processed(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.strip_suffix(LATEST_SUFFIX)
}

fn list_json(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && name.ends_with(".json") && keep(name) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn to_value<T: Serialize>(value: &T, context: &str) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|source| StoreError::Serialize {
        context: context.to_string(),
        source,
    })
}

fn write_json(path: &Path, value: &Value) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
        context: path.display().to_string(),
        source,
    })?;
    fs::write(path, content).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
