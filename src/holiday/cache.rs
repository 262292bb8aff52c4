use super::provider::HolidayApiClient;
use super::types::*;
use crate::upstream::UpstreamError;
use chrono::{DateTime, Duration, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// How long a fetched holiday list may be served before it is refetched.
pub const CACHE_TTL_SECS: i64 = 60 * 60;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to replace cache record: {0}")]
    Persist(#[source] std::io::Error),
    #[error("cache writer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Single-record, file-backed holiday cache.
///
/// There is no locking: concurrent misses each refresh and each write the
/// record, and the last rename wins. Every write goes through a temp file in
/// the same directory, so readers never observe a half-written record.
#[derive(Clone)]
pub struct HolidayCache {
    path: PathBuf,
    ttl: Duration,
    provider: Arc<HolidayApiClient>,
}

impl HolidayCache {
    pub fn new(path: PathBuf, provider: Arc<HolidayApiClient>) -> Self {
        Self {
            path,
            ttl: Duration::seconds(CACHE_TTL_SECS),
            provider,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached dataset only while its expiry lies in the future.
    /// A missing, unreadable, corrupt or stale record all read as `None`.
    pub async fn get(&self) -> Option<HolidayDataset> {
        let now = Utc::now();
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "holiday cache miss: no cache file");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "holiday cache unreadable: {}", e);
                return None;
            }
        };

        let dataset: HolidayDataset = match serde_json::from_slice(&raw) {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "holiday cache corrupt: {}", e);
                return None;
            }
        };

        if !dataset.is_fresh(now) {
            tracing::info!(expired_at = %dataset.expires_at, "holiday cache miss: record is stale");
            return None;
        }

        tracing::info!(holidays = dataset.holidays.len(), "using valid cache data");
        Some(dataset)
    }

    /// Builds the dataset for a fetch that started at `fetched_at`.
    pub fn stamp(&self, holidays: Vec<HolidayRecord>, fetched_at: DateTime<Utc>) -> HolidayDataset {
        HolidayDataset {
            holidays,
            expires_at: fetched_at + self.ttl,
        }
    }

    /// Replaces the durable record with `dataset`.
    pub async fn put(&self, dataset: &HolidayDataset) -> Result<(), CacheError> {
        let contents = serde_json::to_vec_pretty(dataset)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &contents)).await??;
        Ok(())
    }

    /// Fetches a fresh holiday list, hands it straight back and persists it in
    /// the background. A failed write is logged and otherwise ignored.
    pub async fn refresh(&self, year: i32, country: &str) -> Result<HolidayDataset, UpstreamError> {
        let query_time = Utc::now();
        tracing::info!(country, year, "calling holiday API");

        let holidays = self.provider.get_holidays(country, year).await?;
        let dataset = self.stamp(holidays, query_time);

        let cache = self.clone();
        let record = dataset.clone();
        tokio::spawn(async move {
            match cache.put(&record).await {
                Ok(()) => tracing::info!(
                    path = %cache.path().display(),
                    "created cache file and inserted holiday data"
                ),
                Err(e) => tracing::error!(
                    path = %cache.path().display(),
                    "failed to write holiday cache: {}", e
                ),
            }
        });

        Ok(dataset)
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), CacheError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CacheError::Persist(e.error))?;
    Ok(())
}
