// Single-slot JSON cache of the aggregate, valid for the calendar day it was written.
// Freshness comes from the file's mtime in local time; there is no TTL and no in-document timestamp.
// Read or parse failures count as a miss; write failures are logged and dropped.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::clock::Clock;
use crate::models::CachedAggregate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// File exists and was last written today.
    Fresh,
    /// File absent, unreadable, or last written on an earlier day.
    Stale,
}

pub struct DailyCache {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl DailyCache {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last write time in local time, if the file exists.
    pub async fn modified_at(&self) -> Option<DateTime<Local>> {
        let meta = tokio::fs::metadata(&self.path).await.ok()?;
        let modified = meta.modified().ok()?;
        Some(DateTime::<Local>::from(modified))
    }

    pub async fn state(&self) -> CacheState {
        match self.modified_at().await {
            Some(at) if at.date_naive() == self.clock.today() => CacheState::Fresh,
            _ => CacheState::Stale,
        }
    }

    /// Reads the slot. None on any read or parse failure so the caller regenerates.
    #[instrument(skip(self), fields(cache = %self.path.display(), operation = "load"))]
    pub async fn load(&self) -> Option<CachedAggregate> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "cache read failed; treating as miss");
                return None;
            }
        };
        match serde_json::from_slice::<CachedAggregate>(&bytes) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "cache parse failed; treating as miss");
                None
            }
        }
    }

    /// Overwrites the slot (temp file + rename). Never fails the caller.
    #[instrument(skip(self, data), fields(cache = %self.path.display(), operation = "store", records = data.aggregate.len()))]
    pub async fn store(&self, data: &CachedAggregate) {
        if let Err(e) = self.try_store(data).await {
            warn!(error = %e, "cache write failed; snapshot served without persisting");
        }
    }

    async fn try_store(&self, data: &CachedAggregate) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(bytes = json.len(), "cache stored");
        Ok(())
    }
}
