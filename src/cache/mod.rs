// src/cache/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::RwLock,
    time::Duration,
};
use tracing::{debug, warn};

use crate::feeds::{Feed, FeedPayload};
use crate::fetch::Fetcher;

pub mod snapshot;

/// A payload and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fetched_at: DateTime<Utc>,
    pub ttl_secs: u64,
    pub payload: FeedPayload,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age.num_seconds() < self.ttl_secs as i64
    }
}

/// TTL cache of feed payloads, held in memory and optionally mirrored to
/// `<key>.json` snapshots so a restart does not refetch fresh data.
pub struct SeriesCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    dir: Option<PathBuf>,
}

impl SeriesCache {
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            dir: None,
        }
    }

    /// Cache with snapshots under `dir`, creating it if needed.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating cache directory {:?}", dir))?;
        Ok(Self {
            entries: RwLock::new(HashMap::new()),
            dir: Some(dir),
        })
    }

    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        match dir {
            Some(d) => Self::with_dir(d),
            None => Ok(Self::in_memory()),
        }
    }

    /// Fresh payload for `key`, from memory or else from its snapshot.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<FeedPayload> {
        {
            let map_r = self.entries.read().unwrap();
            if let Some(entry) = map_r.get(key) {
                if entry.is_fresh(now) {
                    return Some(entry.payload.clone());
                }
            }
        }

        let dir = self.dir.as_ref()?;
        let entry = match snapshot::read_snapshot(dir, key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Skipping corrupt snapshot");
                return None;
            }
        };
        if !entry.is_fresh(now) {
            debug!(key, fetched_at = %entry.fetched_at, "snapshot expired");
            return None;
        }
        let payload = entry.payload.clone();
        self.entries.write().unwrap().insert(key.to_string(), entry);
        Some(payload)
    }

    /// Store `payload` under `key`; also writes its snapshot when a directory is set.
    pub fn put(
        &self,
        key: &str,
        payload: FeedPayload,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = CacheEntry {
            fetched_at: now,
            ttl_secs: ttl.as_secs(),
            payload,
        };
        if let Some(dir) = &self.dir {
            snapshot::write_snapshot(dir, key, &entry)
                .with_context(|| format!("writing snapshot for {}", key))?;
        }
        self.entries.write().unwrap().insert(key.to_string(), entry);
        Ok(())
    }

    /// Cached payload for `feed`, or fetch it and cache the result. Errors are not cached.
    pub async fn get_or_fetch(&self, feed: &Feed, fetcher: &Fetcher) -> Result<FeedPayload> {
        let key = feed.cache_key();
        if let Some(hit) = self.get(&key, Utc::now()) {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }
        let payload = feed.fetch(fetcher).await?;
        if let Err(e) = self.put(&key, payload.clone(), feed.ttl(), Utc::now()) {
            warn!(key = %key, error = %e, "failed to cache payload");
        }
        Ok(payload)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
