//! Per-video flag persistence

use std::collections::HashMap;

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use uuid::Uuid;

use super::KeyValueStore;
use crate::{models::VideoFlags, Result};

/// Storage key prefix for per-video flag records
pub const VIDEO_FLAGS_STORAGE_PREFIX: &str = "video-flags:";

/// Concurrent single-video reads issued by the default `get_many`
pub const DEFAULT_FLAG_FETCH_CONCURRENCY: usize = 8;

/// Storage key for a video's flags
#[must_use]
pub fn storage_key(uuid: &Uuid) -> String {
    format!("{VIDEO_FLAGS_STORAGE_PREFIX}{uuid}")
}

/// Read/write access to per-video flags, keyed by video UUID
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Flags stored for a video, `None` when nothing usable was stored
    async fn get(&self, uuid: &Uuid) -> Result<Option<VideoFlags>>;

    /// Persist flags for a video in canonical form
    async fn set(&self, uuid: &Uuid, flags: VideoFlags) -> Result<()>;

    /// Flags for several videos; videos without a record are left out
    ///
    /// The default issues single reads with bounded concurrency. Stores that
    /// can answer in one round trip should override it.
    async fn get_many(&self, uuids: &[Uuid]) -> Result<HashMap<Uuid, VideoFlags>> {
        stream::iter(uuids.iter().copied())
            .map(|uuid| async move { self.get(&uuid).await.map(|flags| (uuid, flags)) })
            .buffered(DEFAULT_FLAG_FETCH_CONCURRENCY)
            .try_filter_map(|(uuid, flags)| async move { Ok(flags.map(|f| (uuid, f))) })
            .try_collect()
            .await
    }
}

/// `FlagStore` on top of the plugin key-value storage
#[derive(Debug, Clone)]
pub struct StoredFlags<S> {
    storage: S,
}

impl<S: KeyValueStore> StoredFlags<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: KeyValueStore> FlagStore for StoredFlags<S> {
    async fn get(&self, uuid: &Uuid) -> Result<Option<VideoFlags>> {
        match self.storage.get_data(&storage_key(uuid)).await? {
            Some(raw) => VideoFlags::from_stored(&raw),
            None => Ok(None),
        }
    }

    async fn set(&self, uuid: &Uuid, flags: VideoFlags) -> Result<()> {
        self.storage
            .store_data(&storage_key(uuid), &flags.to_stored())
            .await
    }

    async fn get_many(&self, uuids: &[Uuid]) -> Result<HashMap<Uuid, VideoFlags>> {
        let keys: Vec<String> = uuids.iter().map(storage_key).collect();
        let mut raw = self.storage.get_many(&keys).await?;

        let mut flags = HashMap::with_capacity(raw.len());
        for (uuid, key) in uuids.iter().zip(&keys) {
            let Some(value) = raw.remove(key) else {
                continue;
            };
            if let Some(stored) = VideoFlags::from_stored(&value)? {
                flags.insert(*uuid, stored);
            }
        }
        Ok(flags)
    }
}
