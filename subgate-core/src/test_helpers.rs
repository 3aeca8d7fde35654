//! In-memory fakes and fixtures for subgate-core tests

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    hooks::PluginHooks,
    models::{
        ChannelId, ChannelRef, PolicyConfig, SettingEntries, UserId, Video, VideoFlags, VideoId,
    },
    repository::{FlagStore, KeyValueStore, MembershipResolver, SettingsSource},
    service::{AccessService, FlagWriteback, PolicyService},
    Error, Result,
};

/// Deterministic UUID for test video `n`
pub fn test_uuid(n: i64) -> Uuid {
    Uuid::from_u128(0x5ab0_0000_0000_4000_8000_0000_0000_0000 | n as u128)
}

/// Settings entries from a JSON object literal
pub fn settings(value: Value) -> SettingEntries {
    match value {
        Value::Object(map) => map,
        other => panic!("settings fixture must be an object, got {other}"),
    }
}

fn injected(what: &str) -> Error {
    Error::Internal(format!("injected {what} failure"))
}

/// Settings source returning a fixed set of entries
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    entries: SettingEntries,
}

impl StaticSettings {
    pub fn new(entries: SettingEntries) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl SettingsSource for StaticSettings {
    async fn get_settings(&self, names: &[&str]) -> Result<SettingEntries> {
        Ok(self
            .entries
            .iter()
            .filter(|(name, _)| names.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }
}

/// Plugin storage kept in a shared map, counting reads
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<HashMap<String, Value>>>,
    single_reads: Arc<AtomicUsize>,
    batch_reads: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn insert(&self, key: &str, value: Value) {
        self.data.lock().insert(key.to_string(), value);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    pub fn single_reads(&self) -> usize {
        self.single_reads.load(Ordering::SeqCst)
    }

    pub fn batch_reads(&self) -> usize {
        self.batch_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get_data(&self, key: &str) -> Result<Option<Value>> {
        self.single_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.raw(key))
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
        self.batch_reads.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock();
        Ok(keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn store_data(&self, key: &str, value: &Value) -> Result<()> {
        self.insert(key, value.clone());
        Ok(())
    }
}

/// Flag store kept in a shared map, with injectable failures
///
/// Only `get` and `set` are implemented, so `get_many` uses the trait's
/// default fan-out.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: Arc<Mutex<HashMap<Uuid, VideoFlags>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryFlagStore {
    pub fn insert(&self, uuid: Uuid, flags: VideoFlags) {
        self.flags.lock().insert(uuid, flags);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get(&self, uuid: &Uuid) -> Result<Option<VideoFlags>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("flag read"));
        }
        Ok(self.flags.lock().get(uuid).copied())
    }

    async fn set(&self, uuid: &Uuid, flags: VideoFlags) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("flag write"));
        }
        self.insert(*uuid, flags.or_defaults());
        Ok(())
    }
}

/// Membership answers from fixed relationships
#[derive(Debug, Clone, Default)]
pub struct FakeMembership {
    admins: HashSet<UserId>,
    owned_channels: HashMap<UserId, HashSet<ChannelId>>,
    owned_videos: HashMap<UserId, HashSet<VideoId>>,
    followed: HashMap<UserId, HashSet<ChannelId>>,
}

impl FakeMembership {
    pub fn with_admin(mut self, user_id: UserId) -> Self {
        self.admins.insert(user_id);
        self
    }

    pub fn with_owned(mut self, user_id: UserId, channel_id: ChannelId, videos: &[VideoId]) -> Self {
        self.owned_channels.entry(user_id).or_default().insert(channel_id);
        self.owned_videos
            .entry(user_id)
            .or_default()
            .extend(videos.iter().copied());
        self
    }

    pub fn with_follow(mut self, user_id: UserId, channel_id: ChannelId) -> Self {
        self.followed.entry(user_id).or_default().insert(channel_id);
        self
    }
}

#[async_trait]
impl MembershipResolver for FakeMembership {
    async fn is_root_admin(&self, user_id: UserId) -> Result<bool> {
        Ok(self.admins.contains(&user_id))
    }

    async fn is_video_owner(&self, user_id: UserId, video_id: VideoId) -> Result<bool> {
        Ok(self
            .owned_videos
            .get(&user_id)
            .is_some_and(|videos| videos.contains(&video_id)))
    }

    async fn owned_channel_ids(&self, user_id: UserId) -> Result<HashSet<ChannelId>> {
        Ok(self.owned_channels.get(&user_id).cloned().unwrap_or_default())
    }

    async fn followed_channel_ids(&self, user_id: UserId) -> Result<HashSet<ChannelId>> {
        Ok(self.followed.get(&user_id).cloned().unwrap_or_default())
    }
}

/// Test fixture builder for Video
pub struct VideoFixture {
    video: Video,
}

impl VideoFixture {
    pub fn new(id: i64, channel_id: i64) -> Self {
        Self {
            video: Video {
                id: Some(VideoId(id)),
                name: Some(format!("Video {id}")),
                channel: Some(ChannelRef::new(ChannelId(channel_id))),
                ..Video::default()
            },
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.video.uuid = Some(uuid);
        self
    }

    pub fn without_channel(mut self) -> Self {
        self.video.channel = None;
        self.video.channel_id = None;
        self.video.video_channel = None;
        self
    }

    pub fn with_media(mut self) -> Self {
        let id = self.video.id.map_or(0, VideoId::as_i64);
        self.video.download_enabled = Some(true);
        self.video.files = Some(vec![json!({"fileUrl": format!("https://cdn.test/{id}-720.mp4")})]);
        self.video.streaming_playlists =
            Some(vec![json!({"playlistUrl": format!("https://cdn.test/{id}/master.m3u8")})]);
        self
    }

    pub fn build(self) -> Video {
        self.video
    }
}

/// Access service over the given fakes
pub fn access_service(
    flags: MemoryFlagStore,
    membership: FakeMembership,
    policy: PolicyConfig,
) -> AccessService {
    AccessService::new(
        Arc::new(flags),
        Arc::new(membership),
        Arc::new(PolicyService::new(policy)),
    )
}

/// Hook dispatcher over the given fakes, sharing one flag store and policy
pub fn plugin_hooks(
    flags: MemoryFlagStore,
    membership: FakeMembership,
    policy: PolicyConfig,
) -> PluginHooks {
    let flags: Arc<dyn FlagStore> = Arc::new(flags);
    let policy = Arc::new(PolicyService::new(policy));
    let access = AccessService::new(flags.clone(), Arc::new(membership), policy.clone());
    PluginHooks::new(access, FlagWriteback::new(flags, policy))
}
