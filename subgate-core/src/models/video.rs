//! Typed views over the host's video payloads
//!
//! Only the fields the access rules read or rewrite are typed. Everything else
//! rides along in `extra` so a record passes through unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    flags::{normalize_flag, EffectiveFlags, FIELD_DENY_DOWNLOAD, FIELD_SUBSCRIBER_ONLY},
    ChannelId, VideoId,
};

/// Plugin data key set on videos that were redacted
pub const FIELD_RESTRICTED: &str = "subscriber-only-blocked";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Plugin-visible metadata attached to a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginData(pub Map<String, Value>);

impl PluginData {
    /// Extract `pluginData` from a loosely shaped request body
    ///
    /// `None` when the body is not an object or carries no object under
    /// `pluginData`.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        body.as_object()?
            .get("pluginData")?
            .as_object()
            .map(|map| Self(map.clone()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalized value of a flag field, `None` when absent or unrecognised
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(normalize_flag)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.0.insert(key.to_string(), Value::Bool(value));
    }

    #[must_use]
    pub fn subscriber_only(&self) -> bool {
        self.flag(FIELD_SUBSCRIBER_ONLY).unwrap_or(false)
    }

    #[must_use]
    pub fn deny_download(&self) -> bool {
        self.flag(FIELD_DENY_DOWNLOAD).unwrap_or(false)
    }

    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.flag(FIELD_RESTRICTED).unwrap_or(false)
    }
}

/// Reference to a video channel embedded in a video record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChannelId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChannelRef {
    #[must_use]
    pub fn new(id: ChannelId) -> Self {
        Self {
            id: Some(id),
            extra: Map::new(),
        }
    }
}

/// A video record as seen by the hooks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VideoId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_channel: Option<ChannelRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_enabled: Option<bool>,

    // API shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_playlists: Option<Vec<Value>>,
    // Model shape
    #[serde(rename = "VideoFiles", default, skip_serializing_if = "Option::is_none")]
    pub video_files: Option<Vec<Value>>,
    #[serde(
        rename = "VideoStreamingPlaylists",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub video_streaming_playlists: Option<Vec<Value>>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "PluginData::is_empty"
    )]
    pub plugin_data: PluginData,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Video {
    /// Owning channel, looked up as `channel.id`, then `channelId`, then `videoChannel.id`
    #[must_use]
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel
            .as_ref()
            .and_then(|c| c.id)
            .or(self.channel_id)
            .or_else(|| self.video_channel.as_ref().and_then(|c| c.id))
    }

    /// Record the enforced flags in plugin data for the display layer
    pub fn annotate(&mut self, flags: EffectiveFlags) {
        self.plugin_data.set_flag(FIELD_SUBSCRIBER_ONLY, flags.subscriber_only);
        self.plugin_data.set_flag(FIELD_DENY_DOWNLOAD, flags.deny_download);
    }

    /// Strip every playable media reference and mark the record restricted
    ///
    /// The record itself (title, ids, channel) is kept so callers can render a
    /// placeholder.
    pub fn redact(&mut self) {
        self.download_enabled = Some(false);
        self.plugin_data.set_flag(FIELD_SUBSCRIBER_ONLY, true);
        self.plugin_data.set_flag(FIELD_RESTRICTED, true);

        for collection in [
            &mut self.files,
            &mut self.streaming_playlists,
            &mut self.video_files,
            &mut self.video_streaming_playlists,
        ] {
            if let Some(items) = collection {
                items.clear();
            }
        }
    }

    /// Number of media entries across all collections
    #[must_use]
    pub fn media_count(&self) -> usize {
        [
            &self.files,
            &self.streaming_playlists,
            &self.video_files,
            &self.video_streaming_playlists,
        ]
        .into_iter()
        .map(|collection| collection.as_ref().map_or(0, Vec::len))
        .sum()
    }
}

/// A page of videos as produced by a list query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub data: Vec<Video>,
    #[serde(default)]
    pub total: u64,
}

impl VideoList {
    #[must_use]
    pub fn new(data: Vec<Video>) -> Self {
        let total = data.len() as u64;
        Self { data, total }
    }
}

/// Outcome of a download permission filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadVerdict {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DownloadVerdict {
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            error_message: None,
        }
    }

    #[must_use]
    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            error_message: Some(message.into()),
        }
    }
}
