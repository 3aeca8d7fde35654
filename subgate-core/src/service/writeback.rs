//! Persisting per-video flags from video update payloads

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    models::{PluginData, Video, VideoFlags, FIELD_DENY_DOWNLOAD, FIELD_SUBSCRIBER_ONLY},
    repository::FlagStore,
    service::PolicyService,
};

/// What a writeback attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "flags", rename_all = "kebab-case")]
pub enum WritebackOutcome {
    /// A global override is active, per-video flags are not recorded
    GlobalOverride,
    /// The body carried no plugin data
    NothingToWrite,
    /// The updated video has no UUID to key the record on
    MissingUuid,
    Stored(VideoFlags),
    Failed,
}

/// Records the per-video flags submitted with a video update
#[derive(Clone)]
pub struct FlagWriteback {
    flags: Arc<dyn FlagStore>,
    policy: Arc<PolicyService>,
}

impl std::fmt::Debug for FlagWriteback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagWriteback").finish_non_exhaustive()
    }
}

/// Flags submitted in an update body, unset fields read as `false`
#[must_use]
pub fn flags_from_body(body: &Value) -> Option<VideoFlags> {
    let data = PluginData::from_body(body)?;
    Some(VideoFlags::new(
        data.flag(FIELD_SUBSCRIBER_ONLY).unwrap_or(false),
        data.flag(FIELD_DENY_DOWNLOAD).unwrap_or(false),
    ))
}

impl FlagWriteback {
    #[must_use]
    pub fn new(flags: Arc<dyn FlagStore>, policy: Arc<PolicyService>) -> Self {
        Self { flags, policy }
    }

    /// Handle a video update. Failures are logged, never returned.
    pub async fn on_video_updated(&self, body: &Value, video: &Video) -> WritebackOutcome {
        let policy = self.policy.snapshot();
        if policy.any_override() {
            debug!(
                video_id = ?video.id,
                "Global override active, skipping per-video flag writeback"
            );
            return WritebackOutcome::GlobalOverride;
        }

        let Some(flags) = flags_from_body(body) else {
            return WritebackOutcome::NothingToWrite;
        };

        let Some(uuid) = video.uuid else {
            debug!(video_id = ?video.id, "Updated video has no uuid, flags not stored");
            return WritebackOutcome::MissingUuid;
        };

        match self.flags.set(&uuid, flags).await {
            Ok(()) => {
                info!(
                    video_id = ?video.id,
                    video_uuid = %uuid,
                    subscriber_only = ?flags.subscriber_only,
                    deny_download = ?flags.deny_download,
                    "Stored video flags"
                );
                WritebackOutcome::Stored(flags)
            }
            Err(e) => {
                error!(
                    video_id = ?video.id,
                    video_uuid = %uuid,
                    error = %e,
                    "Failed to store video flags"
                );
                WritebackOutcome::Failed
            }
        }
    }
}
