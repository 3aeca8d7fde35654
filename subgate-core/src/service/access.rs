//! Access decisions for subscriber-only videos
//!
//! Two policies are layered here. Visibility: a restricted video is visible to
//! the root administrator, to the owner of its channel and to followers of its
//! channel. Download: a deny-download video cannot be downloaded by anyone,
//! and otherwise a download needs visibility.
//!
//! Every lookup failure ends in a denial. Errors are logged here and never
//! handed back to hook callers.

use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    models::{
        AccessDecision, AccessReason, DownloadVerdict, EffectiveFlags, PolicyConfig, UserId, Video,
    },
    repository::{FlagStore, MembershipResolver},
    service::PolicyService,
    Result,
};

/// Denial message when deny-download is in effect
pub const MSG_DOWNLOADS_DISABLED: &str = "Downloads are disabled for this video.";
/// Denial message when the requester may not view the video
pub const MSG_SUBSCRIBERS_ONLY: &str = "This video is restricted to channel subscribers.";

/// The access decision engine
#[derive(Clone)]
pub struct AccessService {
    flags: Arc<dyn FlagStore>,
    membership: Arc<dyn MembershipResolver>,
    policy: Arc<PolicyService>,
}

impl std::fmt::Debug for AccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AccessService {
    #[must_use]
    pub fn new(
        flags: Arc<dyn FlagStore>,
        membership: Arc<dyn MembershipResolver>,
        policy: Arc<PolicyService>,
    ) -> Self {
        Self {
            flags,
            membership,
            policy,
        }
    }

    /// Current policy snapshot
    #[must_use]
    pub fn policy(&self) -> Arc<PolicyConfig> {
        self.policy.snapshot()
    }

    #[must_use]
    pub fn flag_store(&self) -> &Arc<dyn FlagStore> {
        &self.flags
    }

    #[must_use]
    pub fn membership(&self) -> &Arc<dyn MembershipResolver> {
        &self.membership
    }

    /// Flags enforced for a video under the given policy
    ///
    /// Videos without a UUID or without a record get the defaults. A failed
    /// read yields [`EffectiveFlags::fail_closed`].
    pub async fn effective_flags(&self, video: &Video, policy: &PolicyConfig) -> EffectiveFlags {
        if policy.global_subscriber_only && policy.global_deny_download {
            return EffectiveFlags::resolve(policy, None);
        }

        let Some(uuid) = video.uuid else {
            return EffectiveFlags::resolve(policy, None);
        };

        match self.flags.get(&uuid).await {
            Ok(stored) => EffectiveFlags::resolve(policy, stored.as_ref()),
            Err(e) => {
                error!(
                    video_id = ?video.id,
                    video_uuid = %uuid,
                    error = %e,
                    "Failed to read video flags, denying access"
                );
                EffectiveFlags::fail_closed()
            }
        }
    }

    /// Decide visibility given already resolved flags
    ///
    /// Lookups run in order admin, owner, follower and stop at the first one
    /// that grants access. Lookup errors are returned as-is.
    pub async fn check_view(
        &self,
        user_id: Option<UserId>,
        video: &Video,
        flags: EffectiveFlags,
    ) -> Result<AccessDecision> {
        if !flags.subscriber_only {
            return Ok(AccessDecision::allow(AccessReason::Ok));
        }

        let Some(user_id) = user_id else {
            return Ok(AccessDecision::deny(AccessReason::NotAuthenticated));
        };

        if self.membership.is_root_admin(user_id).await? {
            return Ok(AccessDecision::allow(AccessReason::AdminBypass));
        }

        let (Some(video_id), Some(channel_id)) = (video.id, video.channel_id()) else {
            return Ok(AccessDecision::deny(AccessReason::NotSubscribed));
        };

        if self.membership.is_video_owner(user_id, video_id).await? {
            return Ok(AccessDecision::allow(AccessReason::OwnerBypass));
        }

        let followed = self.membership.followed_channel_ids(user_id).await?;
        if followed.contains(&channel_id) {
            Ok(AccessDecision::allow(AccessReason::Ok))
        } else {
            Ok(AccessDecision::deny(AccessReason::NotSubscribed))
        }
    }

    /// [`check_view`](Self::check_view) with failures resolved to a denial
    pub async fn view_allowed(
        &self,
        user_id: Option<UserId>,
        video: &Video,
        flags: EffectiveFlags,
    ) -> bool {
        match self.check_view(user_id, video, flags).await {
            Ok(decision) => {
                debug!(
                    user_id = ?user_id,
                    video_id = ?video.id,
                    allowed = decision.allowed,
                    reason = ?decision.reason,
                    "Evaluated video visibility"
                );
                decision.allowed
            }
            Err(e) => {
                error!(
                    user_id = ?user_id,
                    video_id = ?video.id,
                    error = %e,
                    "Failed to check subscriber-only access"
                );
                false
            }
        }
    }

    /// Whether the requester may view the video
    pub async fn can_view(&self, user_id: Option<UserId>, video: &Video) -> bool {
        let policy = self.policy.snapshot();
        let flags = self.effective_flags(video, &policy).await;
        self.view_allowed(user_id, video, flags).await
    }

    /// Narrow an upstream download verdict
    ///
    /// Never grants a download the host already refused.
    pub async fn can_download(
        &self,
        user_id: Option<UserId>,
        video: &Video,
        upstream: DownloadVerdict,
    ) -> DownloadVerdict {
        if !upstream.allowed {
            return upstream;
        }

        let policy = self.policy.snapshot();
        let flags = self.effective_flags(video, &policy).await;

        if flags.deny_download {
            return DownloadVerdict::denied(MSG_DOWNLOADS_DISABLED);
        }

        if self.view_allowed(user_id, video, flags).await {
            upstream
        } else {
            DownloadVerdict::denied(MSG_SUBSCRIBERS_ONLY)
        }
    }
}
