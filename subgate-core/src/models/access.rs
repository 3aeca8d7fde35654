use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ChannelId;

/// Why a view decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessReason {
    /// Video is unrestricted, or the requester follows the channel
    Ok,
    NotAuthenticated,
    NotSubscribed,
    AdminBypass,
    OwnerBypass,
}

/// Result of a visibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    #[must_use]
    pub const fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    #[must_use]
    pub const fn deny(reason: AccessReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Channels a requester owns or follows, resolved once per list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMembership {
    pub owned: HashSet<ChannelId>,
    pub followed: HashSet<ChannelId>,
}

impl ChannelMembership {
    /// Whether the requester owns or follows the channel
    #[must_use]
    pub fn grants(&self, channel_id: ChannelId) -> bool {
        self.owned.contains(&channel_id) || self.followed.contains(&channel_id)
    }
}
