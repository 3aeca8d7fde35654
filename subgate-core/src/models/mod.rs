pub mod access;
pub mod flags;
pub mod id;
pub mod policy;
pub mod video;

pub use access::{AccessDecision, AccessReason, ChannelMembership};
pub use flags::{
    normalize_flag, EffectiveFlags, FlagEncoding, VideoFlags, FIELD_DENY_DOWNLOAD,
    FIELD_SUBSCRIBER_ONLY,
};
pub use id::{ChannelId, UserId, VideoId};
pub use policy::{
    PolicyConfig, SettingEntries, SETTING_DEFAULT_DENY_DOWNLOAD, SETTING_DEFAULT_SUBSCRIBER_ONLY,
    SETTING_GLOBAL_DENY_DOWNLOAD, SETTING_GLOBAL_SUBSCRIBER_ONLY, SETTING_REMOVE_SUBSCRIBE_BUTTON,
};
pub use video::{ChannelRef, DownloadVerdict, PluginData, Video, VideoList, FIELD_RESTRICTED};
