use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Setting name: hide the subscribe button (client only)
pub const SETTING_REMOVE_SUBSCRIBE_BUTTON: &str = "remove-subscribe-button";
/// Setting name: default for the per-video subscribers-only checkbox
pub const SETTING_DEFAULT_SUBSCRIBER_ONLY: &str = "default-subscriber-only";
/// Setting name: default for the per-video deny-download checkbox
pub const SETTING_DEFAULT_DENY_DOWNLOAD: &str = "default-deny-download";
/// Setting name: force subscribers-only on every video
pub const SETTING_GLOBAL_SUBSCRIBER_ONLY: &str = "global-subscriber-only";
/// Setting name: force deny-download on every video
pub const SETTING_GLOBAL_DENY_DOWNLOAD: &str = "global-deny-download";

/// Settings entries as delivered by the host (`name -> value`)
pub type SettingEntries = Map<String, Value>;

/// Instance-wide overrides
///
/// A `true` here replaces the per-video flag entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    pub global_subscriber_only: bool,
    pub global_deny_download: bool,
}

impl PolicyConfig {
    /// Build from settings entries; only a JSON `true` enables an override
    #[must_use]
    pub fn from_settings(settings: &SettingEntries) -> Self {
        let enabled = |name: &str| matches!(settings.get(name), Some(Value::Bool(true)));

        Self {
            global_subscriber_only: enabled(SETTING_GLOBAL_SUBSCRIBER_ONLY),
            global_deny_download: enabled(SETTING_GLOBAL_DENY_DOWNLOAD),
        }
    }

    /// Whether any global override is active
    #[must_use]
    pub const fn any_override(&self) -> bool {
        self.global_subscriber_only || self.global_deny_download
    }
}
