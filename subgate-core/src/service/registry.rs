//! Settings and per-video form fields registered with the host

use serde::Serialize;
use serde_json::Value;

use crate::models::{
    SettingEntries, FIELD_DENY_DOWNLOAD, FIELD_SUBSCRIBER_ONLY, SETTING_DEFAULT_DENY_DOWNLOAD,
    SETTING_DEFAULT_SUBSCRIBER_ONLY, SETTING_GLOBAL_DENY_DOWNLOAD, SETTING_GLOBAL_SUBSCRIBER_ONLY,
    SETTING_REMOVE_SUBSCRIBE_BUTTON,
};

const INPUT_CHECKBOX: &str = "input-checkbox";

/// Tab of the video edit form that carries the plugin fields
pub const VIDEO_FIELD_TAB: &str = "plugin-settings";

/// An administrator-facing plugin setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDefinition {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub private: bool,
    pub default: bool,
    #[serde(rename = "descriptionHTML")]
    pub description_html: &'static str,
}

impl SettingDefinition {
    const fn checkbox(name: &'static str, label: &'static str, description: &'static str) -> Self {
        Self {
            name,
            label,
            kind: INPUT_CHECKBOX,
            private: false,
            default: false,
            description_html: description,
        }
    }
}

/// The plugin's settings, in registration order
pub const SETTINGS: [SettingDefinition; 5] = [
    SettingDefinition::checkbox(
        SETTING_REMOVE_SUBSCRIBE_BUTTON,
        "Remove subscribe button",
        "Remove the subscribe button on video and channel pages.",
    ),
    SettingDefinition::checkbox(
        SETTING_DEFAULT_SUBSCRIBER_ONLY,
        "Default: Subscribers only",
        "Default value for \"Subscribers only\" on video upload/creation.",
    ),
    SettingDefinition::checkbox(
        SETTING_DEFAULT_DENY_DOWNLOAD,
        "Default: Deny downloads",
        "Default value for \"Deny downloads\" on video upload/creation.",
    ),
    SettingDefinition::checkbox(
        SETTING_GLOBAL_SUBSCRIBER_ONLY,
        "Global: Subscribers only",
        "Force all videos to be subscribers-only (overrides per-video setting).",
    ),
    SettingDefinition::checkbox(
        SETTING_GLOBAL_DENY_DOWNLOAD,
        "Global: Deny downloads",
        "Force downloads to be disabled for all videos (overrides per-video setting).",
    ),
];

/// Video edit screens that show the plugin fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoFormContext {
    Update,
    Upload,
    ImportUrl,
    ImportTorrent,
    GoLive,
}

impl VideoFormContext {
    pub const ALL: [Self; 5] = [
        Self::Update,
        Self::Upload,
        Self::ImportUrl,
        Self::ImportTorrent,
        Self::GoLive,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Upload => "upload",
            Self::ImportUrl => "import-url",
            Self::ImportTorrent => "import-torrent",
            Self::GoLive => "go-live",
        }
    }
}

/// A per-video checkbox on a video edit screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFormField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub hidden: bool,
    pub default: bool,
    #[serde(rename = "descriptionHTML")]
    pub description_html: &'static str,
    pub context: VideoFormContext,
    pub tab: &'static str,
}

fn enabled(settings: &SettingEntries, name: &str) -> bool {
    matches!(settings.get(name), Some(Value::Bool(true)))
}

/// Form fields for every video edit screen under the given settings
///
/// A field is hidden while the matching global override is on; its default
/// comes from the matching `default-*` setting.
#[must_use]
pub fn video_form_fields(settings: &SettingEntries) -> Vec<VideoFormField> {
    let subscriber_only_hidden = enabled(settings, SETTING_GLOBAL_SUBSCRIBER_ONLY);
    let deny_download_hidden = enabled(settings, SETTING_GLOBAL_DENY_DOWNLOAD);
    let subscriber_only_default = enabled(settings, SETTING_DEFAULT_SUBSCRIBER_ONLY);
    let deny_download_default = enabled(settings, SETTING_DEFAULT_DENY_DOWNLOAD);

    VideoFormContext::ALL
        .into_iter()
        .flat_map(|context| {
            [
                VideoFormField {
                    name: FIELD_SUBSCRIBER_ONLY,
                    label: "Subscribers only",
                    kind: INPUT_CHECKBOX,
                    hidden: subscriber_only_hidden,
                    default: subscriber_only_default,
                    description_html: "Limit playback to subscribers of this channel.",
                    context,
                    tab: VIDEO_FIELD_TAB,
                },
                VideoFormField {
                    name: FIELD_DENY_DOWNLOAD,
                    label: "Disable downloads",
                    kind: INPUT_CHECKBOX,
                    hidden: deny_download_hidden,
                    default: deny_download_default,
                    description_html: "Prevent all users from downloading this video.",
                    context,
                    tab: VIDEO_FIELD_TAB,
                },
            ]
        })
        .collect()
}
