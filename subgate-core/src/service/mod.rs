pub mod access;
pub mod list_filter;
pub mod policy;
pub mod redactor;
pub mod registry;
pub mod settings;
pub mod writeback;

pub use access::{AccessService, MSG_DOWNLOADS_DISABLED, MSG_SUBSCRIBERS_ONLY};
pub use list_filter::ListFilter;
pub use policy::{PolicyService, POLICY_SETTINGS};
pub use redactor::{DetailRedactor, ResolvedVideo};
pub use registry::{video_form_fields, SettingDefinition, VideoFormContext, VideoFormField, SETTINGS};
pub use settings::SettingsHub;
pub use writeback::{flags_from_body, FlagWriteback, WritebackOutcome};
