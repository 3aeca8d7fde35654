//! Per-video access flags and their normalization
//!
//! Flags reach us from form submissions, JSON API calls and older storage
//! records, so the same boolean shows up as `"on"`, `1`, `"true"` and so on.
//! Everything funnels through [`normalize_flag`], which knows a closed set of
//! encodings and reports anything else as unset.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PolicyConfig;
use crate::{Error, Result};

fn not_an_object(raw: &Value) -> Error {
    let kind = match raw {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Null | Value::Object(_) => "value",
    };
    Error::Deserialization {
        context: format!("stored video flags must be an object, got a {kind}"),
    }
}

/// Plugin data key carrying the subscribers-only flag
pub const FIELD_SUBSCRIBER_ONLY: &str = "subscriber-only";
/// Plugin data key carrying the deny-download flag
pub const FIELD_DENY_DOWNLOAD: &str = "deny-download";

/// The accepted literal encodings of a flag value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagEncoding {
    Bool(bool),
    Int(i64),
    Text(TextFlag),
}

/// String spellings of a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFlag {
    On,
    Off,
    One,
    Zero,
    True,
    False,
}

impl FlagEncoding {
    /// Classify a raw JSON value, `None` when it is not a known encoding
    #[must_use]
    pub fn classify(raw: &Value) -> Option<Self> {
        match raw {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) => {
                let text = match s.as_str() {
                    "on" => TextFlag::On,
                    "off" => TextFlag::Off,
                    "1" => TextFlag::One,
                    "0" => TextFlag::Zero,
                    "true" => TextFlag::True,
                    "false" => TextFlag::False,
                    _ => return None,
                };
                Some(Self::Text(text))
            }
            _ => None,
        }
    }

    /// Boolean meaning of the encoding, `None` for integers other than 0 and 1
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Int(1) => Some(true),
            Self::Int(0) => Some(false),
            Self::Int(_) => None,
            Self::Text(TextFlag::On | TextFlag::One | TextFlag::True) => Some(true),
            Self::Text(TextFlag::Off | TextFlag::Zero | TextFlag::False) => Some(false),
        }
    }
}

/// Map a raw flag value to a boolean
///
/// Returns `None` ("no opinion") for null, unknown strings, other numbers,
/// arrays and objects. Never fails.
#[must_use]
pub fn normalize_flag(raw: &Value) -> Option<bool> {
    FlagEncoding::classify(raw).and_then(FlagEncoding::as_bool)
}

/// Flags stored for one video, either of which may be unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_download: Option<bool>,
}

impl VideoFlags {
    #[must_use]
    pub const fn new(subscriber_only: bool, deny_download: bool) -> Self {
        Self {
            subscriber_only: Some(subscriber_only),
            deny_download: Some(deny_download),
        }
    }

    /// Read a persisted record
    ///
    /// The record may be an object or a JSON string holding an object. Field
    /// values are normalized, so legacy `"on"`/`1` records still read back.
    /// Null means no record. Any other shape is a read error.
    pub fn from_stored(raw: &Value) -> Result<Option<Self>> {
        let parsed;
        let object = match raw {
            Value::Null => return Ok(None),
            Value::Object(map) => map,
            Value::String(text) => {
                parsed = serde_json::from_str::<Value>(text).map_err(|e| {
                    Error::Deserialization {
                        context: format!("stored video flags: {e}"),
                    }
                })?;
                match &parsed {
                    Value::Null => return Ok(None),
                    Value::Object(map) => map,
                    other => return Err(not_an_object(other)),
                }
            }
            other => return Err(not_an_object(other)),
        };

        Ok(Some(Self {
            subscriber_only: object.get("subscriberOnly").and_then(normalize_flag),
            deny_download: object.get("denyDownload").and_then(normalize_flag),
        }))
    }

    /// Canonical representation written to storage
    #[must_use]
    pub fn to_stored(self) -> Value {
        serde_json::json!({
            "subscriberOnly": self.subscriber_only.unwrap_or(false),
            "denyDownload": self.deny_download.unwrap_or(false),
        })
    }

    /// Same flags with unset fields resolved to `false`
    #[must_use]
    pub fn or_defaults(self) -> Self {
        Self::new(
            self.subscriber_only.unwrap_or(false),
            self.deny_download.unwrap_or(false),
        )
    }
}

/// The flags actually enforced for a video after applying global overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveFlags {
    pub subscriber_only: bool,
    pub deny_download: bool,
}

impl EffectiveFlags {
    /// Combine the policy snapshot with what is stored for the video
    ///
    /// The stored flag is only looked at when the matching override is off.
    #[must_use]
    pub fn resolve(policy: &PolicyConfig, stored: Option<&VideoFlags>) -> Self {
        let subscriber_only = policy.global_subscriber_only
            || stored.and_then(|f| f.subscriber_only).unwrap_or(false);
        let deny_download =
            policy.global_deny_download || stored.and_then(|f| f.deny_download).unwrap_or(false);

        Self {
            subscriber_only,
            deny_download,
        }
    }

    /// Flags used when the stored record could not be read
    #[must_use]
    pub const fn fail_closed() -> Self {
        Self {
            subscriber_only: true,
            deny_download: true,
        }
    }
}
