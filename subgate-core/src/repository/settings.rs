//! Plugin settings as stored by the host

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::{models::SettingEntries, Result};

/// Read access to the plugin's settings
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Current values of the named settings; unset names are left out
    async fn get_settings(&self, names: &[&str]) -> Result<SettingEntries>;
}

/// `SettingsSource` over the host's `plugin.settings` column
#[derive(Clone)]
pub struct PgSettingsSource {
    pool: PgPool,
    plugin_name: String,
    plugin_type: i32,
}

impl std::fmt::Debug for PgSettingsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSettingsSource")
            .field("plugin_name", &self.plugin_name)
            .finish_non_exhaustive()
    }
}

impl PgSettingsSource {
    #[must_use]
    pub fn new(pool: PgPool, plugin_name: impl Into<String>, plugin_type: i32) -> Self {
        Self {
            pool,
            plugin_name: plugin_name.into(),
            plugin_type,
        }
    }
}

#[async_trait]
impl SettingsSource for PgSettingsSource {
    async fn get_settings(&self, names: &[&str]) -> Result<SettingEntries> {
        let settings: Option<Option<Value>> = sqlx::query_scalar(
            r#"
            SELECT "settings"
            FROM "plugin"
            WHERE "name" = $1 AND "type" = $2
            "#,
        )
        .bind(&self.plugin_name)
        .bind(self.plugin_type)
        .fetch_optional(&self.pool)
        .await?;

        let Some(Value::Object(all)) = settings.flatten() else {
            debug!(plugin = %self.plugin_name, "Plugin has no stored settings");
            return Ok(SettingEntries::new());
        };

        Ok(all
            .into_iter()
            .filter(|(name, _)| names.contains(&name.as_str()))
            .collect())
    }
}
