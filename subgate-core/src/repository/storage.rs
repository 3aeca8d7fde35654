//! Host plugin storage
//!
//! The host keeps one JSONB `storage` object per plugin row. Keys are plain
//! strings chosen by the plugin.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::Result;

/// Key-value storage owned by this plugin
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, `None` when absent
    async fn get_data(&self, key: &str) -> Result<Option<Value>>;

    /// Values for every present key among `keys`
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Value>>;

    /// Insert or replace the value under `key`
    async fn store_data(&self, key: &str, value: &Value) -> Result<()>;
}

/// `KeyValueStore` over the host's `plugin.storage` column
#[derive(Clone)]
pub struct PgPluginStorage {
    pool: PgPool,
    plugin_name: String,
    plugin_type: i32,
}

impl std::fmt::Debug for PgPluginStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPluginStorage")
            .field("plugin_name", &self.plugin_name)
            .field("plugin_type", &self.plugin_type)
            .finish_non_exhaustive()
    }
}

impl PgPluginStorage {
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
impl KeyValueStore for PgPluginStorage {
    async fn get_data(&self, key: &str) -> Result<Option<Value>> {
        let row = sqlx::query(
            r#"
            SELECT "storage" -> $1 AS value
            FROM "plugin"
            WHERE "name" = $2 AND "type" = $3
            "#,
        )
        .bind(key)
        .bind(&self.plugin_name)
        .bind(self.plugin_type)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.try_get::<Option<Value>, _>("value")?),
            None => Ok(None),
        }
    }

    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Value>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT entry.key, entry.value
            FROM "plugin" p,
                 jsonb_each(COALESCE(p."storage", '{}'::jsonb)) AS entry
            WHERE p."name" = $1 AND p."type" = $2 AND entry.key = ANY($3)
            "#,
        )
        .bind(&self.plugin_name)
        .bind(self.plugin_type)
        .bind(keys)
        .fetch_all(&self.pool)
        .await?;

        let values = rows
            .into_iter()
            .map(|row| -> Result<(String, Value)> {
                Ok((row.try_get("key")?, row.try_get("value")?))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        debug!(requested = keys.len(), found = values.len(), "Loaded plugin storage entries");
        Ok(values)
    }

    async fn store_data(&self, key: &str, value: &Value) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE "plugin"
            SET "storage" = jsonb_set(COALESCE("storage", '{}'::jsonb), ARRAY[$1], $2::jsonb)
            WHERE "name" = $3 AND "type" = $4
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&self.plugin_name)
        .bind(self.plugin_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::Error::NotFound(format!(
                "Plugin row '{}' (type {})",
                self.plugin_name, self.plugin_type
            )));
        }

        Ok(())
    }
}
