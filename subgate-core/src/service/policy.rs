//! Instance-wide policy snapshot
//!
//! Decisions load the current `PolicyConfig` once and work from that `Arc`
//! for their whole duration. A settings change swaps in a new value; readers
//! never block and never see a half-applied update.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{error, info, warn};

use crate::{
    models::{
        PolicyConfig, SettingEntries, SETTING_GLOBAL_DENY_DOWNLOAD, SETTING_GLOBAL_SUBSCRIBER_ONLY,
    },
    repository::SettingsSource,
    Result,
};

/// Settings that feed the policy snapshot
pub const POLICY_SETTINGS: [&str; 2] = [SETTING_GLOBAL_SUBSCRIBER_ONLY, SETTING_GLOBAL_DENY_DOWNLOAD];

/// Holder of the current policy snapshot
pub struct PolicyService {
    current: ArcSwap<PolicyConfig>,
}

impl std::fmt::Debug for PolicyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyService")
            .field("current", &**self.current.load())
            .finish()
    }
}

impl Default for PolicyService {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

impl PolicyService {
    #[must_use]
    pub fn new(initial: PolicyConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<PolicyConfig> {
        self.current.load_full()
    }

    /// Replace the snapshot from a full settings object
    pub fn apply_settings(&self, settings: &SettingEntries) -> PolicyConfig {
        let policy = PolicyConfig::from_settings(settings);
        let previous = self.current.swap(Arc::new(policy));

        if *previous != policy {
            info!(
                global_subscriber_only = policy.global_subscriber_only,
                global_deny_download = policy.global_deny_download,
                "Access policy updated"
            );
        }

        policy
    }

    /// Re-read the policy settings from the source
    pub async fn refresh(&self, source: &dyn SettingsSource) -> Result<PolicyConfig> {
        let settings = source.get_settings(&POLICY_SETTINGS).await?;
        Ok(self.apply_settings(&settings))
    }

    /// Apply every settings notification until the channel closes
    ///
    /// A receiver that fell behind skips the missed notifications and
    /// re-reads the source instead.
    pub fn spawn_watcher(
        self: Arc<Self>,
        source: Arc<dyn SettingsSource>,
        mut notifications: broadcast::Receiver<SettingEntries>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match notifications.recv().await {
                    Ok(settings) => {
                        self.apply_settings(&settings);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Settings watcher lagged, reloading settings");
                        if let Err(e) = self.refresh(source.as_ref()).await {
                            error!(error = %e, "Failed to reload settings after lag");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Settings notification channel closed, watcher stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::SettingsHub;
    use crate::test_helpers::{settings, StaticSettings};
    use serde_json::json;

    #[test]
    fn test_apply_settings_replaces_snapshot() {
        let policy = PolicyService::default();
        let before = policy.snapshot();

        policy.apply_settings(&settings(json!({"global-subscriber-only": true})));

        assert!(!before.global_subscriber_only);
        assert!(policy.snapshot().global_subscriber_only);
        assert!(!policy.snapshot().global_deny_download);
    }

    #[test]
    fn test_apply_settings_turns_overrides_off_again() {
        let policy = PolicyService::new(PolicyConfig {
            global_subscriber_only: true,
            global_deny_download: true,
        });

        policy.apply_settings(&settings(json!({"global-deny-download": false})));

        assert_eq!(*policy.snapshot(), PolicyConfig::default());
    }

    #[tokio::test]
    async fn test_refresh_reads_source() {
        let source = StaticSettings::new(settings(json!({
            "global-deny-download": true,
            "remove-subscribe-button": true,
        })));
        let policy = PolicyService::default();

        let applied = policy.refresh(&source).await.unwrap();

        assert!(applied.global_deny_download);
        assert_eq!(*policy.snapshot(), applied);
    }

    #[tokio::test]
    async fn test_watcher_applies_notifications() {
        let hub = SettingsHub::new();
        let policy = Arc::new(PolicyService::default());
        let source: Arc<dyn SettingsSource> = Arc::new(StaticSettings::default());

        let handle = policy.clone().spawn_watcher(source, hub.subscribe());

        hub.notify(settings(json!({"global-subscriber-only": true})));
        drop(hub);
        handle.await.unwrap();

        assert!(policy.snapshot().global_subscriber_only);
    }
}
