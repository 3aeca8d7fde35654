//! Settings change notifications
//!
//! The host pushes the full settings object whenever an administrator saves
//! the plugin settings. Subscribers receive every push in order.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::SettingEntries;

/// Capacity of the notification channel; slower subscribers re-read the source
const SETTINGS_CHANNEL_CAPACITY: usize = 16;

/// Fan-out point for settings change notifications
#[derive(Clone)]
pub struct SettingsHub {
    sender: broadcast::Sender<SettingEntries>,
    latest: Arc<ArcSwap<SettingEntries>>,
}

impl std::fmt::Debug for SettingsHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsHub")
            .field("subscribers", &self.sender.receiver_count())
            .finish_non_exhaustive()
    }
}

impl Default for SettingsHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsHub {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SETTINGS_CHANNEL_CAPACITY);
        Self {
            sender,
            latest: Arc::new(ArcSwap::from_pointee(SettingEntries::new())),
        }
    }

    /// Register a new subscriber; it sees notifications sent after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SettingEntries> {
        self.sender.subscribe()
    }

    /// Publish a settings change, returning how many subscribers received it
    pub fn notify(&self, settings: SettingEntries) -> usize {
        self.latest.store(Arc::new(settings.clone()));
        let delivered = self.sender.send(settings).unwrap_or(0);
        debug!(subscribers = delivered, "Published settings change");
        delivered
    }

    /// Last settings published through this hub
    #[must_use]
    pub fn latest(&self) -> Arc<SettingEntries> {
        self.latest.load_full()
    }
}
