//! Service wiring

use std::sync::Arc;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    hooks::PluginHooks,
    repository::{
        FlagStore, MembershipResolver, PgMembershipResolver, PgPluginStorage, PgSettingsSource,
        SettingsSource, StoredFlags,
    },
    service::{AccessService, FlagWriteback, PolicyService, SettingsHub},
    Config,
};

/// Container for all initialized services
#[derive(Clone)]
pub struct Services {
    /// Hook dispatcher
    pub hooks: PluginHooks,
    /// Current access policy
    pub policy: Arc<PolicyService>,
    /// Settings change notifications
    pub settings_hub: SettingsHub,
    /// Settings as stored by the host
    pub settings_source: Arc<dyn SettingsSource>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("hooks", &self.hooks)
            .field("policy", &self.policy)
            .field("settings_hub", &self.settings_hub)
            .finish_non_exhaustive()
    }
}

impl Services {
    /// Wire services over already constructed collaborators
    #[must_use]
    pub fn new(
        flags: Arc<dyn FlagStore>,
        membership: Arc<dyn MembershipResolver>,
        settings_source: Arc<dyn SettingsSource>,
    ) -> Self {
        let policy = Arc::new(PolicyService::default());
        let access = AccessService::new(flags.clone(), membership, policy.clone());
        let writeback = FlagWriteback::new(flags, policy.clone());

        Self {
            hooks: PluginHooks::new(access, writeback),
            policy,
            settings_hub: SettingsHub::new(),
            settings_source,
        }
    }

    /// Keep the policy in step with settings notifications
    #[must_use]
    pub fn spawn_settings_watcher(&self) -> JoinHandle<()> {
        self.policy.clone().spawn_watcher(
            self.settings_source.clone(),
            self.settings_hub.subscribe(),
        )
    }
}

/// Initialize all services and load the current policy
pub async fn init_services(pool: PgPool, config: &Config) -> Result<Services, anyhow::Error> {
    info!("Initializing services...");

    let plugin = &config.plugin;
    let storage = PgPluginStorage::new(pool.clone(), &plugin.name, plugin.plugin_type);
    let flags: Arc<dyn FlagStore> = Arc::new(StoredFlags::new(storage));
    let membership: Arc<dyn MembershipResolver> = Arc::new(PgMembershipResolver::new(pool.clone()));
    let settings_source: Arc<dyn SettingsSource> =
        Arc::new(PgSettingsSource::new(pool, &plugin.name, plugin.plugin_type));

    let services = Services::new(flags, membership, settings_source);

    let policy = services
        .policy
        .refresh(services.settings_source.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load plugin settings: {e}"))?;

    info!(
        plugin = %plugin.name,
        global_subscriber_only = policy.global_subscriber_only,
        global_deny_download = policy.global_deny_download,
        "Services initialized"
    );

    Ok(services)
}
