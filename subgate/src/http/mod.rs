//! HTTP surface exposing the plugin hooks to the host

mod error;
mod health;
mod hooks;
mod settings;

use std::{sync::Arc, time::Duration};

use axum::{extract::DefaultBodyLimit, http::StatusCode, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use subgate_core::{
    bootstrap::Services, config::ServerConfig, repository::SettingsSource,
    service::SettingsHub, PluginHooks,
};

pub use error::AppResult;

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub hooks: PluginHooks,
    pub settings_hub: SettingsHub,
    pub settings_source: Arc<dyn SettingsSource>,
}

impl From<&Services> for AppState {
    fn from(services: &Services) -> Self {
        Self {
            hooks: services.hooks.clone(),
            settings_hub: services.settings_hub.clone(),
            settings_source: services.settings_source.clone(),
        }
    }
}

/// Build the router with all routes
pub fn create_router(services: &Services, config: &ServerConfig) -> Router {
    Router::new()
        .merge(health::create_health_router())
        .merge(hooks::create_hooks_router())
        .merge(settings::create_settings_router())
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_seconds),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::from(services))
}
