//! Settings notifications and the settings/field registry

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use subgate_core::{
    models::SettingEntries,
    service::{video_form_fields, SettingDefinition, VideoFormField, SETTINGS},
};

use crate::http::{AppResult, AppState};

pub fn create_settings_router() -> Router<AppState> {
    Router::new()
        .route("/settings/changed", post(settings_changed))
        .route("/registry/settings", get(list_settings))
        .route("/registry/fields", get(list_fields))
}

#[derive(Debug, Serialize)]
pub struct SettingsChangedResponse {
    pub delivered: usize,
}

/// The host saved new plugin settings
async fn settings_changed(
    State(state): State<AppState>,
    Json(settings): Json<SettingEntries>,
) -> Json<SettingsChangedResponse> {
    info!(settings = settings.len(), "Received settings change");
    let delivered = state.settings_hub.notify(settings);
    Json(SettingsChangedResponse { delivered })
}

async fn list_settings() -> Json<Vec<SettingDefinition>> {
    Json(SETTINGS.to_vec())
}

/// Per-video fields rendered from the currently stored settings
async fn list_fields(State(state): State<AppState>) -> AppResult<Json<Vec<VideoFormField>>> {
    let names: Vec<&str> = SETTINGS.iter().map(|setting| setting.name).collect();
    let settings = state.settings_source.get_settings(&names).await?;
    Ok(Json(video_form_fields(&settings)))
}
