//! Hook endpoints
//!
//! Each request carries the hook's current result plus the parameters the
//! host passes to the hook. The response is the filtered result.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use subgate_core::{
    models::{DownloadVerdict, UserId, Video, VideoList},
    service::WritebackOutcome,
    HookKind, HookTarget,
};

use crate::http::{AppResult, AppState};

pub fn create_hooks_router() -> Router<AppState> {
    Router::new()
        .route("/hooks/list/{target}", post(filter_list))
        .route("/hooks/video/get", post(video_get))
        .route("/hooks/download/{target}", post(download_allowed))
        .route("/hooks/video/updated", post(video_updated))
}

#[derive(Debug, Default, Deserialize)]
pub struct Requester {
    #[serde(default)]
    pub id: Option<UserId>,
}

/// Identity fields of the hook parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookParams {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user: Option<Requester>,
}

impl HookParams {
    /// `userId` wins over `user.id`
    pub fn requester(&self) -> Option<UserId> {
        self.user_id
            .or_else(|| self.user.as_ref().and_then(|user| user.id))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListHookRequest {
    pub result: VideoList,
    #[serde(default)]
    pub params: HookParams,
}

#[derive(Debug, Deserialize)]
pub struct VideoGetRequest {
    pub result: Video,
    #[serde(default)]
    pub params: HookParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGetResponse {
    pub result: Video,
    pub accessible: bool,
    /// Status the host should answer with
    pub status_code: u16,
}

#[derive(Debug, Deserialize)]
pub struct DownloadHookRequest {
    pub result: DownloadVerdict,
    #[serde(default)]
    pub video: Option<Video>,
    #[serde(default)]
    pub params: HookParams,
}

#[derive(Debug, Deserialize)]
pub struct VideoUpdatedRequest {
    pub video: Video,
    #[serde(default)]
    pub body: Value,
}

async fn filter_list(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Json(request): Json<ListHookRequest>,
) -> AppResult<Json<VideoList>> {
    let target = HookTarget::parse_kind(&target, HookKind::ListFilter)?;
    let filtered = state
        .hooks
        .filter_list(target, request.result, request.params.requester())
        .await;
    Ok(Json(filtered))
}

async fn video_get(
    State(state): State<AppState>,
    Json(request): Json<VideoGetRequest>,
) -> Json<VideoGetResponse> {
    let mut status = StatusCode::OK;
    let resolved = state
        .hooks
        .video_get(request.result, request.params.requester(), Some(&mut status))
        .await;

    Json(VideoGetResponse {
        result: resolved.video,
        accessible: resolved.accessible,
        status_code: status.as_u16(),
    })
}

async fn download_allowed(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Json(request): Json<DownloadHookRequest>,
) -> AppResult<Json<DownloadVerdict>> {
    let target = HookTarget::parse_kind(&target, HookKind::DownloadFilter)?;

    let Some(video) = request.video else {
        return Ok(Json(request.result));
    };

    let verdict = state
        .hooks
        .download_allowed(target, request.result, request.params.requester(), &video)
        .await;
    Ok(Json(verdict))
}

async fn video_updated(
    State(state): State<AppState>,
    Json(request): Json<VideoUpdatedRequest>,
) -> Json<WritebackOutcome> {
    Json(state.hooks.video_updated(&request.body, &request.video).await)
}
