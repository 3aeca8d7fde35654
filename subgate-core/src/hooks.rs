//! Host extension points and their dispatch
//!
//! Hook names are the host's own and are matched verbatim.

use std::{fmt::Display, str::FromStr};

use http::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::{
    models::{DownloadVerdict, UserId, Video, VideoList},
    service::{AccessService, DetailRedactor, FlagWriteback, ListFilter, ResolvedVideo, WritebackOutcome},
    Error, Result,
};

/// What a hook does with its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    ListFilter,
    VideoGet,
    DownloadFilter,
    VideoUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookTarget {
    VideosList,
    ChannelVideosList,
    AccountVideosList,
    LocalSearchVideosList,
    IndexSearchVideosList,
    PlaylistVideosList,
    OverviewVideosList,
    SubscriptionVideosList,
    VideoGet,
    DownloadVideoAllowed,
    DownloadGeneratedVideoAllowed,
    VideoUpdated,
}

impl HookTarget {
    pub const ALL: [Self; 12] = [
        Self::VideosList,
        Self::ChannelVideosList,
        Self::AccountVideosList,
        Self::LocalSearchVideosList,
        Self::IndexSearchVideosList,
        Self::PlaylistVideosList,
        Self::OverviewVideosList,
        Self::SubscriptionVideosList,
        Self::VideoGet,
        Self::DownloadVideoAllowed,
        Self::DownloadGeneratedVideoAllowed,
        Self::VideoUpdated,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VideosList => "filter:api.videos.list.result",
            Self::ChannelVideosList => "filter:api.video-channels.videos.list.result",
            Self::AccountVideosList => "filter:api.accounts.videos.list.result",
            Self::LocalSearchVideosList => "filter:api.search.videos.local.list.result",
            Self::IndexSearchVideosList => "filter:api.search.videos.index.list.result",
            Self::PlaylistVideosList => "filter:api.video-playlist.videos.list.result",
            Self::OverviewVideosList => "filter:api.overviews.videos.list.result",
            Self::SubscriptionVideosList => "filter:api.user.me.subscription-videos.list.result",
            Self::VideoGet => "filter:api.video.get.result",
            Self::DownloadVideoAllowed => "filter:api.download.video.allowed.result",
            Self::DownloadGeneratedVideoAllowed => {
                "filter:api.download.generated-video.allowed.result"
            }
            Self::VideoUpdated => "action:api.video.updated",
        }
    }

    #[must_use]
    pub const fn kind(self) -> HookKind {
        match self {
            Self::VideoGet => HookKind::VideoGet,
            Self::DownloadVideoAllowed | Self::DownloadGeneratedVideoAllowed => {
                HookKind::DownloadFilter
            }
            Self::VideoUpdated => HookKind::VideoUpdated,
            _ => HookKind::ListFilter,
        }
    }

    /// Parse a hook name and check that it is of the expected kind
    pub fn parse_kind(name: &str, kind: HookKind) -> Result<Self> {
        let target: Self = name.parse()?;
        if target.kind() == kind {
            Ok(target)
        } else {
            Err(Error::InvalidInput(format!(
                "Hook {name} is not a {kind:?} hook"
            )))
        }
    }
}

impl Display for HookTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| Error::NotFound(format!("Unknown hook: {s}")))
    }
}

/// Entry point for every registered hook
#[derive(Debug, Clone)]
pub struct PluginHooks {
    access: AccessService,
    list_filter: ListFilter,
    redactor: DetailRedactor,
    writeback: FlagWriteback,
}

impl PluginHooks {
    #[must_use]
    pub fn new(access: AccessService, writeback: FlagWriteback) -> Self {
        Self {
            list_filter: ListFilter::new(access.clone()),
            redactor: DetailRedactor::new(access.clone()),
            access,
            writeback,
        }
    }

    #[must_use]
    pub const fn access(&self) -> &AccessService {
        &self.access
    }

    /// Any of the list result filters
    pub async fn filter_list(
        &self,
        target: HookTarget,
        list: VideoList,
        user_id: Option<UserId>,
    ) -> VideoList {
        let before = list.data.len();
        let filtered = self.list_filter.filter(list, user_id).await;
        debug!(
            hook = %target,
            user_id = ?user_id,
            before,
            after = filtered.data.len(),
            "Filtered list result"
        );
        filtered
    }

    /// `filter:api.video.get.result`
    pub async fn video_get(
        &self,
        video: Video,
        user_id: Option<UserId>,
        status: Option<&mut StatusCode>,
    ) -> ResolvedVideo {
        self.redactor.resolve(video, user_id, status).await
    }

    /// Either download permission filter
    pub async fn download_allowed(
        &self,
        target: HookTarget,
        upstream: DownloadVerdict,
        user_id: Option<UserId>,
        video: &Video,
    ) -> DownloadVerdict {
        let verdict = self.access.can_download(user_id, video, upstream).await;
        debug!(
            hook = %target,
            user_id = ?user_id,
            video_id = ?video.id,
            allowed = verdict.allowed,
            "Evaluated download permission"
        );
        verdict
    }

    /// `action:api.video.updated`
    pub async fn video_updated(&self, body: &Value, video: &Video) -> WritebackOutcome {
        self.writeback.on_video_updated(body, video).await
    }
}
