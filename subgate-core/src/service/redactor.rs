//! Single-video responses for restricted content

use http::StatusCode;
use tracing::debug;

use crate::{
    models::{UserId, Video},
    service::AccessService,
};

/// A video after annotation and, if needed, redaction
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVideo {
    pub video: Video,
    pub accessible: bool,
}

/// Annotates a fetched video and strips its media when access is denied
#[derive(Debug, Clone)]
pub struct DetailRedactor {
    access: AccessService,
}

impl DetailRedactor {
    #[must_use]
    pub const fn new(access: AccessService) -> Self {
        Self { access }
    }

    /// Shape a video detail response for the requester
    ///
    /// On denial the status slot, when given, is set to `403 Forbidden` and the
    /// video is redacted in place of being removed.
    pub async fn resolve(
        &self,
        mut video: Video,
        user_id: Option<UserId>,
        status: Option<&mut StatusCode>,
    ) -> ResolvedVideo {
        let policy = self.access.policy();
        let flags = self.access.effective_flags(&video, &policy).await;
        video.annotate(flags);

        if self.access.view_allowed(user_id, &video, flags).await {
            return ResolvedVideo {
                video,
                accessible: true,
            };
        }

        debug!(
            user_id = ?user_id,
            video_id = ?video.id,
            "Redacting subscriber-only video"
        );

        if let Some(status) = status {
            *status = StatusCode::FORBIDDEN;
        }
        video.redact();

        ResolvedVideo {
            video,
            accessible: false,
        }
    }
}
