//! Relationship lookups between a user and video channels
//!
//! Each question is answered by a single query against the host schema.
//! Host ids are `INTEGER` columns, so selected ids are cast to `bigint`.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    models::{ChannelId, UserId, VideoId},
    Result,
};

/// Host role value of the root administrator
pub const ROOT_ADMIN_ROLE: i32 = 0;

/// Answers ownership, follow and admin questions for a user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipResolver: Send + Sync {
    /// Whether the user holds the root administrator role
    async fn is_root_admin(&self, user_id: UserId) -> Result<bool>;

    /// Whether the video's channel belongs to one of the user's accounts
    async fn is_video_owner(&self, user_id: UserId, video_id: VideoId) -> Result<bool>;

    /// Channels owned by the user's accounts
    async fn owned_channel_ids(&self, user_id: UserId) -> Result<HashSet<ChannelId>>;

    /// Channels followed by the user's actors
    async fn followed_channel_ids(&self, user_id: UserId) -> Result<HashSet<ChannelId>>;
}

/// `MembershipResolver` backed by the host database
#[derive(Clone)]
pub struct PgMembershipResolver {
    pool: PgPool,
}

impl std::fmt::Debug for PgMembershipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgMembershipResolver").finish_non_exhaustive()
    }
}

impl PgMembershipResolver {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the database pool
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MembershipResolver for PgMembershipResolver {
    async fn is_root_admin(&self, user_id: UserId) -> Result<bool> {
        let role: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT u."role"
            FROM "user" u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role == Some(ROOT_ADMIN_ROLE))
    }

    async fn is_video_owner(&self, user_id: UserId, video_id: VideoId) -> Result<bool> {
        let owned: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM video v
                JOIN "videoChannel" vc ON v."channelId" = vc.id
                JOIN account a ON vc."accountId" = a.id
                WHERE v.id = $1 AND a."userId" = $2
            )
            "#,
        )
        .bind(video_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }

    async fn owned_channel_ids(&self, user_id: UserId) -> Result<HashSet<ChannelId>> {
        let ids: Vec<ChannelId> = sqlx::query_scalar(
            r#"
            SELECT vc.id::bigint
            FROM "videoChannel" vc
            JOIN account a ON vc."accountId" = a.id
            WHERE a."userId" = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn followed_channel_ids(&self, user_id: UserId) -> Result<HashSet<ChannelId>> {
        let ids: Vec<ChannelId> = sqlx::query_scalar(
            r#"
            SELECT vc.id::bigint
            FROM "actorFollow" af
            JOIN actor follower ON follower.id = af."actorId"
            JOIN account a ON a.id = follower."accountId"
            JOIN "user" u ON u.id = a."userId"
            JOIN actor target ON target.id = af."targetActorId"
            JOIN "videoChannel" vc ON vc.id = target."videoChannelId"
            WHERE u.id = $1
              AND target."videoChannelId" IS NOT NULL
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
