//! Subscriber-only filtering of paginated video lists

use std::collections::HashMap;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    models::{ChannelMembership, EffectiveFlags, PolicyConfig, UserId, Video, VideoFlags, VideoList},
    service::AccessService,
};

/// Filters list results down to the videos the requester may see
#[derive(Debug, Clone)]
pub struct ListFilter {
    access: AccessService,
}

impl ListFilter {
    #[must_use]
    pub const fn new(access: AccessService) -> Self {
        Self { access }
    }

    /// Filter one page of results
    ///
    /// Order is preserved. Unless the requester is the root administrator,
    /// `total` is rewritten to the number of videos kept.
    pub async fn filter(&self, list: VideoList, user_id: Option<UserId>) -> VideoList {
        if let Some(user_id) = user_id {
            match self.access.membership().is_root_admin(user_id).await {
                Ok(true) => return list,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        error = %e,
                        "Admin lookup failed, filtering list as a regular user"
                    );
                }
            }
        }

        let policy = self.access.policy();
        let restricted = self.restricted_mask(&list.data, &policy).await;

        if !restricted.iter().any(|r| *r) {
            return VideoList::new(list.data);
        }

        let Some(user_id) = user_id else {
            return keep(list.data, &restricted, |_| false);
        };

        let membership = match self.load_membership(user_id).await {
            Ok(membership) => membership,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to load channel membership, hiding the whole page"
                );
                return VideoList::new(Vec::new());
            }
        };

        debug!(
            user_id = %user_id,
            owned = membership.owned.len(),
            followed = membership.followed.len(),
            "Filtering list with channel membership"
        );

        keep(list.data, &restricted, |video| {
            video
                .channel_id()
                .is_some_and(|channel_id| membership.grants(channel_id))
        })
    }

    async fn load_membership(&self, user_id: UserId) -> crate::Result<ChannelMembership> {
        let resolver = self.access.membership();
        let (owned, followed) = tokio::try_join!(
            resolver.owned_channel_ids(user_id),
            resolver.followed_channel_ids(user_id),
        )?;
        Ok(ChannelMembership { owned, followed })
    }

    /// Effective subscriber-only flag for every video on the page
    async fn restricted_mask(&self, videos: &[Video], policy: &PolicyConfig) -> Vec<bool> {
        if policy.global_subscriber_only {
            return vec![true; videos.len()];
        }

        let uuids: Vec<Uuid> = videos.iter().filter_map(|video| video.uuid).collect();
        let stored: HashMap<Uuid, VideoFlags> = if uuids.is_empty() {
            HashMap::new()
        } else {
            match self.access.flag_store().get_many(&uuids).await {
                Ok(stored) => stored,
                Err(e) => {
                    error!(
                        videos = uuids.len(),
                        error = %e,
                        "Failed to read flags for list page, treating every video as restricted"
                    );
                    return vec![true; videos.len()];
                }
            }
        };

        videos
            .iter()
            .map(|video| {
                let flags = video.uuid.and_then(|uuid| stored.get(&uuid));
                EffectiveFlags::resolve(policy, flags).subscriber_only
            })
            .collect()
    }
}

fn keep(videos: Vec<Video>, restricted: &[bool], granted: impl Fn(&Video) -> bool) -> VideoList {
    let data = videos
        .into_iter()
        .zip(restricted)
        .filter(|(video, restricted)| !**restricted || granted(video))
        .map(|(video, _)| video)
        .collect();
    VideoList::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ChannelId, VideoId},
        repository::{flags::storage_key, MockMembershipResolver, StoredFlags},
        service::PolicyService,
        test_helpers::{
            access_service, test_uuid, FakeMembership, MemoryFlagStore, MemoryStorage,
            VideoFixture,
        },
    };
    use serde_json::json;
    use std::{collections::HashSet, sync::Arc};

    const USER: UserId = UserId(7);
    const ADMIN: UserId = UserId(1);

    fn video(id: i64, channel: i64) -> Video {
        VideoFixture::new(id, channel).with_uuid(test_uuid(id)).build()
    }

    fn ids(list: &VideoList) -> Vec<i64> {
        list.data.iter().filter_map(|v| v.id).map(|id| id.as_i64()).collect()
    }

    /// Five videos: V1 public, V2 restricted in a followed channel, V3
    /// restricted in an unrelated channel, V4 restricted in an owned channel,
    /// V5 public.
    fn five_video_page() -> (VideoList, MemoryFlagStore, FakeMembership) {
        let flags = MemoryFlagStore::default();
        for id in [2, 3, 4] {
            flags.insert(test_uuid(id), VideoFlags::new(true, false));
        }
        let membership = FakeMembership::default()
            .with_admin(ADMIN)
            .with_follow(USER, ChannelId(20))
            .with_owned(USER, ChannelId(40), &[VideoId(4)]);

        let list = VideoList {
            data: vec![video(1, 10), video(2, 20), video(3, 30), video(4, 40), video(5, 50)],
            total: 5,
        };
        (list, flags, membership)
    }

    #[tokio::test]
    async fn test_five_video_scenario() {
        let (list, flags, membership) = five_video_page();
        let filter = ListFilter::new(access_service(flags, membership, PolicyConfig::default()));

        let result = filter.filter(list, Some(USER)).await;

        assert_eq!(ids(&result), vec![1, 2, 4, 5]);
        assert_eq!(result.total, 4);
    }

    #[tokio::test]
    async fn test_anonymous_sees_only_public_videos() {
        let (list, flags, membership) = five_video_page();
        let filter = ListFilter::new(access_service(flags, membership, PolicyConfig::default()));

        let result = filter.filter(list, None).await;

        assert_eq!(ids(&result), vec![1, 5]);
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_admin_gets_list_untouched() {
        let (mut list, flags, membership) = five_video_page();
        list.total = 250;
        let filter = ListFilter::new(access_service(flags, membership, PolicyConfig::default()));

        let result = filter.filter(list.clone(), Some(ADMIN)).await;

        assert_eq!(result, list);
    }

    #[tokio::test]
    async fn test_global_override_drops_unrelated_channels() {
        let (list, _, membership) = five_video_page();
        let filter = ListFilter::new(access_service(
            MemoryFlagStore::default(),
            membership,
            PolicyConfig {
                global_subscriber_only: true,
                global_deny_download: false,
            },
        ));

        let result = filter.filter(list, Some(USER)).await;

        assert_eq!(ids(&result), vec![2, 4]);
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_restricted_video_without_channel_is_dropped() {
        let flags = MemoryFlagStore::default();
        flags.insert(test_uuid(1), VideoFlags::new(true, false));
        let list = VideoList::new(vec![
            VideoFixture::new(1, 20).with_uuid(test_uuid(1)).without_channel().build(),
            video(2, 20),
        ]);
        let membership = FakeMembership::default().with_follow(USER, ChannelId(20));
        let filter = ListFilter::new(access_service(flags, membership, PolicyConfig::default()));

        let result = filter.filter(list, Some(USER)).await;

        assert_eq!(ids(&result), vec![2]);
    }

    #[tokio::test]
    async fn test_membership_failure_hides_page() {
        let (list, flags, _) = five_video_page();
        let mut mock = MockMembershipResolver::new();
        mock.expect_is_root_admin().returning(|_| Ok(false));
        mock.expect_owned_channel_ids()
            .returning(|_| Ok(HashSet::from([ChannelId(40)])));
        mock.expect_followed_channel_ids()
            .returning(|_| Err(crate::Error::Internal("pool timed out".to_string())));

        let filter = ListFilter::new(AccessService::new(
            Arc::new(flags),
            Arc::new(mock),
            Arc::new(PolicyService::default()),
        ));

        let result = filter.filter(list, Some(USER)).await;

        assert!(result.data.is_empty());
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn test_admin_lookup_failure_still_filters() {
        let (list, flags, _) = five_video_page();
        let mut mock = MockMembershipResolver::new();
        mock.expect_is_root_admin()
            .returning(|_| Err(crate::Error::Internal("pool timed out".to_string())));
        mock.expect_owned_channel_ids().returning(|_| Ok(HashSet::new()));
        mock.expect_followed_channel_ids()
            .returning(|_| Ok(HashSet::from([ChannelId(20)])));

        let filter = ListFilter::new(AccessService::new(
            Arc::new(flags),
            Arc::new(mock),
            Arc::new(PolicyService::default()),
        ));

        let result = filter.filter(list, Some(USER)).await;

        assert_eq!(ids(&result), vec![1, 2, 5]);
    }

    #[tokio::test]
    async fn test_membership_fetched_once_per_page() {
        let (list, flags, _) = five_video_page();
        let mut mock = MockMembershipResolver::new();
        mock.expect_is_root_admin().times(1).returning(|_| Ok(false));
        mock.expect_owned_channel_ids()
            .times(1)
            .returning(|_| Ok(HashSet::from([ChannelId(40)])));
        mock.expect_followed_channel_ids()
            .times(1)
            .returning(|_| Ok(HashSet::from([ChannelId(20)])));
        mock.expect_is_video_owner().times(0);

        let filter = ListFilter::new(AccessService::new(
            Arc::new(flags),
            Arc::new(mock),
            Arc::new(PolicyService::default()),
        ));

        let result = filter.filter(list, Some(USER)).await;

        assert_eq!(result.total, 4);
    }

    #[tokio::test]
    async fn test_page_without_restricted_videos_skips_membership() {
        let mut mock = MockMembershipResolver::new();
        mock.expect_is_root_admin().returning(|_| Ok(false));
        mock.expect_owned_channel_ids().times(0);
        mock.expect_followed_channel_ids().times(0);

        let filter = ListFilter::new(AccessService::new(
            Arc::new(MemoryFlagStore::default()),
            Arc::new(mock),
            Arc::new(PolicyService::default()),
        ));

        let list = VideoList {
            data: vec![video(1, 10), video(2, 20)],
            total: 90,
        };
        let result = filter.filter(list, Some(USER)).await;

        assert_eq!(ids(&result), vec![1, 2]);
        assert_eq!(result.total, 2);

        let empty = filter.filter(VideoList { data: Vec::new(), total: 90 }, Some(USER)).await;
        assert_eq!(empty.total, 0);
    }

    #[tokio::test]
    async fn test_flag_read_failure_treats_page_as_restricted() {
        let (list, _, membership) = five_video_page();
        let flags = MemoryFlagStore::default();
        flags.fail_reads(true);
        let filter = ListFilter::new(access_service(flags, membership, PolicyConfig::default()));

        let anonymous = filter.filter(list.clone(), None).await;
        assert!(anonymous.data.is_empty());

        let member = filter.filter(list, Some(USER)).await;
        assert_eq!(ids(&member), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_corrupt_stored_record_drops_the_page() {
        let storage = MemoryStorage::default();
        storage.insert(&storage_key(&test_uuid(1)), json!({"subscriberOnly": false}));
        storage.insert(&storage_key(&test_uuid(2)), json!(r#"{"subscriberOnly":true"#));
        let filter = ListFilter::new(AccessService::new(
            Arc::new(StoredFlags::new(storage)),
            Arc::new(FakeMembership::default().with_follow(USER, ChannelId(10))),
            Arc::new(PolicyService::default()),
        ));
        let list = VideoList {
            data: vec![video(1, 10), video(2, 20)],
            total: 2,
        };

        let anonymous = filter.filter(list.clone(), None).await;
        assert!(anonymous.data.is_empty());
        assert_eq!(anonymous.total, 0);

        let member = filter.filter(list, Some(USER)).await;
        assert_eq!(ids(&member), vec![1]);
        assert_eq!(member.total, 1);
    }
}
