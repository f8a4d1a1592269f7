use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use uuid::Uuid;

use campus_core::DomainError;
use campus_core::domain::{
    Actor, ContentType, MediaUrls, PageRequest, PostChanges, PostDraft, PostFilter, Role,
    ShareMethod, StorageClass, StoryDraft, UserSummary,
};
use campus_core::lifecycle::{PostArchivalSweep, StoryExpiryReaper, SweepOptions};
use campus_core::media::MediaPathResolver;
use campus_core::ports::{
    Clock, EngagementRepository, PostRepository, StoryRepository, ViewEvent, ViewSink,
};
use campus_core::services::{ContentService, EngagementService, FeedService};

use super::{InMemoryFeedStore, InMemoryUserDirectory};
use crate::clock::ManualClock;
use crate::media::InMemoryMediaStore;
use crate::views::{ViewQueue, ViewQueueConfig};

const CDN: &str = "https://cdn.campus.edu/";

struct Harness {
    store: Arc<InMemoryFeedStore>,
    users: Arc<InMemoryUserDirectory>,
    media: Arc<InMemoryMediaStore>,
    clock: Arc<ManualClock>,
    content: ContentService,
    engagement: Arc<EngagementService>,
    feed: FeedService,
    reaper: StoryExpiryReaper,
    archival: PostArchivalSweep,
}

fn harness_with(media: InMemoryMediaStore, options: SweepOptions) -> Harness {
    let store = Arc::new(InMemoryFeedStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let media = Arc::new(media);
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let resolver = MediaPathResolver::new().with_prefix(CDN);

    let content = ContentService::new(
        store.clone(),
        store.clone(),
        media.clone(),
        resolver.clone(),
        clock.clone(),
        options.media_op_timeout,
    );
    let engagement = Arc::new(EngagementService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    let feed = FeedService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        users.clone(),
        clock.clone(),
    );
    let reaper = StoryExpiryReaper::new(
        store.clone(),
        media.clone(),
        resolver.clone(),
        clock.clone(),
        options,
    );
    let archival = PostArchivalSweep::new(store.clone(), media.clone(), resolver, clock.clone(), options);

    Harness {
        store,
        users,
        media,
        clock,
        content,
        engagement,
        feed,
        reaper,
        archival,
    }
}

fn harness() -> Harness {
    harness_with(InMemoryMediaStore::new(), SweepOptions::default())
}

fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin)
}

fn student() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Student)
}

fn image_post(name: &str) -> PostDraft {
    PostDraft {
        content_type: ContentType::Image,
        media: MediaUrls {
            image_url: Some(format!("{CDN}posts/{name}.jpg")),
            ..Default::default()
        },
        ..PostDraft::text(format!("Photo {name}"))
    }
}

fn image_story(name: &str) -> StoryDraft {
    StoryDraft::image(
        format!("{CDN}stories/{name}.jpg"),
        format!("{CDN}thumbs/{name}.jpg"),
    )
}

// Scenario A
#[tokio::test]
async fn test_text_post_round_trip() {
    let h = harness();
    let author = admin();
    h.users
        .insert(UserSummary {
            id: author.user_id,
            full_name: "Dean Rao".to_string(),
            avatar_url: None,
            role: Role::Admin,
        })
        .await;

    let post = h
        .content
        .create_post(&author, PostDraft::text("Welcome week"))
        .await
        .unwrap();

    let item = h.feed.get_post(None, post.id).await.unwrap();
    assert_eq!(item.post.description, "Welcome week");
    assert_eq!(item.post.like_count, 0);
    assert_eq!(item.post.comment_count, 0);
    assert_eq!(item.post.storage_class, StorageClass::Standard);
    assert_eq!(item.creator.unwrap().full_name, "Dean Rao");
}

// Scenario B
#[tokio::test]
async fn test_image_post_without_image_url_rejected() {
    let h = harness();
    let draft = PostDraft {
        content_type: ContentType::Image,
        ..PostDraft::text("Missing photo")
    };

    let err = h.content.create_post(&admin(), draft).await.unwrap_err();
    match err {
        DomainError::Validation(msg) => assert!(msg.contains("image_url")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_students_cannot_author() {
    let h = harness();
    let err = h
        .content
        .create_post(&student(), PostDraft::text("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = h
        .content
        .create_story(&student(), image_story("s"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

// Scenario C
#[tokio::test]
async fn test_like_toggle_counts() {
    let h = harness();
    let post = h.content.create_post(&admin(), PostDraft::text("Fest")).await.unwrap();
    let (u1, u2) = (student(), student());

    assert!(h.engagement.toggle_post_like(&u1, post.id).await.unwrap());
    assert!(h.engagement.toggle_post_like(&u2, post.id).await.unwrap());
    assert_eq!(h.store.find_post(post.id).await.unwrap().unwrap().like_count, 2);

    assert!(!h.engagement.toggle_post_like(&u1, post.id).await.unwrap());
    assert_eq!(h.store.find_post(post.id).await.unwrap().unwrap().like_count, 1);

    let item = h.feed.get_post(Some(u2.user_id), post.id).await.unwrap();
    assert!(item.is_liked_by_me);
    let item = h.feed.get_post(Some(u1.user_id), post.id).await.unwrap();
    assert!(!item.is_liked_by_me);
}

#[tokio::test]
async fn test_concurrent_toggles_from_one_user() {
    let h = harness();
    let post_id = h.content.create_post(&admin(), PostDraft::text("Race")).await.unwrap().id;
    let user = student();

    let tasks: Vec<_> = (0..25)
        .map(|_| {
            let engagement = h.engagement.clone();
            tokio::spawn(async move { engagement.toggle_post_like(&user, post_id).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let post = h.store.find_post(post_id).await.unwrap().unwrap();
    let liked = h.store.liked_posts(user.user_id, &[post_id]).await.unwrap();
    // Odd number of toggles ends liked.
    assert_eq!(post.like_count, 1);
    assert!(liked.contains(&post.id));
}

#[tokio::test]
async fn test_concurrent_likes_from_many_users() {
    let h = harness();
    let post_id = h.content.create_post(&admin(), PostDraft::text("Crowd")).await.unwrap().id;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let engagement = h.engagement.clone();
            let user = student();
            tokio::spawn(async move { engagement.toggle_post_like(&user, post_id).await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().unwrap());
    }

    assert_eq!(h.store.find_post(post_id).await.unwrap().unwrap().like_count, 20);
}

#[tokio::test]
async fn test_comment_lifecycle_and_permissions() {
    let h = harness();
    let post = h.content.create_post(&admin(), PostDraft::text("Q&A")).await.unwrap();
    let (owner, other) = (student(), student());

    let root = h
        .engagement
        .add_comment(&owner, post.id, "  When does it start?  ", None)
        .await
        .unwrap();
    assert_eq!(root.content, "When does it start?");
    h.engagement
        .add_comment(&other, post.id, "At noon", Some(root.id))
        .await
        .unwrap();
    assert_eq!(h.store.find_post(post.id).await.unwrap().unwrap().comment_count, 2);

    let threads = h.feed.list_comments(post.id).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].replies.len(), 1);

    let err = h
        .engagement
        .delete_comment(&other, post.id, root.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(msg) if msg == "You can only delete your own comments"));

    h.engagement.delete_comment(&admin(), post.id, root.id).await.unwrap();
    assert_eq!(h.store.find_post(post.id).await.unwrap().unwrap().comment_count, 1);

    let again = h.engagement.delete_comment(&owner, post.id, root.id).await;
    assert!(matches!(again, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_comment_validation() {
    let h = harness();
    let post = h.content.create_post(&admin(), PostDraft::text("Rules")).await.unwrap();
    let other_post = h.content.create_post(&admin(), PostDraft::text("Other")).await.unwrap();
    let user = student();

    let too_long = h
        .engagement
        .add_comment(&user, post.id, &"x".repeat(501), None)
        .await;
    assert!(matches!(too_long, Err(DomainError::Validation(_))));

    let foreign = h
        .engagement
        .add_comment(&user, other_post.id, "elsewhere", None)
        .await
        .unwrap();
    let bad_parent = h
        .engagement
        .add_comment(&user, post.id, "reply", Some(foreign.id))
        .await;
    assert!(matches!(bad_parent, Err(DomainError::Validation(_))));

    let wrong_post = h.engagement.delete_comment(&user, post.id, foreign.id).await;
    assert!(matches!(wrong_post, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_shares_are_repeatable() {
    let h = harness();
    let post = h.content.create_post(&admin(), PostDraft::text("Share me")).await.unwrap();
    let user = student();

    h.engagement
        .share_post(&user, post.id, Some(ShareMethod::Whatsapp))
        .await
        .unwrap();
    h.engagement.share_post(&user, post.id, None).await.unwrap();

    let item = h.feed.get_post(Some(user.user_id), post.id).await.unwrap();
    assert_eq!(item.post.share_count, 2);
    assert!(item.is_shared_by_me);
}

#[tokio::test]
async fn test_post_views_through_queue() {
    let h = harness();
    let post = h.content.create_post(&admin(), PostDraft::text("Seen")).await.unwrap();

    let engagement = h.engagement.clone();
    let queue = ViewQueue::start(ViewQueueConfig::default(), move |event| {
        let engagement = engagement.clone();
        async move { engagement.record_view(event).await }
    });

    for user_id in [None, None, Some(Uuid::new_v4())] {
        assert!(queue.submit(ViewEvent::Post {
            post_id: post.id,
            user_id,
            duration_watched_seconds: None,
        }));
    }
    // Unknown post: swallowed by the recorder.
    queue.submit(ViewEvent::Post {
        post_id: Uuid::new_v4(),
        user_id: None,
        duration_watched_seconds: Some(4),
    });
    queue.shutdown().await;

    assert_eq!(h.store.find_post(post.id).await.unwrap().unwrap().view_count, 3);
    assert_eq!(queue.stats().recorded, 4);
}

#[tokio::test]
async fn test_story_views_and_likes() {
    let h = harness();
    let story = h.content.create_story(&admin(), image_story("s1")).await.unwrap();
    let viewer = student();

    for _ in 0..3 {
        h.engagement.require_live_story(story.id).await.unwrap();
        h.engagement
            .record_view(ViewEvent::Story {
                story_id: story.id,
                user_id: viewer.user_id,
            })
            .await;
    }
    assert!(h.engagement.toggle_story_like(&viewer, story.id).await.unwrap());

    let items = h.feed.list_live_stories(Some(viewer.user_id)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].story.view_count, 1);
    assert_eq!(items[0].story.like_count, 1);
    assert!(items[0].is_viewed_by_me);
    assert!(items[0].is_liked_by_me);
    assert_eq!(items[0].time_remaining_seconds, 24 * 3600);

    h.clock.advance(Duration::hours(25));
    let expired_like = h.engagement.toggle_story_like(&viewer, story.id).await;
    assert!(matches!(expired_like, Err(DomainError::NotFound { .. })));
}

// Scenario D
#[tokio::test]
async fn test_story_expiry_and_reaper() {
    let h = harness();
    let story = h.content.create_story(&admin(), image_story("party")).await.unwrap();
    h.media.put("stories/party.jpg").await;
    h.media.put("thumbs/party.jpg").await;
    h.engagement
        .record_view(ViewEvent::Story {
            story_id: story.id,
            user_id: Uuid::new_v4(),
        })
        .await;

    assert!(h.store.expired_stories(h.clock.now()).await.unwrap().is_empty());

    h.clock.advance(Duration::hours(25));
    let expired = h.store.expired_stories(h.clock.now()).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].hours_expired, 1);
    // Hidden from feeds before the reaper runs.
    assert!(h.feed.list_live_stories(None).await.unwrap().is_empty());

    let report = h.reaper.run().await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.succeeded, 1);
    assert!(h.media.is_empty().await);
    assert!(h.store.find_story(story.id).await.unwrap().is_none());
    assert_eq!(h.store.story_edge_count(story.id).await, 0);

    // Idempotent: nothing left to do.
    assert_eq!(h.reaper.run().await.unwrap().processed, 0);
}

#[tokio::test]
async fn test_reaper_removes_row_when_blob_delete_fails() {
    let h = harness();
    let story = h.content.create_story(&admin(), image_story("stuck")).await.unwrap();
    h.media.put("stories/stuck.jpg").await;
    h.media.fail_on("stories/stuck.jpg").await;

    h.clock.advance(Duration::hours(30));
    let report = h.reaper.run().await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert!(h.store.find_story(story.id).await.unwrap().is_none());
    assert!(h.media.contains("stories/stuck.jpg").await);
}

#[tokio::test(start_paused = true)]
async fn test_reaper_soft_timeout_leaves_rest_for_next_run() {
    let options = SweepOptions {
        soft_timeout: StdDuration::from_secs(5),
        media_op_timeout: StdDuration::from_secs(10),
    };
    let h = harness_with(InMemoryMediaStore::new(), options);

    let first = h.content.create_story(&admin(), image_story("a")).await.unwrap();
    h.clock.advance(Duration::minutes(1));
    h.content.create_story(&admin(), image_story("b")).await.unwrap();
    h.content.create_story(&admin(), image_story("c")).await.unwrap();
    h.media.hang_on("stories/a.jpg").await;

    h.clock.advance(Duration::hours(25));
    let report = h.reaper.run().await.unwrap();

    // The hung call times out and counts against the item, then the deadline stops the sweep.
    assert_eq!(report.processed, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.skipped_due_to_timeout, 2);
    assert!(h.store.find_story(first.id).await.unwrap().is_none());
    assert_eq!(h.store.expired_stories(h.clock.now()).await.unwrap().len(), 2);
}

// Scenario E
#[tokio::test]
async fn test_archival_is_all_or_nothing() {
    let h = harness();
    let now = h.clock.now();
    h.clock.set(now - Duration::days(61));
    let draft = PostDraft {
        content_type: ContentType::Video,
        media: MediaUrls {
            image_url: None,
            video_url: Some(format!("{CDN}posts/clip.mp4")),
            thumbnail_url: Some(format!("{CDN}posts/clip.jpg")),
        },
        duration_seconds: Some(42),
        ..PostDraft::text("Old highlight reel")
    };
    let post = h.content.create_post(&admin(), draft).await.unwrap();
    h.clock.set(now);

    h.media.put("posts/clip.mp4").await;
    h.media.put("posts/clip.jpg").await;
    h.media.fail_on("posts/clip.jpg").await;

    let candidates = h.store.archival_candidates(now).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].age_days, 61);

    let report = h.archival.run().await.unwrap();
    assert_eq!(report.failed, 1);

    let stored = h.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.storage_class, StorageClass::Standard);
    assert!(stored.archived_at.is_none());
    // Still eligible for the next sweep.
    assert_eq!(h.store.archival_candidates(now).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_archival_marks_post_and_never_revisits() {
    let h = harness();
    let now = h.clock.now();
    h.clock.set(now - Duration::days(90));
    let post = h.content.create_post(&admin(), image_post("old")).await.unwrap();
    let text = h.content.create_post(&admin(), PostDraft::text("Old memo")).await.unwrap();
    h.clock.set(now - Duration::days(10));
    let young = h.content.create_post(&admin(), image_post("new")).await.unwrap();
    h.clock.set(now);
    h.media.put("posts/old.jpg").await;

    let report = h.archival.run().await.unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(h.media.storage_class("posts/old.jpg").await, Some(StorageClass::Archive));

    for id in [post.id, text.id] {
        let stored = h.store.find_post(id).await.unwrap().unwrap();
        assert_eq!(stored.storage_class, StorageClass::Archive);
        assert!(stored.archived_at.is_some());
    }
    let young = h.store.find_post(young.id).await.unwrap().unwrap();
    assert_eq!(young.storage_class, StorageClass::Standard);

    assert!(h.store.archival_candidates(now).await.unwrap().is_empty());
    assert_eq!(h.archival.run().await.unwrap().processed, 0);
}

#[tokio::test]
async fn test_archival_skipped_without_tier_support() {
    let h = harness_with(InMemoryMediaStore::without_archival(), SweepOptions::default());
    let now = h.clock.now();
    h.clock.set(now - Duration::days(70));
    let post = h.content.create_post(&admin(), PostDraft::text("Ancient")).await.unwrap();
    h.clock.set(now);

    let report = h.archival.run().await.unwrap();
    assert_eq!(report.processed, 0);
    assert!(h.store.find_post(post.id).await.unwrap().unwrap().archived_at.is_none());
}

#[tokio::test]
async fn test_hard_delete_cascades() {
    let h = harness();
    let post = h.content.create_post(&admin(), image_post("gone")).await.unwrap();
    h.media.put("posts/gone.jpg").await;
    let user = student();
    h.engagement.toggle_post_like(&user, post.id).await.unwrap();
    h.engagement.add_comment(&user, post.id, "bye", None).await.unwrap();
    h.engagement.share_post(&user, post.id, None).await.unwrap();
    h.engagement
        .record_view(ViewEvent::Post {
            post_id: post.id,
            user_id: None,
            duration_watched_seconds: None,
        })
        .await;
    assert_eq!(h.store.post_edge_count(post.id).await, 4);

    h.content.hard_delete_post(&admin(), post.id).await.unwrap();

    assert_eq!(h.store.post_edge_count(post.id).await, 0);
    assert!(h.store.find_post_including_deleted(post.id).await.unwrap().is_none());
    assert!(!h.media.contains("posts/gone.jpg").await);
}

#[tokio::test]
async fn test_hard_delete_keeps_row_when_blob_delete_fails() {
    let h = harness();
    let post = h.content.create_post(&admin(), image_post("locked")).await.unwrap();
    h.media.put("posts/locked.jpg").await;
    h.media.fail_on("posts/locked.jpg").await;

    let err = h.content.hard_delete_post(&admin(), post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Storage(_)));
    assert!(h.store.find_post(post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_soft_delete_and_update() {
    let h = harness();
    let author = admin();
    let post = h.content.create_post(&author, PostDraft::text("Draft")).await.unwrap();

    let empty = h.content.update_post(&author, post.id, PostChanges::default()).await;
    assert!(matches!(empty, Err(DomainError::Validation(_))));

    let forbidden = h
        .content
        .update_post(
            &student(),
            post.id,
            PostChanges {
                description: Some("hijack".to_string()),
                hashtags: None,
            },
        )
        .await;
    assert!(matches!(forbidden, Err(DomainError::Forbidden(_))));

    h.clock.advance(Duration::minutes(5));
    let updated = h
        .content
        .update_post(
            &author,
            post.id,
            PostChanges {
                description: None,
                hashtags: Some(vec!["#Notice".to_string()]),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "Draft");
    assert_eq!(updated.hashtags, vec!["notice".to_string()]);
    assert!(updated.updated_at > updated.created_at);

    h.content.soft_delete_post(&author, post.id).await.unwrap();
    let again = h.content.soft_delete_post(&author, post.id).await;
    assert!(matches!(again, Err(DomainError::NotFound { .. })));
    assert!(matches!(
        h.feed.get_post(None, post.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_posts_filters_and_pages() {
    let h = harness();
    let author = admin();
    let club = Uuid::new_v4();

    for i in 0..25 {
        let mut draft = PostDraft::text(format!("Update number {i}"));
        if i % 5 == 0 {
            draft.hashtags = vec!["sports".to_string()];
            draft.club_id = Some(club);
        }
        h.content.create_post(&author, draft).await.unwrap();
        h.clock.advance(Duration::seconds(1));
    }
    let deleted = h
        .content
        .create_post(&author, PostDraft::text("Update deleted"))
        .await
        .unwrap();
    h.content.soft_delete_post(&author, deleted.id).await.unwrap();

    let page = h
        .feed
        .list_posts(None, PostFilter::default(), PageRequest::new(Some(2), Some(10)))
        .await
        .unwrap();
    assert_eq!(page.total_count, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].post.description, "Update number 14");

    let sports = h
        .feed
        .list_posts(
            None,
            PostFilter {
                hashtag: Some("#SPORTS".to_string()),
                club_id: Some(club),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(sports.total_count, 5);
    assert_eq!(sports.items[0].post.description, "Update number 20");

    let search = h
        .feed
        .list_posts(
            None,
            PostFilter {
                search: Some("NUMBER 2".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    // 2 and 20..=24
    assert_eq!(search.total_count, 6);
}
