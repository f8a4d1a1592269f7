use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ArchivalCandidate, Comment, ExpiredStory, PageRequest, Post, PostChanges, PostFilter, Share,
    Story, UserSummary, ViewRecord,
};
use crate::error::RepoError;

/// Post rows and their lifecycle transitions.
///
/// Read methods skip soft-deleted posts unless the name says otherwise.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Used by hard delete, which also applies to soft-deleted rows.
    async fn find_post_including_deleted(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Newest first. Returns the page and the total number of matching posts.
    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<Post>, u64), RepoError>;

    /// Returns `None` when the post is missing or soft-deleted.
    async fn update_post(
        &self,
        id: Uuid,
        changes: &PostChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError>;

    /// Returns false when nothing was deleted.
    async fn soft_delete_post(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError>;

    /// Removes the row and every engagement edge referencing it.
    async fn hard_delete_post(&self, id: Uuid) -> Result<bool, RepoError>;

    /// STANDARD, unarchived, live posts older than the retention window, oldest first.
    async fn archival_candidates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArchivalCandidate>, RepoError>;

    /// Returns false when the post no longer exists or is already archived.
    async fn mark_archived(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError>;
}

/// Engagement edges of posts. Every mutation updates the matching counter on
/// the post row in the same transaction.
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Returns the resulting liked state.
    async fn toggle_post_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    async fn add_comment(&self, comment: Comment) -> Result<Comment, RepoError>;

    /// Includes soft-deleted comments so callers can tell them apart from missing ones.
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, RepoError>;

    /// Live comments of a post, oldest first.
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Returns false when the comment was already deleted.
    async fn soft_delete_comment(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError>;

    async fn record_share(&self, share: Share) -> Result<Share, RepoError>;

    async fn record_post_view(&self, view: ViewRecord) -> Result<(), RepoError>;

    /// Subset of `post_ids` the user has liked.
    async fn liked_posts(&self, user_id: Uuid, post_ids: &[Uuid])
    -> Result<HashSet<Uuid>, RepoError>;

    /// Subset of `post_ids` the user has shared at least once.
    async fn shared_posts(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError>;
}

/// Story rows and their likes and views.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    async fn create_story(&self, story: Story) -> Result<Story, RepoError>;

    /// Returns the story even if it has expired.
    async fn find_story(&self, id: Uuid) -> Result<Option<Story>, RepoError>;

    /// Stories with `expires_at > now`, newest first.
    async fn list_live_stories(&self, now: DateTime<Utc>) -> Result<Vec<Story>, RepoError>;

    async fn hard_delete_story(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Stories with `expires_at <= now`, most expired first.
    async fn expired_stories(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredStory>, RepoError>;

    async fn toggle_story_like(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    /// Returns true when this was the first view by the user.
    async fn record_story_view(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError>;

    async fn liked_stories(
        &self,
        user_id: Uuid,
        story_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError>;

    async fn viewed_stories(
        &self,
        user_id: Uuid,
        story_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError>;
}

/// Read-only projection of the user directory owned by another service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, RepoError>;
}
