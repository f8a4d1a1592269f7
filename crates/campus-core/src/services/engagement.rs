use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Actor, Comment, NewComment, Share, ShareMethod, Story, ViewRecord};
use crate::error::DomainError;
use crate::ports::{Clock, EngagementRepository, PostRepository, StoryRepository, ViewEvent};

/// Likes, comments, shares and views on posts and stories.
pub struct EngagementService {
    posts: Arc<dyn PostRepository>,
    engagement: Arc<dyn EngagementRepository>,
    stories: Arc<dyn StoryRepository>,
    clock: Arc<dyn Clock>,
}

impl EngagementService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        engagement: Arc<dyn EngagementRepository>,
        stories: Arc<dyn StoryRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            engagement,
            stories,
            clock,
        }
    }

    /// Returns the new liked state.
    pub async fn toggle_post_like(&self, actor: &Actor, post_id: Uuid) -> Result<bool, DomainError> {
        self.require_post(post_id).await?;
        let liked = self
            .engagement
            .toggle_post_like(post_id, actor.user_id, self.clock.now())
            .await?;
        debug!(post_id = %post_id, user_id = %actor.user_id, liked, "Post like toggled");
        Ok(liked)
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        content: &str,
        parent_comment_id: Option<Uuid>,
    ) -> Result<Comment, DomainError> {
        self.require_post(post_id).await?;
        let new = NewComment::new(post_id, actor.user_id, content, parent_comment_id)?;

        if let Some(parent_id) = parent_comment_id {
            let parent = self.engagement.find_comment(parent_id).await?;
            let valid = parent.is_some_and(|p| p.post_id == post_id && !p.is_deleted());
            if !valid {
                return Err(DomainError::validation(
                    "parent comment does not exist on this post",
                ));
            }
        }

        let comment = self
            .engagement
            .add_comment(new.into_comment(self.clock.now()))
            .await?;
        debug!(post_id = %post_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Owners may delete their own comments; admins and faculty may delete any.
    pub async fn delete_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        let comment = self
            .engagement
            .find_comment(comment_id)
            .await?
            .filter(|c| c.post_id == post_id && !c.is_deleted())
            .ok_or_else(|| DomainError::comment_not_found(comment_id))?;

        if comment.user_id != actor.user_id && !actor.role.is_privileged() {
            return Err(DomainError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        if !self
            .engagement
            .soft_delete_comment(comment_id, self.clock.now())
            .await?
        {
            return Err(DomainError::comment_not_found(comment_id));
        }
        info!(comment_id = %comment_id, deleted_by = %actor.user_id, "Comment deleted");
        Ok(())
    }

    pub async fn share_post(
        &self,
        actor: &Actor,
        post_id: Uuid,
        share_method: Option<ShareMethod>,
    ) -> Result<Share, DomainError> {
        self.require_post(post_id).await?;
        let share = Share::new(post_id, actor.user_id, share_method, self.clock.now());
        Ok(self.engagement.record_share(share).await?)
    }

    pub async fn toggle_story_like(&self, actor: &Actor, story_id: Uuid) -> Result<bool, DomainError> {
        self.require_live_story(story_id).await?;
        let liked = self
            .stories
            .toggle_story_like(story_id, actor.user_id, self.clock.now())
            .await?;
        debug!(story_id = %story_id, user_id = %actor.user_id, liked, "Story like toggled");
        Ok(liked)
    }

    /// Fails with `NotFound` unless the story exists and has not expired.
    pub async fn require_live_story(&self, story_id: Uuid) -> Result<Story, DomainError> {
        self.stories
            .find_story(story_id)
            .await?
            .filter(|s| s.is_live(self.clock.now()))
            .ok_or_else(|| DomainError::story_not_found(story_id))
    }

    /// Best-effort view tracking. Failures are logged and swallowed.
    pub async fn record_view(&self, event: ViewEvent) {
        let now = self.clock.now();
        match event {
            ViewEvent::Post {
                post_id,
                user_id,
                duration_watched_seconds,
            } => {
                let view = ViewRecord {
                    post_id,
                    user_id,
                    viewed_at: now,
                    duration_watched_seconds: duration_watched_seconds.filter(|d| *d >= 0),
                };
                if let Err(e) = self.engagement.record_post_view(view).await {
                    warn!(post_id = %post_id, error = %e, "Failed to record post view");
                }
            }
            ViewEvent::Story { story_id, user_id } => {
                match self.stories.record_story_view(story_id, user_id, now).await {
                    Ok(first) => debug!(story_id = %story_id, first, "Story view recorded"),
                    Err(e) => warn!(story_id = %story_id, error = %e, "Failed to record story view"),
                }
            }
        }
    }

    async fn require_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        match self.posts.find_post(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::post_not_found(post_id)),
        }
    }
}
