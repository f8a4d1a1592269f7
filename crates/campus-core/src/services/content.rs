use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Actor, MediaUrls, Post, PostChanges, PostDraft, Story, StoryDraft};
use crate::error::DomainError;
use crate::media::{MediaPathResolver, bounded};
use crate::ports::{Clock, MediaError, MediaStore, PostRepository, StoryRepository};

/// Authoring and removal of posts and stories. Every operation requires a
/// privileged actor.
pub struct ContentService {
    posts: Arc<dyn PostRepository>,
    stories: Arc<dyn StoryRepository>,
    media: Arc<dyn MediaStore>,
    resolver: MediaPathResolver,
    clock: Arc<dyn Clock>,
    media_timeout: Duration,
}

impl ContentService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        stories: Arc<dyn StoryRepository>,
        media: Arc<dyn MediaStore>,
        resolver: MediaPathResolver,
        clock: Arc<dyn Clock>,
        media_timeout: Duration,
    ) -> Self {
        Self {
            posts,
            stories,
            media,
            resolver,
            clock,
            media_timeout,
        }
    }

    pub async fn create_post(&self, actor: &Actor, draft: PostDraft) -> Result<Post, DomainError> {
        actor.require_privileged("create posts")?;

        let post = Post::new(actor.user_id, draft, self.clock.now())?;
        let post = self.posts.create_post(post).await?;
        info!(post_id = %post.id, content_type = %post.content_type, created_by = %actor.user_id, "Post created");
        Ok(post)
    }

    pub async fn update_post(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        actor.require_privileged("update posts")?;

        let changes = changes.validated()?;
        self.posts
            .update_post(id, &changes, self.clock.now())
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    pub async fn soft_delete_post(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        actor.require_privileged("delete posts")?;

        if !self.posts.soft_delete_post(id, self.clock.now()).await? {
            return Err(DomainError::post_not_found(id));
        }
        info!(post_id = %id, deleted_by = %actor.user_id, "Post soft-deleted");
        Ok(())
    }

    /// Deletes the media blobs, then the row. A failed blob delete leaves the row in place.
    pub async fn hard_delete_post(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        actor.require_privileged("delete posts")?;

        let post = self
            .posts
            .find_post_including_deleted(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;

        self.delete_blobs(&post.media).await?;

        if !self.posts.hard_delete_post(id).await? {
            return Err(DomainError::post_not_found(id));
        }
        info!(post_id = %id, deleted_by = %actor.user_id, "Post permanently deleted");
        Ok(())
    }

    pub async fn create_story(&self, actor: &Actor, draft: StoryDraft) -> Result<Story, DomainError> {
        actor.require_privileged("create stories")?;

        let story = Story::new(actor.user_id, draft, self.clock.now())?;
        let story = self.stories.create_story(story).await?;
        info!(story_id = %story.id, expires_at = %story.expires_at, "Story created");
        Ok(story)
    }

    pub async fn hard_delete_story(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        actor.require_privileged("delete stories")?;

        let story = self
            .stories
            .find_story(id)
            .await?
            .ok_or_else(|| DomainError::story_not_found(id))?;

        self.delete_blobs(&story.media).await?;

        if !self.stories.hard_delete_story(id).await? {
            return Err(DomainError::story_not_found(id));
        }
        info!(story_id = %id, deleted_by = %actor.user_id, "Story permanently deleted");
        Ok(())
    }

    async fn delete_blobs(&self, media: &MediaUrls) -> Result<(), DomainError> {
        for (kind, path) in self.resolver.resolve_all(media) {
            match bounded(self.media_timeout, self.media.delete(&path)).await {
                Ok(()) | Err(MediaError::NotFound(_)) => {}
                Err(e) => {
                    warn!(media = %kind, path = %path, error = %e, "Failed to delete blob");
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }
}
