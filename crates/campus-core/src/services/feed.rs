use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    Comment, CommentThread, Page, PageRequest, Post, PostFeedItem, PostFilter, StoryFeedItem,
    UserSummary,
};
use crate::error::DomainError;
use crate::ports::{Clock, EngagementRepository, PostRepository, StoryRepository, UserDirectory};

/// Read side of the feed, annotated for the calling user when one is known.
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    engagement: Arc<dyn EngagementRepository>,
    stories: Arc<dyn StoryRepository>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        engagement: Arc<dyn EngagementRepository>,
        stories: Arc<dyn StoryRepository>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            engagement,
            stories,
            users,
            clock,
        }
    }

    pub async fn list_posts(
        &self,
        viewer: Option<Uuid>,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostFeedItem>, DomainError> {
        let filter = filter.normalized();
        let (posts, total) = self.posts.list_posts(&filter, page).await?;
        let items = self.annotate_posts(viewer, posts).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get_post(&self, viewer: Option<Uuid>, id: Uuid) -> Result<PostFeedItem, DomainError> {
        let post = self
            .posts
            .find_post(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;

        self.annotate_posts(viewer, vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Live stories, newest first. Expired stories are hidden even before the reaper runs.
    pub async fn list_live_stories(
        &self,
        viewer: Option<Uuid>,
    ) -> Result<Vec<StoryFeedItem>, DomainError> {
        let now = self.clock.now();
        let stories = self.stories.list_live_stories(now).await?;
        let ids: Vec<Uuid> = stories.iter().map(|s| s.id).collect();

        let (liked, viewed) = match viewer {
            Some(user_id) => futures::try_join!(
                self.stories.liked_stories(user_id, &ids),
                self.stories.viewed_stories(user_id, &ids),
            )?,
            None => (HashSet::new(), HashSet::new()),
        };
        let creators = self
            .creators(stories.iter().map(|s| s.created_by).collect())
            .await;

        Ok(stories
            .into_iter()
            .map(|story| StoryFeedItem {
                creator: creators.get(&story.created_by).cloned(),
                is_liked_by_me: liked.contains(&story.id),
                is_viewed_by_me: viewed.contains(&story.id),
                time_remaining_seconds: story.time_remaining_seconds(now),
                story,
            })
            .collect())
    }

    /// Top-level comments oldest first, each with its direct replies.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentThread>, DomainError> {
        if self.posts.find_post(post_id).await?.is_none() {
            return Err(DomainError::post_not_found(post_id));
        }

        let comments = self.engagement.list_comments(post_id).await?;
        let users = self
            .creators(comments.iter().map(|c| c.user_id).collect())
            .await;
        Ok(build_threads(comments, &users))
    }

    async fn annotate_posts(
        &self,
        viewer: Option<Uuid>,
        posts: Vec<Post>,
    ) -> Result<Vec<PostFeedItem>, DomainError> {
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let (liked, shared) = match viewer {
            Some(user_id) => futures::try_join!(
                self.engagement.liked_posts(user_id, &ids),
                self.engagement.shared_posts(user_id, &ids),
            )?,
            None => (HashSet::new(), HashSet::new()),
        };
        let creators = self
            .creators(posts.iter().map(|p| p.created_by).collect())
            .await;

        Ok(posts
            .into_iter()
            .map(|post| PostFeedItem {
                creator: creators.get(&post.created_by).cloned(),
                is_liked_by_me: liked.contains(&post.id),
                is_shared_by_me: shared.contains(&post.id),
                post,
            })
            .collect())
    }

    /// Creator summaries are decoration; a failed lookup leaves them out.
    async fn creators(&self, mut ids: Vec<Uuid>) -> HashMap<Uuid, UserSummary> {
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.users.summaries(&ids).await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Failed to load user summaries");
                HashMap::new()
            }
        }
    }
}

fn build_threads(comments: Vec<Comment>, users: &HashMap<Uuid, UserSummary>) -> Vec<CommentThread> {
    let mut replies: HashMap<Uuid, Vec<CommentThread>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in comments {
        let thread = CommentThread {
            user: users.get(&comment.user_id).cloned(),
            comment,
            replies: Vec::new(),
        };
        match thread.comment.parent_comment_id {
            Some(parent) => replies.entry(parent).or_default().push(thread),
            None => roots.push(thread),
        }
    }

    for root in &mut roots {
        root.replies = replies.remove(&root.comment.id).unwrap_or_default();
    }
    roots
}
