use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use campus_core::domain::{
    ArchivalCandidate, Comment, ExpiredStory, PageRequest, Post, PostChanges, PostFilter, Share,
    Story, ViewRecord,
};
use campus_core::error::RepoError;
use campus_core::ports::{EngagementRepository, PostRepository, StoryRepository};

#[derive(Default)]
struct State {
    posts: HashMap<Uuid, Post>,
    post_likes: HashSet<(Uuid, Uuid)>,
    comments: HashMap<Uuid, Comment>,
    shares: Vec<Share>,
    post_views: Vec<ViewRecord>,
    stories: HashMap<Uuid, Story>,
    story_likes: HashSet<(Uuid, Uuid)>,
    story_views: HashSet<(Uuid, Uuid)>,
}

impl State {
    fn live_post_mut(&mut self, id: Uuid) -> Result<&mut Post, RepoError> {
        self.posts
            .get_mut(&id)
            .filter(|p| !p.is_deleted())
            .ok_or(RepoError::NotFound)
    }

    fn story_mut(&mut self, id: Uuid) -> Result<&mut Story, RepoError> {
        self.stories.get_mut(&id).ok_or(RepoError::NotFound)
    }
}

/// Posts, stories and their engagement edges behind a single lock, so every
/// edge mutation and its counter update happen atomically.
#[derive(Default)]
pub struct InMemoryFeedStore {
    state: RwLock<State>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edge rows of any kind still referencing the post.
    pub async fn post_edge_count(&self, post_id: Uuid) -> usize {
        let state = self.state.read().await;
        state.post_likes.iter().filter(|(p, _)| *p == post_id).count()
            + state.comments.values().filter(|c| c.post_id == post_id).count()
            + state.shares.iter().filter(|s| s.post_id == post_id).count()
            + state.post_views.iter().filter(|v| v.post_id == post_id).count()
    }

    /// Number of edge rows of any kind still referencing the story.
    pub async fn story_edge_count(&self, story_id: Uuid) -> usize {
        let state = self.state.read().await;
        state.story_likes.iter().filter(|(s, _)| *s == story_id).count()
            + state.story_views.iter().filter(|(s, _)| *s == story_id).count()
    }
}

#[async_trait]
impl PostRepository for InMemoryFeedStore {
    async fn create_post(&self, post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if state.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!("post {} already exists", post.id)));
        }
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).filter(|p| !p.is_deleted()).cloned())
    }

    async fn find_post_including_deleted(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let state = self.state.read().await;
        let mut matching: Vec<&Post> = state
            .posts
            .values()
            .filter(|p| !p.is_deleted() && filter.matches(p))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.page_size as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn update_post(
        &self,
        id: Uuid,
        changes: &PostChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let mut state = self.state.write().await;
        match state.live_post_mut(id) {
            Ok(post) => {
                post.apply(changes, now);
                Ok(Some(post.clone()))
            }
            Err(_) => Ok(None),
        }
    }

    async fn soft_delete_post(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        match state.live_post_mut(id) {
            Ok(post) => {
                post.deleted_at = Some(now);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn hard_delete_post(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.post_likes.retain(|(p, _)| *p != id);
        state.comments.retain(|_, c| c.post_id != id);
        state.shares.retain(|s| s.post_id != id);
        state.post_views.retain(|v| v.post_id != id);
        Ok(true)
    }

    async fn archival_candidates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArchivalCandidate>, RepoError> {
        let state = self.state.read().await;
        let mut eligible: Vec<&Post> = state
            .posts
            .values()
            .filter(|p| p.is_archive_eligible(now))
            .collect();
        eligible.sort_by_key(|p| p.created_at);
        Ok(eligible
            .into_iter()
            .map(|p| ArchivalCandidate::from_post(p, now))
            .collect())
    }

    async fn mark_archived(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        match state.live_post_mut(id) {
            Ok(post) if !post.is_archived() => {
                post.mark_archived(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl EngagementRepository for InMemoryFeedStore {
    async fn toggle_post_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        _now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        state.live_post_mut(post_id)?;

        let liked = if state.post_likes.remove(&(post_id, user_id)) {
            false
        } else {
            state.post_likes.insert((post_id, user_id));
            true
        };
        let post = state.live_post_mut(post_id)?;
        post.like_count = if liked {
            post.like_count + 1
        } else {
            (post.like_count - 1).max(0)
        };
        Ok(liked)
    }

    async fn add_comment(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut state = self.state.write().await;
        state.live_post_mut(comment.post_id)?.comment_count += 1;
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id && !c.is_deleted())
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn soft_delete_comment(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let Some(comment) = state.comments.get_mut(&id).filter(|c| !c.is_deleted()) else {
            return Ok(false);
        };
        comment.deleted_at = Some(now);
        comment.updated_at = now;
        let post_id = comment.post_id;

        if let Some(post) = state.posts.get_mut(&post_id) {
            post.comment_count = (post.comment_count - 1).max(0);
        }
        Ok(true)
    }

    async fn record_share(&self, share: Share) -> Result<Share, RepoError> {
        let mut state = self.state.write().await;
        state.live_post_mut(share.post_id)?.share_count += 1;
        state.shares.push(share.clone());
        Ok(share)
    }

    async fn record_post_view(&self, view: ViewRecord) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.live_post_mut(view.post_id)?.view_count += 1;
        state.post_views.push(view);
        Ok(())
    }

    async fn liked_posts(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(post_ids
            .iter()
            .copied()
            .filter(|id| state.post_likes.contains(&(*id, user_id)))
            .collect())
    }

    async fn shared_posts(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .shares
            .iter()
            .filter(|s| s.user_id == user_id && post_ids.contains(&s.post_id))
            .map(|s| s.post_id)
            .collect())
    }
}

#[async_trait]
impl StoryRepository for InMemoryFeedStore {
    async fn create_story(&self, story: Story) -> Result<Story, RepoError> {
        let mut state = self.state.write().await;
        if state.stories.contains_key(&story.id) {
            return Err(RepoError::Constraint(format!("story {} already exists", story.id)));
        }
        state.stories.insert(story.id, story.clone());
        Ok(story)
    }

    async fn find_story(&self, id: Uuid) -> Result<Option<Story>, RepoError> {
        Ok(self.state.read().await.stories.get(&id).cloned())
    }

    async fn list_live_stories(&self, now: DateTime<Utc>) -> Result<Vec<Story>, RepoError> {
        let state = self.state.read().await;
        let mut live: Vec<Story> = state
            .stories
            .values()
            .filter(|s| s.is_live(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(live)
    }

    async fn hard_delete_story(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        if state.stories.remove(&id).is_none() {
            return Ok(false);
        }
        state.story_likes.retain(|(s, _)| *s != id);
        state.story_views.retain(|(s, _)| *s != id);
        Ok(true)
    }

    async fn expired_stories(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredStory>, RepoError> {
        let state = self.state.read().await;
        let mut expired: Vec<&Story> = state
            .stories
            .values()
            .filter(|s| !s.is_live(now))
            .collect();
        expired.sort_by_key(|s| s.expires_at);
        Ok(expired
            .into_iter()
            .map(|s| ExpiredStory::from_story(s, now))
            .collect())
    }

    async fn toggle_story_like(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        _now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        state.story_mut(story_id)?;

        let liked = if state.story_likes.remove(&(story_id, user_id)) {
            false
        } else {
            state.story_likes.insert((story_id, user_id));
            true
        };
        let story = state.story_mut(story_id)?;
        story.like_count = if liked {
            story.like_count + 1
        } else {
            (story.like_count - 1).max(0)
        };
        Ok(liked)
    }

    async fn record_story_view(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        _now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        state.story_mut(story_id)?;
        if !state.story_views.insert((story_id, user_id)) {
            return Ok(false);
        }
        state.story_mut(story_id)?.view_count += 1;
        Ok(true)
    }

    async fn liked_stories(
        &self,
        user_id: Uuid,
        story_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(story_ids
            .iter()
            .copied()
            .filter(|id| state.story_likes.contains(&(*id, user_id)))
            .collect())
    }

    async fn viewed_stories(
        &self,
        user_id: Uuid,
        story_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(story_ids
            .iter()
            .copied()
            .filter(|id| state.story_views.contains(&(*id, user_id)))
            .collect())
    }
}
