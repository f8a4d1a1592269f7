//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_core::DomainError;
use campus_core::domain::{
    ContentType, MediaUrls, PageRequest, PostChanges, PostDraft, PostFilter, ShareMethod,
    StoryDraft,
};

/// Request to publish a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content_type: ContentType,
    pub club_id: Option<Uuid>,
    pub house_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub description: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl From<CreatePostRequest> for PostDraft {
    fn from(req: CreatePostRequest) -> Self {
        PostDraft {
            club_id: req.club_id,
            house_id: req.house_id,
            content_type: req.content_type,
            media: MediaUrls {
                image_url: req.image_url,
                video_url: req.video_url,
                thumbnail_url: req.thumbnail_url,
            },
            duration_seconds: req.duration_seconds,
            description: req.description,
            hashtags: req.hashtags,
        }
    }
}

/// Partial update of a post. At least one field must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub description: Option<String>,
    pub hashtags: Option<Vec<String>>,
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(req: UpdatePostRequest) -> Self {
        PostChanges {
            description: req.description,
            hashtags: req.hashtags,
        }
    }
}

/// Request to publish a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStoryRequest {
    pub content_type: ContentType,
    pub club_id: Option<Uuid>,
    pub house_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub description: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

impl From<CreateStoryRequest> for StoryDraft {
    fn from(req: CreateStoryRequest) -> Self {
        StoryDraft {
            club_id: req.club_id,
            house_id: req.house_id,
            content_type: req.content_type,
            media: MediaUrls {
                image_url: req.image_url,
                video_url: req.video_url,
                thumbnail_url: req.thumbnail_url,
            },
            duration_seconds: req.duration_seconds,
            description: req.description,
            hashtags: req.hashtags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharePostRequest {
    pub share_method: Option<String>,
}

impl SharePostRequest {
    /// Parses the optional method; unknown values are a validation error.
    pub fn method(&self) -> Result<Option<ShareMethod>, DomainError> {
        self.share_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::parse)
            .transpose()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordViewRequest {
    pub duration_watched_seconds: Option<i32>,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub hashtag: Option<String>,
    pub club_id: Option<Uuid>,
    pub house_id: Option<Uuid>,
    /// Case-insensitive substring search over descriptions.
    pub q: Option<String>,
}

impl ListPostsQuery {
    pub fn filter(&self) -> PostFilter {
        PostFilter {
            hashtag: self.hashtag.clone(),
            club_id: self.club_id,
            house_id: self.house_id,
            search: self.q.clone(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
}
