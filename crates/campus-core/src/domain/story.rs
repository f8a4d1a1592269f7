use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{ContentType, MediaUrls, normalize_hashtags};
use crate::error::DomainError;

/// Stories are visible for this long after creation.
pub const STORY_LIFETIME_HOURS: i64 = 24;
pub const STORY_DESCRIPTION_MAX_CHARS: usize = 500;

/// Story entity - ephemeral media that disappears a day after posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub created_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_id: Option<Uuid>,

    pub content_type: ContentType,
    #[serde(flatten)]
    pub media: MediaUrls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub hashtags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,

    pub view_count: i32,
    pub like_count: i32,
}

impl Story {
    /// Validate a draft and build a story that expires `STORY_LIFETIME_HOURS` from `now`.
    pub fn new(created_by: Uuid, draft: StoryDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let media = draft.media.normalized();
        media.validate_for_story(draft.content_type, draft.duration_seconds)?;

        let description = draft
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description
            && d.chars().count() > STORY_DESCRIPTION_MAX_CHARS
        {
            return Err(DomainError::validation(format!(
                "story description must be at most {STORY_DESCRIPTION_MAX_CHARS} characters"
            )));
        }
        let hashtags = normalize_hashtags(draft.hashtags)?;

        Ok(Self {
            id: Uuid::new_v4(),
            created_by,
            club_id: draft.club_id,
            house_id: draft.house_id,
            content_type: draft.content_type,
            media,
            duration_seconds: draft.duration_seconds,
            description,
            hashtags,
            created_at: now,
            expires_at: now + Duration::hours(STORY_LIFETIME_HOURS),
            view_count: 0,
            like_count: 0,
        })
    }

    /// A story is live strictly before its expiry instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Seconds until expiry, never negative.
    pub fn time_remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Author-supplied fields of a new story.
#[derive(Debug, Clone)]
pub struct StoryDraft {
    pub club_id: Option<Uuid>,
    pub house_id: Option<Uuid>,
    pub content_type: ContentType,
    pub media: MediaUrls,
    pub duration_seconds: Option<i32>,
    pub description: Option<String>,
    pub hashtags: Vec<String>,
}

impl StoryDraft {
    pub fn image(image_url: impl Into<String>, thumbnail_url: impl Into<String>) -> Self {
        Self {
            club_id: None,
            house_id: None,
            content_type: ContentType::Image,
            media: MediaUrls {
                image_url: Some(image_url.into()),
                video_url: None,
                thumbnail_url: Some(thumbnail_url.into()),
            },
            duration_seconds: None,
            description: None,
            hashtags: Vec::new(),
        }
    }
}

/// A story past its expiry, queued for reaping.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiredStory {
    pub story_id: Uuid,
    pub media: MediaUrls,
    pub expires_at: DateTime<Utc>,
    pub hours_expired: i64,
}

impl ExpiredStory {
    pub fn from_story(story: &Story, now: DateTime<Utc>) -> Self {
        Self {
            story_id: story.id,
            media: story.media.clone(),
            expires_at: story.expires_at,
            hours_expired: (now - story.expires_at).num_hours(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_expires_after_a_day() {
        let now = Utc::now();
        let story = Story::new(Uuid::new_v4(), StoryDraft::image("a.jpg", "t.jpg"), now).unwrap();

        assert_eq!(story.expires_at, now + Duration::hours(24));
        assert!(story.is_live(now + Duration::hours(23)));
        assert!(!story.is_live(story.expires_at));
    }

    #[test]
    fn test_time_remaining_is_clamped() {
        let now = Utc::now();
        let story = Story::new(Uuid::new_v4(), StoryDraft::image("a.jpg", "t.jpg"), now).unwrap();

        assert_eq!(story.time_remaining_seconds(now), 24 * 3600);
        assert_eq!(story.time_remaining_seconds(now + Duration::hours(30)), 0);
    }

    #[test]
    fn test_long_description_rejected() {
        let mut draft = StoryDraft::image("a.jpg", "t.jpg");
        draft.description = Some("x".repeat(501));
        assert!(Story::new(Uuid::new_v4(), draft, Utc::now()).is_err());
    }

    #[test]
    fn test_expired_story_hours() {
        let now = Utc::now();
        let story = Story::new(Uuid::new_v4(), StoryDraft::image("a.jpg", "t.jpg"), now).unwrap();
        let expired = ExpiredStory::from_story(&story, now + Duration::hours(27));
        assert_eq!(expired.hours_expired, 3);
    }
}
