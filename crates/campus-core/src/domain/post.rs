use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{ContentType, MediaUrls, StorageClass, normalize_hashtags};
use crate::error::DomainError;

/// Posts older than this are moved to the archive tier by the daily sweep.
pub const ARCHIVE_AFTER_DAYS: i64 = 60;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Creation time before which a post is old enough to archive.
pub fn archive_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ARCHIVE_AFTER_DAYS)
}

/// Post entity - a durable announcement authored by admin or faculty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
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
    pub description: String,
    pub hashtags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    pub storage_class: StorageClass,

    pub like_count: i32,
    pub comment_count: i32,
    pub share_count: i32,
    pub view_count: i32,
}

impl Post {
    /// Validate a draft and build a fresh post in the STANDARD tier.
    pub fn new(created_by: Uuid, draft: PostDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let media = draft.media.normalized();
        media.validate_for_post(draft.content_type, draft.duration_seconds)?;
        validate_description(&draft.description)?;
        let hashtags = normalize_hashtags(draft.hashtags)?;

        Ok(Self {
            id: Uuid::new_v4(),
            created_by,
            club_id: draft.club_id,
            house_id: draft.house_id,
            content_type: draft.content_type,
            media,
            duration_seconds: draft.duration_seconds,
            description: draft.description,
            hashtags,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            archived_at: None,
            storage_class: StorageClass::Standard,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
            view_count: 0,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// STANDARD, not archived, not soft-deleted, and older than the retention window.
    pub fn is_archive_eligible(&self, now: DateTime<Utc>) -> bool {
        self.storage_class == StorageClass::Standard
            && self.archived_at.is_none()
            && self.deleted_at.is_none()
            && self.created_at < archive_cutoff(now)
    }

    /// Applies already validated changes.
    pub fn apply(&mut self, changes: &PostChanges, now: DateTime<Utc>) {
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(hashtags) = &changes.hashtags {
            self.hashtags = hashtags.clone();
        }
        self.updated_at = now;
    }

    pub fn mark_archived(&mut self, now: DateTime<Utc>) {
        self.archived_at = Some(now);
        self.storage_class = StorageClass::Archive;
    }
}

/// Author-supplied fields of a new post.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub club_id: Option<Uuid>,
    pub house_id: Option<Uuid>,
    pub content_type: ContentType,
    pub media: MediaUrls,
    pub duration_seconds: Option<i32>,
    pub description: String,
    pub hashtags: Vec<String>,
}

impl PostDraft {
    pub fn text(description: impl Into<String>) -> Self {
        Self {
            club_id: None,
            house_id: None,
            content_type: ContentType::Text,
            media: MediaUrls::default(),
            duration_seconds: None,
            description: description.into(),
            hashtags: Vec::new(),
        }
    }
}

/// Partial update. Only description and hashtags are mutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub description: Option<String>,
    pub hashtags: Option<Vec<String>>,
}

impl PostChanges {
    pub fn validated(self) -> Result<Self, DomainError> {
        if self.description.is_none() && self.hashtags.is_none() {
            return Err(DomainError::validation("no fields to update"));
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        let hashtags = self.hashtags.map(normalize_hashtags).transpose()?;

        Ok(Self {
            description: self.description,
            hashtags,
        })
    }
}

/// Must contain a non-whitespace character; the upper bound counts the text as given.
fn validate_description(description: &str) -> Result<(), DomainError> {
    let len = description.trim().chars().count();
    if len == 0 || description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "description must be between 1 and {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// A post the archival sweep should move to the archive tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivalCandidate {
    pub post_id: Uuid,
    pub media: MediaUrls,
    pub created_at: DateTime<Utc>,
    pub age_days: i64,
}

impl ArchivalCandidate {
    pub fn from_post(post: &Post, now: DateTime<Utc>) -> Self {
        Self {
            post_id: post.id,
            media: post.media.clone(),
            created_at: post.created_at,
            age_days: (now - post.created_at).num_days(),
        }
    }
}
