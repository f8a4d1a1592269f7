use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;
use crate::error::DomainError;

pub const COMMENT_MAX_CHARS: usize = 500;

/// Comment on a post. Replies point at a top-level comment on the same post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A validated comment ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
}

impl NewComment {
    /// Trims the content and checks its length.
    pub fn new(
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
        parent_comment_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        let content = content.trim();
        let len = content.chars().count();
        if len == 0 || len > COMMENT_MAX_CHARS {
            return Err(DomainError::validation(format!(
                "comment must be between 1 and {COMMENT_MAX_CHARS} characters"
            )));
        }

        Ok(Self {
            post_id,
            user_id,
            content: content.to_string(),
            parent_comment_id,
        })
    }

    pub fn into_comment(self, now: DateTime<Utc>) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id: self.post_id,
            user_id: self.user_id,
            content: self.content,
            parent_comment_id: self.parent_comment_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// A top-level comment with its author and direct replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    pub replies: Vec<CommentThread>,
}

/// Channel a post was shared through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMethod {
    Whatsapp,
    Instagram,
    CopyLink,
    Download,
}

impl ShareMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareMethod::Whatsapp => "whatsapp",
            ShareMethod::Instagram => "instagram",
            ShareMethod::CopyLink => "copy_link",
            ShareMethod::Download => "download",
        }
    }
}

impl fmt::Display for ShareMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(ShareMethod::Whatsapp),
            "instagram" => Ok(ShareMethod::Instagram),
            "copy_link" => Ok(ShareMethod::CopyLink),
            "download" => Ok(ShareMethod::Download),
            other => Err(DomainError::validation(format!(
                "share_method must be one of whatsapp, instagram, copy_link, download (got '{other}')"
            ))),
        }
    }
}

/// A share event. Users may share the same post any number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_method: Option<ShareMethod>,
    pub created_at: DateTime<Utc>,
}

impl Share {
    pub fn new(
        post_id: Uuid,
        user_id: Uuid,
        share_method: Option<ShareMethod>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            share_method,
            created_at: now,
        }
    }
}

/// A post view. Anonymous views carry no user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub viewed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_watched_seconds: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_content_is_trimmed() {
        let c = NewComment::new(Uuid::new_v4(), Uuid::new_v4(), "  nice  ", None).unwrap();
        assert_eq!(c.content, "nice");
    }

    #[test]
    fn test_comment_length_bounds() {
        let post = Uuid::new_v4();
        let user = Uuid::new_v4();
        assert!(NewComment::new(post, user, "   ", None).is_err());
        assert!(NewComment::new(post, user, &"x".repeat(501), None).is_err());
        assert!(NewComment::new(post, user, &"x".repeat(500), None).is_ok());
    }

    #[test]
    fn test_share_method_parse() {
        assert_eq!("copy_link".parse::<ShareMethod>().unwrap(), ShareMethod::CopyLink);
        assert!("telegram".parse::<ShareMethod>().is_err());
    }
}
