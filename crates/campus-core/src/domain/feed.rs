use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::Post;
use super::story::Story;
use super::user::UserSummary;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit OFFSET.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// Optional filters for listing posts. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostFilter {
    pub hashtag: Option<String>,
    pub club_id: Option<Uuid>,
    pub house_id: Option<Uuid>,
    pub search: Option<String>,
}

impl PostFilter {
    /// Blank strings are dropped and the hashtag is normalized like stored tags.
    pub fn normalized(self) -> Self {
        let hashtag = self
            .hashtag
            .map(|t| t.trim().trim_start_matches('#').trim().to_lowercase())
            .filter(|t| !t.is_empty());
        let search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            hashtag,
            club_id: self.club_id,
            house_id: self.house_id,
            search,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(tag) = &self.hashtag
            && !post.hashtags.iter().any(|t| t == tag)
        {
            return false;
        }
        if self.club_id.is_some() && post.club_id != self.club_id {
            return false;
        }
        if self.house_id.is_some() && post.house_id != self.house_id {
            return false;
        }
        if let Some(search) = &self.search
            && !post
                .description
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }
        true
    }
}

/// 1-based page request, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Out of range values fall back to the defaults. Pages past `MAX_PAGE` are capped.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1).min(MAX_PAGE);
        let page_size = page_size
            .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_count: u64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_count,
            total_pages: total_count.div_ceil(request.page_size),
        }
    }
}

/// A post annotated for the caller.
#[derive(Debug, Clone, Serialize)]
pub struct PostFeedItem {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserSummary>,
    pub is_liked_by_me: bool,
    pub is_shared_by_me: bool,
}

/// A live story annotated for the caller.
#[derive(Debug, Clone, Serialize)]
pub struct StoryFeedItem {
    #[serde(flatten)]
    pub story: Story,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserSummary>,
    pub is_liked_by_me: bool,
    pub is_viewed_by_me: bool,
    pub time_remaining_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostDraft;
    use chrono::Utc;

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, page_size: 20 });
        assert_eq!(PageRequest::new(Some(0), Some(500)), PageRequest { page: 1, page_size: 20 });
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let request = PageRequest::new(Some(u64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(request.page, MAX_PAGE);
        assert!(request.offset() <= i64::MAX as u64);

        let page: Page<u8> = Page::new(vec![], request, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], PageRequest::new(Some(1), Some(20)), 41);
        assert_eq!(page.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_filter_matches() {
        let mut draft = PostDraft::text("Annual Sports Meet");
        draft.hashtags = vec!["sports".to_string()];
        let post = Post::new(Uuid::new_v4(), draft, Utc::now()).unwrap();

        let by_tag = PostFilter {
            hashtag: Some("#Sports".to_string()),
            ..Default::default()
        }
        .normalized();
        assert!(by_tag.matches(&post));

        let by_search = PostFilter {
            search: Some("sports meet".to_string()),
            ..Default::default()
        };
        assert!(by_search.matches(&post));

        let other_club = PostFilter {
            club_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!other_club.matches(&post));
    }
}
