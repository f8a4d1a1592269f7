//! Domain entities - the core business objects.

mod content;
mod engagement;
mod feed;
mod post;
mod story;
mod user;

pub use content::{
    ContentType, MAX_HASHTAG_CHARS, MAX_HASHTAGS, MediaKind, MediaUrls, StorageClass, normalize_hashtags,
};
pub use engagement::{
    COMMENT_MAX_CHARS, Comment, CommentThread, NewComment, Share, ShareMethod, ViewRecord,
};
pub use feed::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, PostFeedItem, PostFilter, StoryFeedItem,
};
pub use post::{
    ARCHIVE_AFTER_DAYS, ArchivalCandidate, DESCRIPTION_MAX_CHARS, Post, PostChanges, PostDraft,
    archive_cutoff,
};
pub use story::{
    ExpiredStory, STORY_DESCRIPTION_MAX_CHARS, STORY_LIFETIME_HOURS, Story, StoryDraft,
};
pub use user::{Actor, Role, UserSummary};
