//! Posts, stories and their engagement edge tables.
//!
//! `users` is owned by the identity service; it is created here only when
//! missing so a fresh database can run the feed on its own.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const UP: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    avatar_url TEXT,
    role VARCHAR(20) NOT NULL DEFAULT 'student'
        CHECK (role IN ('admin', 'faculty', 'student')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE posts (
    id UUID PRIMARY KEY,
    created_by UUID NOT NULL REFERENCES users(id),
    club_id UUID,
    house_id UUID,
    content_type VARCHAR(20) NOT NULL CHECK (content_type IN ('text', 'image', 'video')),
    image_url TEXT,
    video_url TEXT,
    thumbnail_url TEXT,
    duration_seconds INTEGER CHECK (duration_seconds IS NULL OR duration_seconds > 0),
    description TEXT NOT NULL CHECK (char_length(description) BETWEEN 1 AND 2000),
    hashtags TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ,
    archived_at TIMESTAMPTZ,
    storage_class VARCHAR(20) NOT NULL DEFAULT 'STANDARD'
        CHECK (storage_class IN ('STANDARD', 'NEARLINE', 'COLDLINE', 'ARCHIVE')),
    like_count INTEGER NOT NULL DEFAULT 0 CHECK (like_count >= 0),
    comment_count INTEGER NOT NULL DEFAULT 0 CHECK (comment_count >= 0),
    share_count INTEGER NOT NULL DEFAULT 0 CHECK (share_count >= 0),
    view_count INTEGER NOT NULL DEFAULT 0 CHECK (view_count >= 0),
    CONSTRAINT posts_media_by_type CHECK (
        (content_type = 'text' AND image_url IS NULL AND video_url IS NULL AND thumbnail_url IS NULL)
        OR (content_type = 'image' AND image_url IS NOT NULL AND video_url IS NULL)
        OR (content_type = 'video' AND video_url IS NOT NULL AND thumbnail_url IS NOT NULL AND image_url IS NULL)
    ),
    CONSTRAINT posts_archived_tier CHECK ((archived_at IS NULL) = (storage_class <> 'ARCHIVE'))
);

CREATE INDEX idx_posts_feed ON posts (created_at DESC) WHERE deleted_at IS NULL;
CREATE INDEX idx_posts_hashtags ON posts USING GIN (hashtags);
CREATE INDEX idx_posts_club ON posts (club_id) WHERE club_id IS NOT NULL;
CREATE INDEX idx_posts_house ON posts (house_id) WHERE house_id IS NOT NULL;
CREATE INDEX idx_posts_archival ON posts (created_at)
    WHERE archived_at IS NULL AND deleted_at IS NULL AND storage_class = 'STANDARD';

CREATE TABLE post_likes (
    post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (post_id, user_id)
);
CREATE INDEX idx_post_likes_user ON post_likes (user_id);

CREATE TABLE post_comments (
    id UUID PRIMARY KEY,
    post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    content TEXT NOT NULL CHECK (char_length(content) BETWEEN 1 AND 500),
    parent_comment_id UUID REFERENCES post_comments(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);
CREATE INDEX idx_post_comments_post ON post_comments (post_id, created_at);

CREATE TABLE post_shares (
    id UUID PRIMARY KEY,
    post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    share_method VARCHAR(20)
        CHECK (share_method IN ('whatsapp', 'instagram', 'copy_link', 'download')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX idx_post_shares_post_user ON post_shares (post_id, user_id);

CREATE TABLE post_views (
    id UUID PRIMARY KEY,
    post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID,
    viewed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    duration_watched_seconds INTEGER CHECK (duration_watched_seconds IS NULL OR duration_watched_seconds >= 0)
);
CREATE INDEX idx_post_views_post ON post_views (post_id);

CREATE TABLE stories (
    id UUID PRIMARY KEY,
    created_by UUID NOT NULL REFERENCES users(id),
    club_id UUID,
    house_id UUID,
    content_type VARCHAR(20) NOT NULL CHECK (content_type IN ('image', 'video')),
    image_url TEXT,
    video_url TEXT,
    thumbnail_url TEXT NOT NULL,
    duration_seconds INTEGER CHECK (duration_seconds IS NULL OR duration_seconds > 0),
    description TEXT CHECK (description IS NULL OR char_length(description) <= 500),
    hashtags TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    expires_at TIMESTAMPTZ NOT NULL,
    view_count INTEGER NOT NULL DEFAULT 0 CHECK (view_count >= 0),
    like_count INTEGER NOT NULL DEFAULT 0 CHECK (like_count >= 0),
    CONSTRAINT stories_media_by_type CHECK (
        (content_type = 'image' AND image_url IS NOT NULL AND video_url IS NULL)
        OR (content_type = 'video' AND video_url IS NOT NULL AND image_url IS NULL)
    ),
    CONSTRAINT stories_expiry_after_creation CHECK (expires_at > created_at)
);
CREATE INDEX idx_stories_expires_at ON stories (expires_at);

CREATE TABLE story_likes (
    story_id UUID NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (story_id, user_id)
);

CREATE TABLE story_views (
    story_id UUID NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    viewed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (story_id, user_id)
);
"#;

const DOWN: &str = r#"
DROP TABLE IF EXISTS story_views;
DROP TABLE IF EXISTS story_likes;
DROP TABLE IF EXISTS stories;
DROP TABLE IF EXISTS post_views;
DROP TABLE IF EXISTS post_shares;
DROP TABLE IF EXISTS post_comments;
DROP TABLE IF EXISTS post_likes;
DROP TABLE IF EXISTS posts;
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(UP).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(DOWN).await?;
        Ok(())
    }
}
