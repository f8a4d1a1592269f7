//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use campus_core::domain::{MediaUrls, Post};

use super::enums::{DbContentType, DbStorageClass};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_by: Uuid,
    pub club_id: Option<Uuid>,
    pub house_id: Option<Uuid>,
    pub content_type: DbContentType,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub video_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub hashtags: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub archived_at: Option<DateTimeWithTimeZone>,
    pub storage_class: DbStorageClass,
    pub like_count: i32,
    pub comment_count: i32,
    pub share_count: i32,
    pub view_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_like::Entity")]
    Likes,
    #[sea_orm(has_many = "super::post_comment::Entity")]
    Comments,
    #[sea_orm(has_many = "super::post_share::Entity")]
    Shares,
    #[sea_orm(has_many = "super::post_view::Entity")]
    Views,
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::post_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::post_share::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl Related<super::post_view::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Views.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            created_by: model.created_by,
            club_id: model.club_id,
            house_id: model.house_id,
            content_type: model.content_type.into(),
            media: MediaUrls {
                image_url: model.image_url,
                video_url: model.video_url,
                thumbnail_url: model.thumbnail_url,
            },
            duration_seconds: model.duration_seconds,
            description: model.description,
            hashtags: model.hashtags,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            deleted_at: model.deleted_at.map(Into::into),
            archived_at: model.archived_at.map(Into::into),
            storage_class: model.storage_class.into(),
            like_count: model.like_count,
            comment_count: model.comment_count,
            share_count: model.share_count,
            view_count: model.view_count,
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            created_by: Set(post.created_by),
            club_id: Set(post.club_id),
            house_id: Set(post.house_id),
            content_type: Set(post.content_type.into()),
            image_url: Set(post.media.image_url),
            video_url: Set(post.media.video_url),
            thumbnail_url: Set(post.media.thumbnail_url),
            duration_seconds: Set(post.duration_seconds),
            description: Set(post.description),
            hashtags: Set(post.hashtags),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
            deleted_at: Set(post.deleted_at.map(Into::into)),
            archived_at: Set(post.archived_at.map(Into::into)),
            storage_class: Set(post.storage_class.into()),
            like_count: Set(post.like_count),
            comment_count: Set(post.comment_count),
            share_count: Set(post.share_count),
            view_count: Set(post.view_count),
        }
    }
}
