//! Story entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use campus_core::domain::{MediaUrls, Story};

use super::enums::DbContentType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stories")]
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
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub hashtags: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
    pub view_count: i32,
    pub like_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::story_like::Entity")]
    Likes,
    #[sea_orm(has_many = "super::story_view::Entity")]
    Views,
}

impl Related<super::story_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::story_view::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Views.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Story {
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
            expires_at: model.expires_at.into(),
            view_count: model.view_count,
            like_count: model.like_count,
        }
    }
}

impl From<Story> for ActiveModel {
    fn from(story: Story) -> Self {
        Self {
            id: Set(story.id),
            created_by: Set(story.created_by),
            club_id: Set(story.club_id),
            house_id: Set(story.house_id),
            content_type: Set(story.content_type.into()),
            image_url: Set(story.media.image_url),
            video_url: Set(story.media.video_url),
            thumbnail_url: Set(story.media.thumbnail_url),
            duration_seconds: Set(story.duration_seconds),
            description: Set(story.description),
            hashtags: Set(story.hashtags),
            created_at: Set(story.created_at.into()),
            expires_at: Set(story.expires_at.into()),
            view_count: Set(story.view_count),
            like_count: Set(story.like_count),
        }
    }
}
