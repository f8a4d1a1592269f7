//! Post share entity. Not unique: every share is its own row.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use campus_core::domain::Share;

use super::enums::DbShareMethod;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub share_method: Option<DbShareMethod>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Share {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            user_id: model.user_id,
            share_method: model.share_method.map(Into::into),
            created_at: model.created_at.into(),
        }
    }
}

impl From<Share> for ActiveModel {
    fn from(share: Share) -> Self {
        Self {
            id: Set(share.id),
            post_id: Set(share.post_id),
            user_id: Set(share.user_id),
            share_method: Set(share.share_method.map(Into::into)),
            created_at: Set(share.created_at.into()),
        }
    }
}
