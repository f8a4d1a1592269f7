//! PostgreSQL story repository.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, IdenStatic, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use campus_core::domain::{ExpiredStory, Story};
use campus_core::error::RepoError;
use campus_core::ports::StoryRepository;

use super::db_err;
use super::entity::story::{self, Entity as StoryEntity};
use super::entity::{story_like, story_view};

pub struct PostgresStoryRepository {
    db: DbConn,
}

impl PostgresStoryRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

async fn bump<C: ConnectionTrait>(
    conn: &C,
    story_id: Uuid,
    column: story::Column,
    delta: i32,
) -> Result<(), RepoError> {
    let value = if delta >= 0 {
        Expr::col(column).add(delta)
    } else {
        Expr::cust(format!(r#"GREATEST("{}" - {}, 0)"#, column.as_str(), -delta))
    };
    StoryEntity::update_many()
        .col_expr(column, value)
        .filter(story::Column::Id.eq(story_id))
        .exec(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

#[async_trait]
impl StoryRepository for PostgresStoryRepository {
    async fn create_story(&self, story: Story) -> Result<Story, RepoError> {
        let model = story::ActiveModel::from(story)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.into())
    }

    async fn find_story(&self, id: Uuid) -> Result<Option<Story>, RepoError> {
        let model = StoryEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_live_stories(&self, now: DateTime<Utc>) -> Result<Vec<Story>, RepoError> {
        let rows = StoryEntity::find()
            .filter(story::Column::ExpiresAt.gt(now))
            .order_by_desc(story::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn hard_delete_story(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = StoryEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn expired_stories(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredStory>, RepoError> {
        let rows = StoryEntity::find()
            .filter(story::Column::ExpiresAt.lte(now))
            .order_by_asc(story::Column::ExpiresAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|model| {
                let story: Story = model.into();
                ExpiredStory::from_story(&story, now)
            })
            .collect())
    }

    async fn toggle_story_like(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let removed = story_like::Entity::delete_many()
            .filter(story_like::Column::StoryId.eq(story_id))
            .filter(story_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let liked = if removed.rows_affected > 0 {
            bump(&txn, story_id, story::Column::LikeCount, -1).await?;
            false
        } else {
            let like = story_like::ActiveModel {
                story_id: Set(story_id),
                user_id: Set(user_id),
                created_at: Set(now.into()),
            };
            let inserted = story_like::Entity::insert(like)
                .on_conflict(
                    OnConflict::columns([story_like::Column::StoryId, story_like::Column::UserId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
            if inserted > 0 {
                bump(&txn, story_id, story::Column::LikeCount, 1).await?;
            }
            true
        };

        txn.commit().await.map_err(db_err)?;
        Ok(liked)
    }

    async fn record_story_view(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let view = story_view::ActiveModel {
            story_id: Set(story_id),
            user_id: Set(user_id),
            viewed_at: Set(now.into()),
        };
        let inserted = story_view::Entity::insert(view)
            .on_conflict(
                OnConflict::columns([story_view::Column::StoryId, story_view::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
        if inserted > 0 {
            bump(&txn, story_id, story::Column::ViewCount, 1).await?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(inserted > 0)
    }

    async fn liked_stories(
        &self,
        user_id: Uuid,
        story_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if story_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = story_like::Entity::find()
            .select_only()
            .column(story_like::Column::StoryId)
            .filter(story_like::Column::UserId.eq(user_id))
            .filter(story_like::Column::StoryId.is_in(story_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(ids.into_iter().collect())
    }

    async fn viewed_stories(
        &self,
        user_id: Uuid,
        story_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if story_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = story_view::Entity::find()
            .select_only()
            .column(story_view::Column::StoryId)
            .filter(story_view::Column::UserId.eq(user_id))
            .filter(story_view::Column::StoryId.is_in(story_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(ids.into_iter().collect())
    }
}
