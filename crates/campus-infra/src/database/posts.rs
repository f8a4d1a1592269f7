//! PostgreSQL post repository. Engagement edges and their counters are written
//! in the same transaction.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, IdenStatic,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use campus_core::domain::{
    ArchivalCandidate, Comment, PageRequest, Post, PostChanges, PostFilter, Share, ViewRecord,
    archive_cutoff,
};
use campus_core::error::RepoError;
use campus_core::ports::{EngagementRepository, PostRepository};

use super::db_err;
use super::entity::enums::DbStorageClass;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::{post_comment, post_like, post_share, post_view};
use super::filters::post_condition;

pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Adds `delta` to a counter column, never letting it drop below zero.
async fn bump<C: ConnectionTrait>(
    conn: &C,
    post_id: Uuid,
    column: post::Column,
    delta: i32,
) -> Result<(), RepoError> {
    let value = if delta >= 0 {
        Expr::col(column).add(delta)
    } else {
        Expr::cust(format!(r#"GREATEST("{}" - {}, 0)"#, column.as_str(), -delta))
    };
    PostEntity::update_many()
        .col_expr(column, value)
        .filter(post::Column::Id.eq(post_id))
        .exec(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, post: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.into())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .filter(post::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn find_post_including_deleted(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let query = PostEntity::find().filter(post_condition(filter));

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let rows = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(page.offset())
            .limit(page.page_size)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        tracing::debug!(total, returned = rows.len(), page = page.page, "Listed posts");
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn update_post(
        &self,
        id: Uuid,
        changes: &PostChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let mut update = PostEntity::update_many()
            .col_expr(post::Column::UpdatedAt, Expr::value(now))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::DeletedAt.is_null());
        if let Some(description) = &changes.description {
            update = update.col_expr(post::Column::Description, Expr::value(description.clone()));
        }
        if let Some(hashtags) = &changes.hashtags {
            update = update.col_expr(post::Column::Hashtags, Expr::value(hashtags.clone()));
        }

        let updated = update
            .exec_with_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn soft_delete_post(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::DeletedAt, Expr::value(now))
            .col_expr(post::Column::UpdatedAt, Expr::value(now))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn hard_delete_post(&self, id: Uuid) -> Result<bool, RepoError> {
        // Edge rows go with it through ON DELETE CASCADE.
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn archival_candidates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ArchivalCandidate>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::StorageClass.eq(DbStorageClass::Standard))
            .filter(post::Column::ArchivedAt.is_null())
            .filter(post::Column::DeletedAt.is_null())
            .filter(post::Column::CreatedAt.lt(archive_cutoff(now)))
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|model| {
                let post: Post = model.into();
                ArchivalCandidate::from_post(&post, now)
            })
            .collect())
    }

    async fn mark_archived(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::ArchivedAt, Expr::value(now))
            .col_expr(post::Column::StorageClass, Expr::value(DbStorageClass::Archive))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::ArchivedAt.is_null())
            .filter(post::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl EngagementRepository for PostgresPostRepository {
    async fn toggle_post_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let removed = post_like::Entity::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let liked = if removed.rows_affected > 0 {
            bump(&txn, post_id, post::Column::LikeCount, -1).await?;
            false
        } else {
            let like = post_like::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(user_id),
                created_at: Set(now.into()),
            };
            let inserted = post_like::Entity::insert(like)
                .on_conflict(
                    OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
            // Zero rows means a concurrent toggle inserted first: already liked.
            if inserted > 0 {
                bump(&txn, post_id, post::Column::LikeCount, 1).await?;
            }
            true
        };

        txn.commit().await.map_err(db_err)?;
        Ok(liked)
    }

    async fn add_comment(&self, comment: Comment) -> Result<Comment, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let post_id = comment.post_id;

        let model = post_comment::ActiveModel::from(comment)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        bump(&txn, post_id, post::Column::CommentCount, 1).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let model = post_comment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let rows = post_comment::Entity::find()
            .filter(post_comment::Column::PostId.eq(post_id))
            .filter(post_comment::Column::DeletedAt.is_null())
            .order_by_asc(post_comment::Column::CreatedAt)
            .order_by_asc(post_comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn soft_delete_comment(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let deleted = post_comment::Entity::update_many()
            .col_expr(post_comment::Column::DeletedAt, Expr::value(now))
            .col_expr(post_comment::Column::UpdatedAt, Expr::value(now))
            .filter(post_comment::Column::Id.eq(id))
            .filter(post_comment::Column::DeletedAt.is_null())
            .exec_with_returning(&txn)
            .await
            .map_err(db_err)?;

        let Some(comment) = deleted.into_iter().next() else {
            return Ok(false);
        };
        bump(&txn, comment.post_id, post::Column::CommentCount, -1).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn record_share(&self, share: Share) -> Result<Share, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let post_id = share.post_id;

        let model = post_share::ActiveModel::from(share)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        bump(&txn, post_id, post::Column::ShareCount, 1).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(model.into())
    }

    async fn record_post_view(&self, view: ViewRecord) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let row = post_view::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(view.post_id),
            user_id: Set(view.user_id),
            viewed_at: Set(view.viewed_at.into()),
            duration_watched_seconds: Set(view.duration_watched_seconds),
        };
        post_view::Entity::insert(row)
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
        bump(&txn, view.post_id, post::Column::ViewCount, 1).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn liked_posts(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = post_like::Entity::find()
            .select_only()
            .column(post_like::Column::PostId)
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.is_in(post_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(ids.into_iter().collect())
    }

    async fn shared_posts(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = post_share::Entity::find()
            .select_only()
            .column(post_share::Column::PostId)
            .distinct()
            .filter(post_share::Column::UserId.eq(user_id))
            .filter(post_share::Column::PostId.is_in(post_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(ids.into_iter().collect())
    }
}
