//! User directory backed by the shared `users` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter};
use uuid::Uuid;

use campus_core::domain::UserSummary;
use campus_core::error::RepoError;
use campus_core::ports::UserDirectory;

use super::db_err;
use super::entity::user;

pub struct PostgresUserDirectory {
    db: DbConn,
}

impl PostgresUserDirectory {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|model| (model.id, UserSummary::from(model)))
            .collect())
    }
}
