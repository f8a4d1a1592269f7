//! PostgreSQL persistence via SeaORM.

mod connections;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
pub mod filters;
#[cfg(feature = "postgres")]
mod posts;
#[cfg(feature = "postgres")]
mod stories;
#[cfg(feature = "postgres")]
mod users;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use posts::PostgresPostRepository;
#[cfg(feature = "postgres")]
pub use stories::PostgresStoryRepository;
#[cfg(feature = "postgres")]
pub use users::PostgresUserDirectory;

#[cfg(feature = "postgres")]
use campus_core::error::RepoError;

/// Maps a SeaORM error onto the repository taxonomy.
#[cfg(feature = "postgres")]
pub(crate) fn db_err(err: sea_orm::DbErr) -> RepoError {
    use sea_orm::{DbErr, SqlErr};

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg))
        | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => RepoError::Constraint(msg),
        _ => match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
            _ => RepoError::Query(err.to_string()),
        },
    }
}

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
