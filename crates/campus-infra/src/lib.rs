//! # Campus Infrastructure
//!
//! Concrete implementations of the ports defined in `campus-core`.
//! This crate contains database, media storage and background queue integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - PostgreSQL and JWT
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT bearer token verification
//! - `s3` - S3 media store with GLACIER archival

pub mod clock;
pub mod database;
pub mod media;
pub mod memory;
pub mod views;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use clock::{ManualClock, SystemClock};
pub use database::DatabaseConfig;
pub use media::{InMemoryMediaStore, LocalMediaStore};
pub use memory::{InMemoryFeedStore, InMemoryUserDirectory};
pub use views::{ViewQueue, ViewQueueConfig};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

// Re-exports - External backends
#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresStoryRepository, PostgresUserDirectory};
#[cfg(feature = "s3")]
pub use media::S3MediaStore;
