//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod clock;
mod media;
mod repository;
mod views;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use clock::Clock;
pub use media::{ArchivalStore, MediaError, MediaStore};
pub use repository::{EngagementRepository, PostRepository, StoryRepository, UserDirectory};
pub use views::{ViewEvent, ViewQueueStats, ViewSink};
