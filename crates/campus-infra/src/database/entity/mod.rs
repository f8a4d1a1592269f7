//! SeaORM entities.

pub mod enums;
pub mod post;
pub mod post_comment;
pub mod post_like;
pub mod post_share;
pub mod post_view;
pub mod story;
pub mod story_like;
pub mod story_view;
pub mod user;
