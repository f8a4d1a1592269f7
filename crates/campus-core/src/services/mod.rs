//! Application services orchestrating ports on behalf of an authenticated actor.

mod content;
mod engagement;
mod feed;

pub use content::ContentService;
pub use engagement::EngagementService;
pub use feed::FeedService;
