//! In-memory adapters - used when no database is configured and as test doubles.
//!
//! Note: Data is lost on process restart.

mod store;
mod users;

pub use store::InMemoryFeedStore;
pub use users::InMemoryUserDirectory;

#[cfg(test)]
mod tests;
