//! # Campus Core
//!
//! The domain layer of the campus feed backend: posts, stories, their engagement
//! edges, and the background jobs that move post media to cold storage and reap
//! expired stories.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod media;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
