//! # Campus Shared
//!
//! Request and response types exchanged over the HTTP API.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
