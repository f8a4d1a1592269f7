//! Media store implementations.

mod local;
mod memory;
#[cfg(feature = "s3")]
mod s3;

pub use local::LocalMediaStore;
pub use memory::InMemoryMediaStore;
#[cfg(feature = "s3")]
pub use s3::S3MediaStore;
