//! S3 media store. Archival is an in-place copy into the GLACIER storage class.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{MetadataDirective, StorageClass};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use campus_core::ports::{ArchivalStore, MediaError, MediaStore};

/// Unreserved URI characters plus the key's path separators stay literal.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// `CopySource` value for an object: `bucket/key` with the key URL-encoded.
fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, utf8_percent_encode(key, KEY_ENCODE_SET))
}

#[derive(Debug, Clone)]
pub struct S3MediaStore {
    client: Client,
    bucket: String,
}

impl S3MediaStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client from the standard AWS environment (region, credentials, endpoint).
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn delete(&self, path: &str) -> Result<(), MediaError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| MediaError::Backend(DisplayErrorContext(e).to_string()))?;
        tracing::debug!(bucket = %self.bucket, key = %path, "Deleted S3 object");
        Ok(())
    }

    fn as_archive(&self) -> Option<&dyn ArchivalStore> {
        Some(self)
    }
}

#[async_trait]
impl ArchivalStore for S3MediaStore {
    async fn move_to_archive(&self, path: &str) -> Result<(), MediaError> {
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .key(path)
            .copy_source(copy_source(&self.bucket, path))
            .storage_class(StorageClass::Glacier)
            .metadata_directive(MetadataDirective::Copy)
            .send()
            .await
            .map_err(|e| MediaError::Backend(DisplayErrorContext(e).to_string()))?;
        tracing::debug!(bucket = %self.bucket, key = %path, "Moved S3 object to GLACIER");
        Ok(())
    }
}
