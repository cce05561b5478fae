//! S3-backed object storage for archived messages.

use crate::worker::ObjectSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

/// A handle to the archive bucket.
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub fn new(client: Client, bucket: String) -> Self {
        ObjectStore { client, bucket }
    }
}

#[async_trait]
impl ObjectSink for ObjectStore {
    async fn put(&self, key: &str, body: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body.as_bytes().to_vec()))
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to upload object {:?} to bucket {:?}",
                    key, self.bucket
                )
            })?;
        Ok(())
    }
}
