//! Binary object storage for uploaded CV documents.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError>;

    /// Fetches an object's bytes. `Ok(None)` when the key does not exist.
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>, AppError>;
}

/// S3 / MinIO implementation.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded object to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn fetch(&self, key: &str) -> Result<Option<Bytes>, AppError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(None);
                }
                return Err(AppError::Storage(format!("S3 download failed: {e}")));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;
        Ok(Some(data.into_bytes()))
    }
}

/// Storage key for an uploaded CV.
pub fn cv_storage_key(file_id: uuid::Uuid, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("cvs/{file_id}/{safe}")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_sanitizes_filename() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            cv_storage_key(id, "my cv (final).pdf"),
            "cvs/00000000-0000-0000-0000-000000000000/my_cv__final_.pdf"
        );
    }
}
