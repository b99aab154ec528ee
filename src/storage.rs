use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::{
    error::SdkError, operation::head_object::HeadObjectError, presigning::PresigningConfig,
    primitives::ByteStream,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Lifetime of the read URL stored with each uploaded document. SigV4
/// presigned URLs cannot outlive 7 days.
pub const READ_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

// 1. StorageService Contract
/// StorageService
///
/// The object-storage operations the upload relay needs. Handlers hold an
/// `Arc<dyn StorageService>`, so tests run against `MockStorageService`
/// without any network access.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the configured bucket if missing. Local (MinIO) setup only.
    async fn ensure_bucket_exists(&self);

    /// Stores `body` under `key` and returns a time-limited read URL that the
    /// AI service can fetch the document from.
    async fn upload_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Deletes the object. Returns `Ok(false)` when nothing was stored at `key`.
    async fn delete_object(&self, key: &str) -> Result<bool, StorageError>;
}

// 2. The Real Implementation (S3/MinIO)
/// S3StorageClient
///
/// `StorageService` over the AWS SDK. Path-style addressing keeps it
/// compatible with MinIO and other S3-compatible gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket fails harmlessly when the bucket already exists.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %e, "create_bucket skipped");
        }
    }

    async fn upload_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError(e.to_string()))?;

        let presigning =
            PresigningConfig::expires_in(READ_URL_TTL).map_err(|e| StorageError(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<bool, StorageError> {
        if let Err(e) = self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            if is_missing_object(&e) {
                return Ok(false);
            }
            return Err(StorageError(e.to_string()));
        }

        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError(e.to_string()))?;
        Ok(true)
    }
}

/// Only a NotFound answer to HeadObject means the object is absent; transport,
/// auth and throttling failures are real errors.
fn is_missing_object<R>(error: &SdkError<HeadObjectError, R>) -> bool {
    matches!(error.as_service_error(), Some(e) if e.is_not_found())
}

/// sanitize_key
///
/// Strips directory navigation (`..`, `.`, empty segments) from a
/// user-provided key segment to prevent path traversal.
pub fn sanitize_key(key: &str) -> String {
    key.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// In-memory `StorageService` used by the integration tests. Objects are kept
/// in a map so tests can assert on what was uploaded and deleted.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn upload_object(
        &self,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError("Mock Storage Error: Simulation requested".to_string()));
        }
        let key = sanitize_key(key);
        let url = format!("http://localhost:9000/mock-bucket/{}?signature=fake", key);
        self.objects
            .lock()
            .map_err(|e| StorageError(e.to_string()))?
            .insert(key, body);
        Ok(url)
    }

    async fn delete_object(&self, key: &str) -> Result<bool, StorageError> {
        if self.should_fail {
            return Err(StorageError("Mock Storage Error: Simulation requested".to_string()));
        }
        let removed = self
            .objects
            .lock()
            .map_err(|e| StorageError(e.to_string()))?
            .remove(&sanitize_key(key));
        Ok(removed.is_some())
    }
}

/// StorageState
///
/// Shared handle to the storage service held in the application state.
pub type StorageState = Arc<dyn StorageService>;

#[cfg(test)]
mod tests {
    use super::*;
    use s3::types::error::NotFound;

    #[test]
    fn head_not_found_means_missing_object() {
        let error: SdkError<HeadObjectError, ()> =
            SdkError::service_error(HeadObjectError::NotFound(NotFound::builder().build()), ());
        assert!(is_missing_object(&error));
    }

    #[test]
    fn head_transport_failure_is_not_missing_object() {
        let error: SdkError<HeadObjectError, ()> = SdkError::timeout_error("connect timed out");
        assert!(!is_missing_object(&error));
    }

    #[test]
    fn sanitize_key_strips_traversal() {
        assert_eq!(sanitize_key("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_key("a/./b//c"), "a/b/c");
    }
}
