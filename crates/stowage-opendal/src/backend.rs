//! Storage backend implementation.

use std::path::Path;

use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::config::S3Config;
use crate::error::{StorageError, StorageResult};

/// Object-storage backend that wraps an OpenDAL S3 operator.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: S3Config,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            bucket = %config.bucket,
            region = ?config.region,
            static_credentials = config.has_static_credentials(),
            "Storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Uploads a local file under the given object key.
    ///
    /// The key is used verbatim, directory separators included; callers
    /// that want a basename key must pass one. The local file is read
    /// first, so a missing or unreadable file fails with
    /// [`StorageError::FileOpen`] before any request reaches the service.
    /// Single-shot vs. multipart transfer is the SDK's decision.
    pub async fn upload_file(
        &self,
        key: &str,
        path: impl AsRef<Path>,
    ) -> StorageResult<ObjectMetadata> {
        let path = path.as_ref();

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| StorageError::file_open(path, source))?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = data.len(),
            "Uploading file"
        );

        self.operator.write(key, data).await?;

        let metadata = self.stat(key).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = metadata.size,
            "Upload complete"
        );

        Ok(metadata)
    }

    /// Reads an object from storage.
    pub async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let data = self.operator.read(path).await?.to_vec();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "Object read complete"
        );

        Ok(data)
    }

    /// Checks if an object exists.
    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(path).await?)
    }

    /// Gets metadata for an object.
    pub async fn stat(&self, path: &str) -> StorageResult<ObjectMetadata> {
        let meta = self.operator.stat(path).await?;

        // Convert chrono DateTime to jiff Timestamp
        let last_modified = meta
            .last_modified()
            .and_then(|dt| jiff::Timestamp::from_second(dt.timestamp()).ok());

        Ok(ObjectMetadata {
            size: meta.content_length(),
            last_modified,
            content_type: meta.content_type().map(|s| s.to_string()),
        })
    }

    /// Creates an OpenDAL operator from the configuration.
    ///
    /// Builder fields are only set for values that were actually resolved;
    /// everything else is left to OpenDAL's default AWS loader.
    fn create_operator(config: &S3Config) -> StorageResult<Operator> {
        if config.bucket.is_empty() {
            return Err(StorageError::init("bucket name is required"));
        }

        let mut builder = services::S3::default().bucket(&config.bucket);

        if let Some(ref region) = config.region {
            builder = builder.region(region);
        }

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        if let Some(ref access_key_id) = config.access_key_id {
            builder = builder.access_key_id(access_key_id);
        }

        if let Some(ref secret_access_key) = config.secret_access_key {
            builder = builder.secret_access_key(secret_access_key);
        }

        Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| StorageError::init(e.to_string()))
    }
}

/// Object metadata.
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: Option<jiff::Timestamp>,
    /// Content type / MIME type.
    pub content_type: Option<String>,
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("bucket", &self.config.bucket)
            .field("region", &self.config.region)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn memory_backend() -> StorageBackend {
        let operator = Operator::new(services::Memory::default())
            .map(|op| op.finish())
            .unwrap();

        StorageBackend {
            operator,
            config: S3Config::new("test-bucket"),
        }
    }

    fn local_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn upload_round_trip_preserves_bytes() {
        let backend = memory_backend();
        let file = local_file(b"hello object storage");

        let metadata = backend
            .upload_file("dir/test.txt", file.path())
            .await
            .unwrap();

        assert_eq!(metadata.size, 20);
        assert_eq!(
            backend.read("dir/test.txt").await.unwrap(),
            b"hello object storage"
        );
    }

    #[tokio::test]
    async fn upload_key_is_used_verbatim() {
        let backend = memory_backend();
        let file = local_file(b"payload");

        backend
            .upload_file("nested/dir/test.txt", file.path())
            .await
            .unwrap();

        // The object lives under the full key, not under its basename.
        assert!(backend.exists("nested/dir/test.txt").await.unwrap());
        assert!(!backend.exists("test.txt").await.unwrap());
    }

    #[tokio::test]
    async fn missing_local_file_fails_before_any_upload() {
        let backend = memory_backend();

        let err = backend
            .upload_file("test.txt", "does/not/exist.txt")
            .await
            .unwrap_err();

        assert!(err.is_file_open());
        assert!(!backend.exists("test.txt").await.unwrap());
    }

    #[tokio::test]
    async fn stat_missing_object_is_not_found() {
        let backend = memory_backend();

        let err = backend.stat("absent.txt").await.unwrap_err();

        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn empty_bucket_is_rejected() {
        let err = StorageBackend::create_operator(&S3Config::new("")).unwrap_err();

        assert!(matches!(err, StorageError::Init(_)));
    }

    #[test]
    fn operator_builds_without_static_credentials() {
        // Credentials are resolved by the ambient chain at request time,
        // so construction must not require them.
        let config = S3Config::new("ambient-bucket").with_region("us-east-1");

        assert!(StorageBackend::create_operator(&config).is_ok());
    }
}
