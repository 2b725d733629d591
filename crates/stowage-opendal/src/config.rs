//! Amazon S3 configuration.

use serde::{Deserialize, Serialize};

/// Amazon S3 configuration.
///
/// Only the bucket is mandatory. Every other field is optional and, when
/// unset, is resolved by OpenDAL's default AWS loader at request time
/// (environment variables, shared credential files, instance metadata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// AWS region. Unset means "let the ambient chain decide"; this is
    /// never an empty string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint URL (for S3-compatible storage like MinIO, R2).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Access key ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Creates a new S3 configuration for the given bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the custom endpoint (for S3-compatible storage).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Returns whether static credentials are configured.
    ///
    /// When false, authentication is left to the ambient credential chain.
    #[must_use]
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let config = S3Config::new("releases")
            .with_region("eu-central-1")
            .with_endpoint("http://localhost:9000")
            .with_credentials("AKIDEXAMPLE", "secret");

        assert_eq!(config.bucket, "releases");
        assert_eq!(config.region.as_deref(), Some("eu-central-1"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.has_static_credentials());
    }

    #[test]
    fn bare_config_defers_to_ambient_chain() {
        let config = S3Config::new("releases");

        assert!(config.region.is_none());
        assert!(config.endpoint.is_none());
        assert!(!config.has_static_credentials());
    }
}
