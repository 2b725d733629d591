//! Single-file upload orchestration.
//!
//! Resolves the storage configuration from CLI arguments and the optional
//! settings file, constructs the backend, and performs exactly one upload.

use anyhow::{Context, bail};
use stowage_opendal::{S3Config, StorageBackend};

use crate::TRACING_TARGET_UPLOAD;
use crate::config::{Cli, LoadedSettings, SettingsFile};

/// Runs the upload described by the CLI configuration.
pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    let loaded = SettingsFile::load(&cli.config)?;
    let config = resolve_config(cli, &loaded)?;
    let key = cli.object_key();

    let backend = StorageBackend::new(config)
        .await
        .context("failed to initialize storage backend")?;

    let metadata = backend
        .upload_file(&key, &cli.file)
        .await
        .with_context(|| format!("failed to upload {}", cli.file.display()))?;

    tracing::info!(
        target: TRACING_TARGET_UPLOAD,
        bucket = %backend.bucket(),
        key = %key,
        size = metadata.size,
        "File uploaded"
    );

    Ok(())
}

/// Resolves the storage configuration from CLI arguments and the optional
/// settings file.
///
/// Settings-file values go directly into the client configuration; fields
/// left unset defer to the SDK's default credential and region resolution.
/// Empty strings count as unset, so a blank `region:` can never shadow a
/// valid ambient region.
fn resolve_config(cli: &Cli, loaded: &LoadedSettings) -> anyhow::Result<S3Config> {
    let aws = loaded.aws();

    let bucket = cli
        .bucket
        .clone()
        .or_else(|| aws.and_then(|aws| non_empty(aws.bucket.as_deref())));

    let Some(bucket) = bucket else {
        bail!(
            "no bucket configured; add one to {} or pass --bucket",
            cli.config.display()
        );
    };

    let mut config = S3Config::new(bucket);

    if let Some(aws) = aws {
        if let Some(region) = non_empty(aws.region.as_deref()) {
            config = config.with_region(region);
        }

        if let Some(endpoint) = non_empty(aws.endpoint.as_deref()) {
            config = config.with_endpoint(endpoint);
        }

        let access_key_id = non_empty(aws.access_key_id.as_deref());
        let secret_access_key = non_empty(aws.secret_access_key.as_deref());

        match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                config = config.with_credentials(access_key_id, secret_access_key);
            }
            (None, None) => {}
            _ => {
                tracing::warn!(
                    target: TRACING_TARGET_UPLOAD,
                    "Settings file provides only half a credential pair, ignoring it"
                );
            }
        }
    }

    Ok(config)
}

/// Treats empty and whitespace-only values as unset.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
