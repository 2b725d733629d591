//! CLI configuration management.
//!
//! All options can be provided via CLI arguments or environment variables:
//!
//! ```text
//! --config  STOWAGE_CONFIG  path to the optional YAML settings file
//! --file    STOWAGE_FILE    local file to upload
//! --key     STOWAGE_KEY     object key override
//! --bucket  STOWAGE_BUCKET  bucket name override
//! ```
//!
//! # Example
//!
//! ```bash
//! # Upload a build artifact under an explicit key
//! stowage-cli --file dist/app.tar.gz --key releases/app.tar.gz
//!
//! # Or via environment variables
//! STOWAGE_FILE=dist/app.tar.gz STOWAGE_BUCKET=releases stowage-cli
//! ```

mod settings;

use std::path::PathBuf;
use std::process;

use anyhow::bail;
use clap::Parser;
use serde::{Deserialize, Serialize};
pub use settings::{AwsSettings, LoadedSettings, SettingsError, SettingsFile};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "stowage")]
#[command(about = "Uploads a single local file to an S3-compatible bucket")]
#[command(version)]
pub struct Cli {
    /// Path to the optional YAML settings file.
    ///
    /// Absence of the file is not an error; the ambient AWS credential
    /// chain is consulted instead.
    #[arg(long, env = "STOWAGE_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Local file to upload.
    #[arg(long, env = "STOWAGE_FILE", default_value = "test.txt")]
    pub file: PathBuf,

    /// Object key to store the file under.
    ///
    /// Defaults to the file path exactly as given, directory separators
    /// included.
    #[arg(long, env = "STOWAGE_KEY")]
    pub key: Option<String>,

    /// Bucket name override.
    ///
    /// Takes precedence over the settings file.
    #[arg(long, env = "STOWAGE_BUCKET")]
    pub bucket: Option<String>,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses
    /// CLI arguments.
    ///
    /// This is the preferred way to initialize the CLI configuration as it
    /// ensures .env files are loaded before clap parses arguments, allowing
    /// environment variables from .env to be used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(ref key) = self.key
            && key.is_empty()
        {
            bail!("object key override must not be empty");
        }

        if let Some(ref bucket) = self.bucket
            && bucket.is_empty()
        {
            bail!("bucket override must not be empty");
        }

        Ok(())
    }

    /// Logs configuration at startup (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            config = %self.config.display(),
            file = %self.file.display(),
            key = %self.object_key(),
            bucket_override = ?self.bucket,
            "Upload configuration"
        );
    }

    /// Returns the object key: the explicit override, or the file path
    /// string verbatim.
    #[must_use]
    pub fn object_key(&self) -> String {
        self.key
            .clone()
            .unwrap_or_else(|| self.file.to_string_lossy().into_owned())
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_filenames() {
        let cli = Cli::parse_from(["stowage"]);

        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert_eq!(cli.file, PathBuf::from("test.txt"));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn object_key_is_file_path_verbatim() {
        let cli = Cli::parse_from(["stowage", "--file", "dir/test.txt"]);

        assert_eq!(cli.object_key(), "dir/test.txt");
    }

    #[test]
    fn object_key_override_wins() {
        let cli = Cli::parse_from(["stowage", "--file", "dir/test.txt", "--key", "other.txt"]);

        assert_eq!(cli.object_key(), "other.txt");
    }

    #[test]
    fn reject_empty_overrides() {
        let cli = Cli::parse_from(["stowage", "--key", ""]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["stowage", "--bucket", ""]);
        assert!(cli.validate().is_err());
    }
}
