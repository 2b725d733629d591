//! Settings-file loading.
//!
//! The settings file is optional: a missing file selects ambient-credential
//! fallback mode. A present-but-malformed file is an error, so a typo can
//! never silently discard explicit credentials.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TRACING_TARGET_CONFIG;

/// Result of attempting to load the settings file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedSettings {
    /// No settings file was found; ambient credential resolution applies.
    Absent,
    /// Settings were parsed from the file.
    Loaded(SettingsFile),
}

impl LoadedSettings {
    /// Returns the AWS settings block, if a file was loaded.
    #[must_use]
    pub fn aws(&self) -> Option<&AwsSettings> {
        match self {
            Self::Absent => None,
            Self::Loaded(file) => Some(&file.aws),
        }
    }
}

/// Top-level schema of the YAML settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    /// AWS credential and bucket settings.
    #[serde(default)]
    pub aws: AwsSettings,
}

/// AWS settings block.
///
/// Every field is optional at the parse level; which fields are required is
/// decided during configuration resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsSettings {
    /// Access key ID.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// AWS region.
    #[serde(default)]
    pub region: Option<String>,
    /// Target bucket name.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Custom endpoint URL (for S3-compatible storage like MinIO, R2).
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file exists but is not valid YAML for the expected schema.
    #[error("malformed settings file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl SettingsFile {
    /// Loads settings from `path`.
    ///
    /// A missing file is a normal outcome and maps to
    /// [`LoadedSettings::Absent`]. Any other read failure is logged and
    /// treated the same way, matching the tolerance for absence. A file
    /// that exists but fails to parse is an error.
    pub fn load(path: &Path) -> Result<LoadedSettings, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound {
                    tracing::info!(
                        target: TRACING_TARGET_CONFIG,
                        path = %path.display(),
                        "No settings file, using ambient credential chain"
                    );
                } else {
                    tracing::warn!(
                        target: TRACING_TARGET_CONFIG,
                        path = %path.display(),
                        error = %err,
                        "Settings file unreadable, continuing without it"
                    );
                }
                return Ok(LoadedSettings::Absent);
            }
        };

        // An empty document deserializes as null, not as a mapping.
        let file: Self = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|source| SettingsError::Malformed {
                path: path.to_path_buf(),
                source,
            })?
        };

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            path = %path.display(),
            "Settings loaded"
        );

        Ok(LoadedSettings::Loaded(file))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn settings_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn absent_file_is_not_an_error() {
        let loaded = SettingsFile::load(Path::new("does/not/exist.yaml")).unwrap();

        assert_eq!(loaded, LoadedSettings::Absent);
        assert!(loaded.aws().is_none());
    }

    #[test]
    fn full_settings_parse() {
        let file = settings_file(
            r"
aws:
  access_key_id: AKIDEXAMPLE
  secret_access_key: example-secret
  region: eu-central-1
  bucket: releases
",
        );

        let loaded = SettingsFile::load(file.path()).unwrap();
        let aws = loaded.aws().unwrap();

        assert_eq!(aws.access_key_id.as_deref(), Some("AKIDEXAMPLE"));
        assert_eq!(aws.secret_access_key.as_deref(), Some("example-secret"));
        assert_eq!(aws.region.as_deref(), Some("eu-central-1"));
        assert_eq!(aws.bucket.as_deref(), Some("releases"));
        assert!(aws.endpoint.is_none());
    }

    #[test]
    fn partial_settings_leave_other_fields_unset() {
        let file = settings_file("aws:\n  bucket: releases\n");

        let loaded = SettingsFile::load(file.path()).unwrap();
        let aws = loaded.aws().unwrap();

        assert_eq!(aws.bucket.as_deref(), Some("releases"));
        assert!(aws.access_key_id.is_none());
        assert!(aws.region.is_none());
    }

    #[test]
    fn empty_document_parses_to_defaults() {
        for contents in ["", "{}\n"] {
            let file = settings_file(contents);

            let loaded = SettingsFile::load(file.path()).unwrap();

            assert_eq!(loaded, LoadedSettings::Loaded(SettingsFile::default()));
        }
    }

    #[test]
    fn malformed_file_is_a_hard_error() {
        let file = settings_file("aws: [not, a, mapping\n");

        let err = SettingsFile::load(file.path()).unwrap_err();

        assert!(matches!(err, SettingsError::Malformed { .. }));
    }
}
