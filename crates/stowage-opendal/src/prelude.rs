//! Prelude module for convenient imports.

pub use crate::backend::{ObjectMetadata, StorageBackend};
pub use crate::config::S3Config;
pub use crate::error::{StorageError, StorageResult};
