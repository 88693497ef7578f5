//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::storage::validation::VirtualPath;

/// Wire format for entry timestamps: UTC, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One directory entry as reported to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: VirtualPath,
    pub is_directory: bool,
    pub size: u64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub modified: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created: DateTime<Utc>,
}

impl FileEntry {
    /// Builds an entry from already-fetched metadata.
    ///
    /// `created` falls back to the modification time on filesystems that do
    /// not record a birth time.
    pub fn from_metadata(name: String, path: VirtualPath, metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = metadata.created().unwrap_or(modified);

        Self {
            name,
            path,
            is_directory: metadata.is_dir(),
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
            created: DateTime::<Utc>::from(created),
        }
    }
}

/// Old and new location of a renamed entry.
#[derive(Debug, Clone)]
pub struct RenameResult {
    pub old_path: VirtualPath,
    pub new_path: VirtualPath,
}

fn serialize_timestamp<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(TIMESTAMP_FORMAT))
}
