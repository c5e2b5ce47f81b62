//! Sentinel marker file recording that a target directory is engine-owned.
//!
//! The marker's existence is the only authority for ownership. Its content
//! is the RFC 3339 timestamp of the link operation that wrote it.

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::metadata::atomic::atomic_write_bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// Path of the marker file inside `dir`.
pub fn marker_path(dir: &Path) -> PathBuf {
    dir.join(SyncConfig::MARKER_FILE_NAME)
}

/// Check whether `dir` carries the marker file.
pub fn has_marker(dir: &Path) -> bool {
    marker_path(dir).is_file()
}

/// Write the marker into `dir`, stamped with the current time.
///
/// Returns the timestamp that was written.
pub fn write_marker(dir: &Path) -> Result<DateTime<Utc>> {
    let now = Utc::now();
    let path = marker_path(dir);
    let content = now.to_rfc3339_opts(SecondsFormat::Secs, true);

    atomic_write_bytes(&path, content.as_bytes(), false).map_err(|e| {
        SyncError::MetadataWriteFailed {
            path: path.clone(),
            message: e.to_string(),
        }
    })?;

    Ok(now)
}

/// Read the link timestamp from the marker in `dir`.
///
/// Returns `None` when the marker is absent or its content is not a valid
/// RFC 3339 timestamp.
pub fn read_marker(dir: &Path) -> Option<DateTime<Utc>> {
    let content = std::fs::read_to_string(marker_path(dir)).ok()?;
    DateTime::parse_from_rfc3339(content.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
