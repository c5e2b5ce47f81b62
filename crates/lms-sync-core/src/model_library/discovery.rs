//! Discovery of source artifacts and target-side link state.
//!
//! Two passes feed every listing:
//! - [`discover_artifacts`] scans the source cache and classifies each
//!   artifact as linked or unlinked against the target tree
//! - [`discover_stale_links`] walks the target tree for marked directories
//!   whose source artifact has vanished
//!
//! Target directories without the marker file are invisible to both.

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::metadata::has_marker;
use crate::model_library::naming::{cache_dir_name, cache_dir_suffix, parse_cache_dir_name};
use crate::model_library::types::{ArtifactRecord, Snapshot};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Scan `source_root` for artifact directories and classify each against
/// `target_root`.
///
/// Fails with `DirectoryNotFound` if either root is missing or not a
/// directory. An unreadable target directory or a missing marker makes a
/// record unlinked; it is never an error.
pub fn discover_artifacts(source_root: &Path, target_root: &Path) -> Result<Vec<ArtifactRecord>> {
    ensure_directory("Source", source_root)?;
    ensure_directory("Target", target_root)?;

    let entries = fs::read_dir(source_root).map_err(|e| SyncError::io_with_path(e, source_root))?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io_with_path(e, source_root))?;
        let source_path = entry.path();
        if !source_path.is_dir() {
            continue;
        }

        let Some(dir_name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!("Skipping non UTF-8 entry {}", source_path.display());
            continue;
        };
        let Some(parsed) = parse_cache_dir_name(&dir_name) else {
            continue;
        };

        let target_path = target_root.join(parsed.organization).join(parsed.name);
        let is_linked = has_marker(&target_path) && verify_symlinks(&target_path);

        records.push(ArtifactRecord {
            organization: parsed.organization.to_string(),
            name: parsed.name.to_string(),
            cache_dir_name: dir_name.clone(),
            source_path,
            target_path,
            is_linked,
            is_stale: false,
            stale_reason: None,
        });
    }

    records.sort_by(|a, b| a.cache_dir_name.cmp(&b.cache_dir_name));

    debug!(
        "Discovered {} artifacts in {} ({} linked)",
        records.len(),
        source_root.display(),
        records.iter().filter(|r| r.is_linked).count()
    );
    Ok(records)
}

/// Walk `target_root` for marked directories whose source artifact is gone.
///
/// For a marked directory `<target>/<org>/<name>` the expected source is
/// `<source_root>/<prefix>--<org>--<name>/snapshots`. A source stored under
/// another provider prefix (`datasets--<org>--<name>`) also counts.
///
/// Any walk error aborts the scan and discards partial results: the stale
/// list is then unknown, not empty.
pub fn discover_stale_links(
    source_root: &Path,
    target_root: &Path,
    cache_prefix: &str,
) -> Result<Vec<ArtifactRecord>> {
    ensure_directory("Source", source_root)?;

    let mut sources = SourceIndex::new(source_root);
    let mut stale = Vec::new();

    for entry in WalkDir::new(target_root).sort_by_file_name() {
        let entry = entry.map_err(|e| SyncError::WalkFailed {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| target_root.to_path_buf()),
            source: e,
        })?;

        if !entry.file_type().is_dir() || !has_marker(entry.path()) {
            continue;
        }

        let path = entry.path();
        let (Some(organization), Some(name)) = (
            path.parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str()),
            path.file_name().and_then(|n| n.to_str()),
        ) else {
            debug!("Skipping marked directory without org/name: {}", path.display());
            continue;
        };

        let cache_dir = cache_dir_name(cache_prefix, organization, name);
        let snapshots_path = source_root
            .join(&cache_dir)
            .join(SyncConfig::SNAPSHOTS_DIR_NAME);

        if snapshots_path.is_dir() || sources.has_alternate(organization, name)? {
            continue;
        }

        debug!("Stale link {}: {} is missing", path.display(), snapshots_path.display());
        stale.push(ArtifactRecord {
            cache_dir_name: cache_dir,
            organization: organization.to_string(),
            name: name.to_string(),
            source_path: snapshots_path,
            target_path: path.to_path_buf(),
            is_linked: true,
            is_stale: true,
            stale_reason: Some(SyncConfig::STALE_SOURCE_MISSING.to_string()),
        });
    }

    if !stale.is_empty() {
        info!("Found {} stale links under {}", stale.len(), target_root.display());
    }
    Ok(stale)
}

/// Run both discovery passes.
pub fn discover(source_root: &Path, target_root: &Path, cache_prefix: &str) -> Result<Snapshot> {
    let artifacts = discover_artifacts(source_root, target_root)?;
    let stale = discover_stale_links(source_root, target_root, cache_prefix)?;
    Ok(Snapshot { artifacts, stale })
}

/// Check that every symlink directly inside `dir` resolves.
///
/// Returns false when `dir` cannot be read.
pub fn verify_symlinks(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    for entry in entries {
        let Ok(entry) = entry else {
            return false;
        };
        let is_symlink = entry.file_type().map(|t| t.is_symlink()).unwrap_or(false);
        // fs::metadata follows the link, so it fails for dangling targets
        if is_symlink && fs::metadata(entry.path()).is_err() {
            debug!("Broken symlink: {}", entry.path().display());
            return false;
        }
    }
    true
}

fn ensure_directory(role: &str, path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(SyncError::directory_not_found(role, path))
    }
}

/// Lazily listed source root, used to find artifacts stored under a
/// provider prefix other than the configured one.
struct SourceIndex<'a> {
    root: &'a Path,
    entries: Option<Vec<(String, PathBuf)>>,
}

impl<'a> SourceIndex<'a> {
    fn new(root: &'a Path) -> Self {
        Self {
            root,
            entries: None,
        }
    }

    fn has_alternate(&mut self, organization: &str, name: &str) -> Result<bool> {
        let suffix = cache_dir_suffix(organization, name);
        let entries = self.entries()?;
        Ok(entries.iter().any(|(dir_name, path)| {
            dir_name.ends_with(&suffix) && path.join(SyncConfig::SNAPSHOTS_DIR_NAME).is_dir()
        }))
    }

    fn entries(&mut self) -> Result<&[(String, PathBuf)]> {
        if self.entries.is_none() {
            let mut listed = Vec::new();
            for entry in
                fs::read_dir(self.root).map_err(|e| SyncError::io_with_path(e, self.root))?
            {
                let entry = entry.map_err(|e| SyncError::io_with_path(e, self.root))?;
                if let Some(name) = entry.file_name().to_str() {
                    listed.push((name.to_string(), entry.path()));
                }
            }
            self.entries = Some(listed);
        }
        Ok(self.entries.as_deref().unwrap_or_default())
    }
}
