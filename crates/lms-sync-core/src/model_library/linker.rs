//! Link and unlink operations for single artifacts.
//!
//! A link materializes a target directory of symlinks, one per entry of the
//! selected snapshot directories, each pointing at the fully resolved real
//! file in the content store. The marker file is written last, so a link
//! interrupted half way is never reported as linked.

use crate::config::{SnapshotPolicy, SyncConfig};
use crate::error::{Result, SyncError};
use crate::metadata::{has_marker, write_marker};
use crate::model_library::types::{ArtifactRecord, LinkSummary};
use crate::platform::{remove_link, symlink_dir, symlink_file};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// A snapshot directory selected for linking.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SnapshotDir {
    name: String,
    path: PathBuf,
}

/// Link an artifact into its target directory.
///
/// An existing target directory is replaced only when it is engine-owned:
/// it carries the marker, or it holds nothing but symlinks (what a failed
/// link leaves behind). The marker is written only after every symlink has
/// been created; on failure no marker is written and partially created
/// links are left in place.
///
/// # Errors
///
/// - `SourceMissing` if the artifact root no longer exists
/// - `SnapshotsMissing` if it has no `snapshots` directory
/// - `TargetNotOwned` if the target path holds anything else
/// - `SymlinkResolutionFailed` if a snapshot entry cannot be resolved
/// - `SymlinkCreationFailed` if a symlink cannot be created
/// - `MetadataWriteFailed` if the marker cannot be written
pub fn link(record: &ArtifactRecord, policy: SnapshotPolicy) -> Result<LinkSummary> {
    if !record.source_path.is_dir() {
        return Err(SyncError::SourceMissing(record.source_path.clone()));
    }

    let snapshots_root = record.source_path.join(SyncConfig::SNAPSHOTS_DIR_NAME);
    if !snapshots_root.is_dir() {
        return Err(SyncError::SnapshotsMissing(snapshots_root));
    }

    let selected = select_snapshots(&record.source_path, &snapshots_root, policy)?;
    if selected.is_empty() {
        warn!("No snapshots found for {}", record.label());
    }

    let target = &record.target_path;
    remove_existing_target(target)?;
    fs::create_dir_all(target).map_err(|e| SyncError::io_with_path(e, target))?;

    let mut files_linked = 0;
    for snapshot in &selected {
        files_linked += link_snapshot(snapshot, target)?;
    }

    let linked_at = write_marker(target)?;

    info!(
        "Linked {} ({} files from {} snapshots)",
        record.label(),
        files_linked,
        selected.len()
    );

    Ok(LinkSummary {
        target_path: target.clone(),
        snapshots: selected.into_iter().map(|s| s.name).collect(),
        files_linked,
        linked_at: linked_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}

/// Remove an artifact's target directory.
///
/// Returns `Ok(false)` without touching anything when the target has no
/// marker: unmarked directories belong to the user.
pub fn unlink(record: &ArtifactRecord) -> Result<bool> {
    let target = &record.target_path;
    if !has_marker(target) {
        debug!("Refusing to unlink unmarked directory {}", target.display());
        return Ok(false);
    }

    fs::remove_dir_all(target).map_err(|e| SyncError::io_with_path(e, target))?;
    info!("Unlinked {}", record.label());
    Ok(true)
}

/// Pick the snapshot directories to link, in link order.
fn select_snapshots(
    artifact_root: &Path,
    snapshots_root: &Path,
    policy: SnapshotPolicy,
) -> Result<Vec<SnapshotDir>> {
    let mut snapshots = Vec::new();
    for entry in
        fs::read_dir(snapshots_root).map_err(|e| SyncError::io_with_path(e, snapshots_root))?
    {
        let entry = entry.map_err(|e| SyncError::io_with_path(e, snapshots_root))?;
        let path = entry.path();
        if path.is_dir() {
            snapshots.push(SnapshotDir {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
    }
    snapshots.sort_by(|a, b| a.name.cmp(&b.name));

    match policy {
        SnapshotPolicy::MergeAll => Ok(snapshots),
        SnapshotPolicy::Latest => Ok(latest_snapshot(artifact_root, snapshots)
            .into_iter()
            .collect()),
    }
}

/// The snapshot named by `refs/main`, else the most recently modified one.
fn latest_snapshot(artifact_root: &Path, snapshots: Vec<SnapshotDir>) -> Option<SnapshotDir> {
    let main_ref = artifact_root
        .join(SyncConfig::REFS_DIR_NAME)
        .join(SyncConfig::MAIN_REF_NAME);

    if let Ok(contents) = fs::read_to_string(&main_ref) {
        let revision = contents.trim();
        if let Some(found) = snapshots.iter().find(|s| s.name == revision) {
            return Some(found.clone());
        }
        debug!(
            "refs/main points at missing snapshot {:?}, using newest",
            revision
        );
    }

    snapshots.into_iter().max_by(|a, b| {
        modified_time(&a.path)
            .cmp(&modified_time(&b.path))
            .then_with(|| a.name.cmp(&b.name))
    })
}

fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn remove_existing_target(target: &Path) -> Result<()> {
    let Ok(meta) = fs::symlink_metadata(target) else {
        return Ok(());
    };

    if !meta.is_dir() || !is_engine_owned(target)? {
        warn!("Not replacing unmanaged {}", target.display());
        return Err(SyncError::TargetNotOwned(target.to_path_buf()));
    }

    debug!("Removing existing target {}", target.display());
    fs::remove_dir_all(target).map_err(|e| SyncError::io_with_path(e, target))
}

/// Marked, or made only of symlinks.
fn is_engine_owned(dir: &Path) -> Result<bool> {
    if has_marker(dir) {
        return Ok(true);
    }

    for entry in fs::read_dir(dir).map_err(|e| SyncError::io_with_path(e, dir))? {
        let entry = entry.map_err(|e| SyncError::io_with_path(e, dir))?;
        let file_type = entry
            .file_type()
            .map_err(|e| SyncError::io_with_path(e, entry.path()))?;
        if !file_type.is_symlink() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Symlink every entry of one snapshot directory into `target`.
fn link_snapshot(snapshot: &SnapshotDir, target: &Path) -> Result<usize> {
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(&snapshot.path).map_err(|e| SyncError::io_with_path(e, &snapshot.path))?
    {
        let entry = entry.map_err(|e| SyncError::io_with_path(e, &snapshot.path))?;
        entries.push((entry.file_name(), entry.path()));
    }
    entries.sort();

    let mut linked = 0;
    for (file_name, src) in entries {
        // Snapshot entries are relative links into blobs/; resolve to the real file
        let real = fs::canonicalize(&src).map_err(|e| SyncError::SymlinkResolutionFailed {
            path: src.clone(),
            source: e,
        })?;

        let dest = target.join(&file_name);
        if fs::symlink_metadata(&dest).is_ok() {
            warn!(
                "{} already linked from an earlier snapshot, replacing with {}",
                dest.display(),
                snapshot.name
            );
            remove_link(&dest).map_err(|e| SyncError::io_with_path(e, &dest))?;
        }

        let created = if real.is_dir() {
            symlink_dir(&real, &dest)
        } else {
            symlink_file(&real, &dest)
        };
        created.map_err(|e| SyncError::SymlinkCreationFailed {
            src: real.clone(),
            dest: dest.clone(),
            source: e,
        })?;

        debug!("Linked {} -> {}", dest.display(), real.display());
        linked += 1;
    }
    Ok(linked)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::metadata::marker_path;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        source_root: PathBuf,
        target_root: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let source_root = temp.path().join("hub");
            let target_root = temp.path().join("lms");
            fs::create_dir_all(&source_root).unwrap();
            fs::create_dir_all(&target_root).unwrap();
            Self {
                _temp: temp,
                source_root,
                target_root,
            }
        }

        /// Lay out an HF-style artifact: real files in blobs/, relative
        /// symlinks in snapshots/<rev>/.
        fn artifact(&self, org: &str, name: &str, snapshots: &[(&str, &[&str])]) -> ArtifactRecord {
            let root = self.source_root.join(format!("models--{org}--{name}"));
            let blobs = root.join("blobs");
            fs::create_dir_all(&blobs).unwrap();

            for (rev, files) in snapshots {
                let dir = root.join("snapshots").join(rev);
                fs::create_dir_all(&dir).unwrap();
                for file in *files {
                    let blob = format!("{rev}-{file}");
                    fs::write(blobs.join(&blob), format!("{rev}:{file}")).unwrap();
                    symlink(format!("../../blobs/{blob}"), dir.join(file)).unwrap();
                }
            }

            ArtifactRecord {
                cache_dir_name: format!("models--{org}--{name}"),
                organization: org.to_string(),
                name: name.to_string(),
                source_path: root,
                target_path: self.target_root.join(org).join(name),
                is_linked: false,
                is_stale: false,
                stale_reason: None,
            }
        }
    }

    #[test]
    fn test_link_creates_resolved_symlinks_and_marker() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["config.json", "weights.gguf"])]);

        let summary = link(&record, SnapshotPolicy::MergeAll).unwrap();
        assert_eq!(summary.files_linked, 2);
        assert_eq!(summary.snapshots, vec!["abc123".to_string()]);
        assert!(marker_path(&record.target_path).is_file());

        let dest = record.target_path.join("weights.gguf");
        assert!(dest.is_symlink());
        let pointed = fs::read_link(&dest).unwrap();
        assert!(pointed.is_absolute());
        // Points straight at the blob, not at another link
        assert!(!pointed.is_symlink());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "abc123:weights.gguf");
    }

    #[test]
    fn test_link_refuses_unmarked_user_directory() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["weights.gguf"])]);

        fs::create_dir_all(&record.target_path).unwrap();
        fs::write(record.target_path.join("my-finetune.gguf"), b"user data").unwrap();

        let err = link(&record, SnapshotPolicy::MergeAll).unwrap_err();
        assert!(matches!(err, SyncError::TargetNotOwned(ref path) if path == &record.target_path));
        assert_eq!(
            fs::read(record.target_path.join("my-finetune.gguf")).unwrap(),
            b"user data"
        );
        assert!(!has_marker(&record.target_path));
    }

    #[test]
    fn test_link_refuses_plain_file_target() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["weights.gguf"])]);
        fs::create_dir_all(record.target_path.parent().unwrap()).unwrap();
        fs::write(&record.target_path, b"not a directory").unwrap();

        let err = link(&record, SnapshotPolicy::MergeAll).unwrap_err();
        assert!(matches!(err, SyncError::TargetNotOwned(_)));
        assert!(record.target_path.is_file());
    }

    #[test]
    fn test_link_replaces_partial_link_residue() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["weights.gguf"])]);

        // A failed link leaves symlinks and no marker
        fs::create_dir_all(&record.target_path).unwrap();
        symlink(
            fx.source_root.join("gone.bin"),
            record.target_path.join("old.bin"),
        )
        .unwrap();

        link(&record, SnapshotPolicy::MergeAll).unwrap();
        assert!(fs::symlink_metadata(record.target_path.join("old.bin")).is_err());
        assert!(record.target_path.join("weights.gguf").is_symlink());
        assert!(has_marker(&record.target_path));
    }

    #[test]
    fn test_link_replaces_marked_target() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["weights.gguf"])]);

        fs::create_dir_all(&record.target_path).unwrap();
        write_marker(&record.target_path).unwrap();
        fs::write(record.target_path.join("leftover.txt"), b"old").unwrap();

        link(&record, SnapshotPolicy::MergeAll).unwrap();
        assert!(!record.target_path.join("leftover.txt").exists());
        assert!(record.target_path.join("weights.gguf").is_symlink());
    }

    #[test]
    fn test_link_is_repeatable() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["weights.gguf"])]);

        link(&record, SnapshotPolicy::MergeAll).unwrap();
        let summary = link(&record, SnapshotPolicy::MergeAll).unwrap();
        assert_eq!(summary.files_linked, 1);
    }

    #[test]
    fn test_merge_all_later_snapshot_wins() {
        let fx = Fixture::new();
        let record = fx.artifact(
            "acme",
            "widget",
            &[("aaa", &["config.json", "old.bin"]), ("bbb", &["config.json"])],
        );

        let summary = link(&record, SnapshotPolicy::MergeAll).unwrap();
        assert_eq!(summary.snapshots, vec!["aaa".to_string(), "bbb".to_string()]);
        assert_eq!(
            fs::read_to_string(record.target_path.join("config.json")).unwrap(),
            "bbb:config.json"
        );
        assert!(record.target_path.join("old.bin").is_symlink());
    }

    #[test]
    fn test_latest_follows_main_ref() {
        let fx = Fixture::new();
        let record = fx.artifact(
            "acme",
            "widget",
            &[("aaa", &["config.json", "old.bin"]), ("bbb", &["config.json"])],
        );
        let refs = record.source_path.join("refs");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("main"), "aaa\n").unwrap();

        let summary = link(&record, SnapshotPolicy::Latest).unwrap();
        assert_eq!(summary.snapshots, vec!["aaa".to_string()]);
        assert_eq!(
            fs::read_to_string(record.target_path.join("config.json")).unwrap(),
            "aaa:config.json"
        );
    }

    #[test]
    fn test_latest_without_ref_links_one_snapshot() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("aaa", &["a.bin"]), ("bbb", &["b.bin"])]);

        let summary = link(&record, SnapshotPolicy::Latest).unwrap();
        assert_eq!(summary.snapshots.len(), 1);
        assert_eq!(summary.files_linked, 1);
    }

    #[test]
    fn test_link_with_empty_snapshots_still_marks() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "empty", &[]);
        fs::create_dir_all(record.source_path.join("snapshots")).unwrap();

        let summary = link(&record, SnapshotPolicy::MergeAll).unwrap();
        assert_eq!(summary.files_linked, 0);
        assert!(has_marker(&record.target_path));
    }

    #[test]
    fn test_link_source_errors() {
        let fx = Fixture::new();
        let mut record = fx.artifact("acme", "widget", &[]);

        let err = link(&record, SnapshotPolicy::MergeAll).unwrap_err();
        assert!(matches!(err, SyncError::SnapshotsMissing(_)));

        record.source_path = fx.source_root.join("models--gone--model");
        let err = link(&record, SnapshotPolicy::MergeAll).unwrap_err();
        assert!(matches!(err, SyncError::SourceMissing(_)));
        assert!(!record.target_path.exists());
    }

    #[test]
    fn test_dangling_snapshot_entry_fails_without_marker() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["weights.gguf"])]);
        let snapshot = record.source_path.join("snapshots").join("abc123");
        symlink("../../blobs/missing", snapshot.join("zzz-broken.bin")).unwrap();

        let err = link(&record, SnapshotPolicy::MergeAll).unwrap_err();
        assert!(matches!(err, SyncError::SymlinkResolutionFailed { .. }));
        assert!(!has_marker(&record.target_path));
        // Entries before the failure stay in place
        assert!(record.target_path.join("weights.gguf").is_symlink());
    }

    #[test]
    fn test_unlink_requires_marker() {
        let fx = Fixture::new();
        let record = fx.artifact("acme", "widget", &[("abc123", &["weights.gguf"])]);

        fs::create_dir_all(&record.target_path).unwrap();
        fs::write(record.target_path.join("mine.gguf"), b"user data").unwrap();
        assert!(!unlink(&record).unwrap());
        assert!(record.target_path.join("mine.gguf").exists());

        link(&record, SnapshotPolicy::MergeAll).unwrap();
        assert!(unlink(&record).unwrap());
        assert!(!record.target_path.exists());
        // Blob store is untouched
        assert!(record.source_path.join("blobs").join("abc123-weights.gguf").is_file());
    }
}
