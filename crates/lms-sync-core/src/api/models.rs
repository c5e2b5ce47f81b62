//! Discovery and link methods on SyncEngine.

use crate::error::Result;
use crate::model_library::{self, ArtifactRecord, BatchReport, LinkSummary, Snapshot};
use crate::SyncEngine;

impl SyncEngine {
    // ========================================
    // Discovery
    // ========================================

    /// Scan both trees.
    pub fn discover(&self) -> Result<Snapshot> {
        model_library::discover(&self.source_root, &self.target_root, &self.cache_prefix)
    }

    /// Every artifact in the source cache, flagged linked or unlinked.
    pub fn list_artifacts(&self) -> Result<Vec<ArtifactRecord>> {
        model_library::discover_artifacts(&self.source_root, &self.target_root)
    }

    /// Marked target directories whose source artifact is gone.
    pub fn list_stale(&self) -> Result<Vec<ArtifactRecord>> {
        model_library::discover_stale_links(
            &self.source_root,
            &self.target_root,
            &self.cache_prefix,
        )
    }

    /// Look up an artifact or stale link by its `org/name` label.
    ///
    /// Returns `Ok(None)` for labels that are not of the form `org/name`.
    pub fn find(&self, label: &str) -> Result<Option<ArtifactRecord>> {
        let Some((organization, name)) = split_label(label) else {
            return Ok(None);
        };
        Ok(self.discover()?.find(organization, name).cloned())
    }

    // ========================================
    // Link operations
    // ========================================

    /// Link one artifact with this engine's snapshot policy.
    pub fn link(&self, record: &ArtifactRecord) -> Result<LinkSummary> {
        model_library::link(record, self.snapshot_policy)
    }

    /// Remove one marked target directory. `Ok(false)` if it was not marked.
    pub fn unlink(&self, record: &ArtifactRecord) -> Result<bool> {
        model_library::unlink(record)
    }

    /// Link every unlinked artifact found by a fresh scan.
    pub fn link_all(&self) -> Result<BatchReport> {
        let artifacts = self.list_artifacts()?;
        Ok(model_library::link_all(&artifacts, self.snapshot_policy))
    }

    /// Unlink every linked artifact found by a fresh scan.
    pub fn unlink_all(&self) -> Result<BatchReport> {
        let artifacts = self.list_artifacts()?;
        Ok(model_library::unlink_all(&artifacts))
    }

    /// Purge every stale link found by a fresh scan.
    pub fn purge_all_stale(&self) -> Result<BatchReport> {
        let stale = self.list_stale()?;
        Ok(model_library::purge_all_stale(&stale))
    }
}

/// Split `org/name` into its two non-empty halves.
pub(crate) fn split_label(label: &str) -> Option<(&str, &str)> {
    let (organization, name) = label.trim().split_once('/')?;
    if organization.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((organization, name))
}
