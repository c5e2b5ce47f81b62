//! Value types shared by discovery, linking and the batch operations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One model found in the source cache, or one link found in the target tree.
///
/// The same record serves the catalog, link status and stale entry roles;
/// the flags tell them apart. Records are snapshots: they are recomputed
/// by every discovery pass and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ArtifactRecord {
    /// Source directory name, `<prefix>--<org>--<name>`
    pub cache_dir_name: String,
    pub organization: String,
    pub name: String,
    /// Absolute path of the source artifact root
    pub source_path: PathBuf,
    /// Absolute path of the expected (or actual) target directory
    pub target_path: PathBuf,
    /// Marker present and every symlink in the target resolves
    pub is_linked: bool,
    /// Marker present but the source artifact is gone
    #[serde(default)]
    pub is_stale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}

impl ArtifactRecord {
    /// `org/name`, the label shown to users and used for lookups.
    pub fn label(&self) -> String {
        format!("{}/{}", self.organization, self.name)
    }

    /// One-word state for listings.
    pub fn state(&self) -> LinkState {
        if self.is_stale {
            LinkState::Stale
        } else if self.is_linked {
            LinkState::Linked
        } else {
            LinkState::Unlinked
        }
    }

    /// Case-insensitive substring match on organization or name.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.organization.to_lowercase().contains(&term)
            || self.name.to_lowercase().contains(&term)
    }
}

/// Classification of an artifact/target pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Linked,
    Unlinked,
    Stale,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Linked => "linked",
            LinkState::Unlinked => "unlinked",
            LinkState::Stale => "stale",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one discovery pass over both trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    /// Every artifact in the source cache, flagged linked/unlinked
    pub artifacts: Vec<ArtifactRecord>,
    /// Marked target directories whose source vanished
    pub stale: Vec<ArtifactRecord>,
}

impl Snapshot {
    /// Artifacts followed by stale entries, the display order of listings.
    pub fn combined(&self) -> Vec<ArtifactRecord> {
        self.artifacts
            .iter()
            .chain(self.stale.iter())
            .cloned()
            .collect()
    }

    /// Records of [`Snapshot::combined`] matching `term`.
    pub fn filter(&self, term: &str) -> Vec<ArtifactRecord> {
        self.artifacts
            .iter()
            .chain(self.stale.iter())
            .filter(|r| r.matches(term))
            .cloned()
            .collect()
    }

    /// Look up an artifact, then a stale entry, by organization and name.
    pub fn find(&self, organization: &str, name: &str) -> Option<&ArtifactRecord> {
        self.artifacts
            .iter()
            .chain(self.stale.iter())
            .find(|r| r.organization == organization && r.name == name)
    }

    pub fn linked_count(&self) -> usize {
        self.artifacts.iter().filter(|r| r.is_linked).count()
    }

    pub fn unlinked_count(&self) -> usize {
        self.artifacts.len() - self.linked_count()
    }
}

/// Outcome of a successful link operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LinkSummary {
    pub target_path: PathBuf,
    /// Snapshot directory names that contributed files
    pub snapshots: Vec<String>,
    pub files_linked: usize,
    /// RFC 3339 timestamp written to the marker
    pub linked_at: String,
}

/// A per-item failure recorded by a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchFailure {
    /// `org/name` of the failed record
    pub record: String,
    pub error: String,
}

/// Accounting of a batch operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchReport {
    /// Records that matched the operation's precondition
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of records processed successfully.
    pub fn count(&self) -> usize {
        self.succeeded
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
