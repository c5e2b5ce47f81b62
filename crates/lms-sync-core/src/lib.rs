//! LM Studio Sync Core - Headless engine that mirrors the HuggingFace hub
//! cache into the LM Studio models directory.
//!
//! The engine never copies model weights. Linking an artifact creates a
//! directory of symlinks under `<target>/<org>/<name>/` that point at the
//! real files in the HuggingFace content store, plus a `.hf-lms-sync` marker
//! file that records ownership. Directories without the marker are never
//! touched.
//!
//! The operations are available both as free functions in [`model_library`]
//! and through [`SyncEngine`], which binds them to a pair of roots.
//!
//! # Example
//!
//! ```rust,no_run
//! use lms_sync_core::{Command, SyncEngine};
//!
//! fn main() -> lms_sync_core::Result<()> {
//!     let engine = SyncEngine::new()?;
//!
//!     let snapshot = engine.discover()?;
//!     println!("Found {} models, {} stale links", snapshot.artifacts.len(), snapshot.stale.len());
//!
//!     let outcome = engine.execute(Command::LinkAll)?;
//!     println!("{}", outcome.status);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod model_library;
pub mod platform;

mod api;

// Re-export commonly used types
pub use api::{Command, CommandOutcome, SyncEngineBuilder};
pub use config::{AppConfig, Settings, SnapshotPolicy, SyncConfig};
pub use error::{Result, SyncError};
pub use model_library::{
    discover_artifacts, discover_stale_links, link, link_all, purge_all_stale, unlink, unlink_all,
    ArtifactRecord, BatchFailure, BatchReport, LinkState, LinkSummary, Snapshot,
};
pub use platform::{resolve_source_cache_root, resolve_target_cache_root};

use std::path::{Path, PathBuf};

/// Main entry point for sync operations.
///
/// Holds the two roots and the link settings. Holds no discovered state:
/// every query rescans the filesystem, so a `SyncEngine` never goes stale.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    /// HuggingFace hub cache (read-only)
    source_root: PathBuf,
    /// LM Studio models directory
    target_root: PathBuf,
    snapshot_policy: SnapshotPolicy,
    /// Provider prefix used to rebuild source names for stale detection
    cache_prefix: String,
}

impl SyncEngine {
    /// Create an engine with platform-default roots.
    pub fn new() -> Result<Self> {
        SyncEngineBuilder::new().build()
    }

    /// Create a builder for SyncEngine.
    ///
    /// Use the builder to override roots, pick a snapshot policy, or apply
    /// persisted [`Settings`].
    pub fn builder() -> SyncEngineBuilder {
        SyncEngineBuilder::new()
    }

    /// Get the source (HuggingFace cache) root.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Get the target (LM Studio models) root.
    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        self.snapshot_policy
    }

    pub fn cache_prefix(&self) -> &str {
        &self.cache_prefix
    }
}
