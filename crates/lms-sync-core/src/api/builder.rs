//! Builder for configuring SyncEngine initialization.

use std::fs;
use std::path::PathBuf;

use crate::config::{Settings, SnapshotPolicy, SyncConfig};
use crate::error::{Result, SyncError};
use crate::platform;
use crate::SyncEngine;

/// Builder for configuring SyncEngine initialization.
///
/// Explicit setters win over values taken from [`Settings`], and the
/// platform path resolver fills in whatever is still missing at `build()`.
///
/// # Example
///
/// ```rust,no_run
/// use lms_sync_core::{SnapshotPolicy, SyncEngine};
///
/// let engine = SyncEngine::builder()
///     .target_root("/data/lm-studio/models")
///     .snapshot_policy(SnapshotPolicy::Latest)
///     .create_target_root(true)
///     .build()?;
/// # Ok::<(), lms_sync_core::SyncError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncEngineBuilder {
    source_root: Option<PathBuf>,
    target_root: Option<PathBuf>,
    snapshot_policy: Option<SnapshotPolicy>,
    cache_prefix: Option<String>,
    create_target_root: bool,
}

impl SyncEngineBuilder {
    /// Create a builder with nothing overridden.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `path` as the HuggingFace hub cache instead of the platform default.
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(path.into());
        self
    }

    /// Use `path` as the LM Studio models directory instead of the platform default.
    pub fn target_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_root = Some(path.into());
        self
    }

    /// Default: [`SnapshotPolicy::MergeAll`]
    pub fn snapshot_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshot_policy = Some(policy);
        self
    }

    /// Provider prefix of source directory names.
    ///
    /// Default: `models`
    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = Some(prefix.into());
        self
    }

    /// Create the target root if it does not exist.
    ///
    /// LM Studio creates its models directory on first launch; this lets
    /// links be made before that.
    ///
    /// Default: `false` (discovery fails on a missing target root)
    pub fn create_target_root(mut self, enable: bool) -> Self {
        self.create_target_root = enable;
        self
    }

    /// Take every option not already set from `settings`.
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.source_root = self.source_root.or_else(|| settings.source_root.clone());
        self.target_root = self.target_root.or_else(|| settings.target_root.clone());
        self.snapshot_policy = self.snapshot_policy.or(settings.snapshot_policy);
        self.cache_prefix = self.cache_prefix.or_else(|| settings.cache_prefix.clone());
        self
    }

    /// Build the SyncEngine instance.
    pub fn build(self) -> Result<SyncEngine> {
        let source_root = match self.source_root {
            Some(path) => path,
            None => platform::resolve_source_cache_root()?,
        };
        let target_root = match self.target_root {
            Some(path) => path,
            None => platform::resolve_target_cache_root()?,
        };

        let cache_prefix = self
            .cache_prefix
            .unwrap_or_else(|| SyncConfig::DEFAULT_CACHE_PREFIX.to_string());
        if cache_prefix.is_empty() || cache_prefix.contains(SyncConfig::NAME_SEPARATOR) {
            return Err(SyncError::Config {
                message: format!("Invalid cache prefix: {:?}", cache_prefix),
            });
        }

        if self.create_target_root && !target_root.exists() {
            fs::create_dir_all(&target_root).map_err(|e| SyncError::Io {
                message: format!("Failed to create target root: {}", target_root.display()),
                path: Some(target_root.clone()),
                source: Some(e),
            })?;
            tracing::info!("Created target root {}", target_root.display());
        }

        let snapshot_policy = self.snapshot_policy.unwrap_or_default();
        tracing::debug!(
            "SyncEngine: source={} target={} policy={} prefix={}",
            source_root.display(),
            target_root.display(),
            snapshot_policy,
            cache_prefix
        );

        Ok(SyncEngine {
            source_root,
            target_root,
            snapshot_policy,
            cache_prefix,
        })
    }
}
