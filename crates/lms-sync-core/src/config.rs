//! Centralized configuration for the sync engine.
//!
//! Constant structs hold the on-disk layout names shared by discovery and
//! linking. [`Settings`] is the optional user settings file.

use crate::error::{Result, SyncError};
use crate::metadata::{atomic_read_json, atomic_write_json};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "hf-lms-sync";
    pub const DISPLAY_NAME: &'static str = "Hugging Face to LM Studio Sync";
    pub const LOG_FILE_NAME: &'static str = "hf-lms-sync.log";
    pub const SETTINGS_FILE_NAME: &'static str = "settings.json";
    pub const SETTINGS_ENV_VAR: &'static str = "HF_LMS_SYNC_CONFIG";
}

/// Layout of the source cache and the engine-owned parts of the target tree.
pub struct SyncConfig;

impl SyncConfig {
    /// Sentinel file whose presence marks a target directory as engine-owned.
    pub const MARKER_FILE_NAME: &'static str = ".hf-lms-sync";
    pub const SNAPSHOTS_DIR_NAME: &'static str = "snapshots";
    pub const REFS_DIR_NAME: &'static str = "refs";
    pub const MAIN_REF_NAME: &'static str = "main";
    /// Separator between provider, organization and name in cache dir names.
    pub const NAME_SEPARATOR: &'static str = "--";
    pub const DEFAULT_CACHE_PREFIX: &'static str = "models";
    pub const STALE_SOURCE_MISSING: &'static str = "Source directory not found";
}

/// Application path segments appended to the platform cache directory.
pub struct PathsConfig;

impl PathsConfig {
    pub const SOURCE_APP_SEGMENTS: &'static [&'static str] = &["huggingface", "hub"];
    pub const TARGET_APP_SEGMENTS: &'static [&'static str] = &["lm-studio", "models"];
    pub const LOCAL_APP_DATA_ENV: &'static str = "LOCALAPPDATA";
    pub const XDG_CACHE_HOME_ENV: &'static str = "XDG_CACHE_HOME";
}

/// Which snapshot directories of an artifact feed a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotPolicy {
    /// Flatten files from every snapshot, later snapshot names winning on
    /// duplicate file names.
    #[default]
    MergeAll,
    /// Use a single snapshot: the one named by `refs/main`, otherwise the
    /// most recently modified one.
    Latest,
}

impl SnapshotPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotPolicy::MergeAll => "merge-all",
            SnapshotPolicy::Latest => "latest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "merge-all" | "merge_all" | "all" => Some(SnapshotPolicy::MergeAll),
            "latest" => Some(SnapshotPolicy::Latest),
            _ => None,
        }
    }
}

impl std::fmt::Display for SnapshotPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User settings persisted as JSON.
///
/// Every field is optional; command-line flags take precedence and the
/// path resolver fills in missing roots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_policy: Option<SnapshotPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_prefix: Option<String>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Option<Settings> = atomic_read_json(path)?;
        let settings = settings.unwrap_or_default();
        settings.validate()?;
        Ok(settings)
    }

    /// Persist settings to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        atomic_write_json(path, self, true)
    }

    fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.cache_prefix {
            if prefix.is_empty() || prefix.contains(SyncConfig::NAME_SEPARATOR) {
                return Err(SyncError::Config {
                    message: format!(
                        "cache_prefix must be non-empty and must not contain '{}': {:?}",
                        SyncConfig::NAME_SEPARATOR,
                        prefix
                    ),
                });
            }
        }
        Ok(())
    }

    /// Default settings file location.
    ///
    /// `$HF_LMS_SYNC_CONFIG` when set, otherwise
    /// `<platform config dir>/hf-lms-sync/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(AppConfig::SETTINGS_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| {
            dir.join(AppConfig::APP_NAME)
                .join(AppConfig::SETTINGS_FILE_NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_policy_roundtrip() {
        for policy in [SnapshotPolicy::MergeAll, SnapshotPolicy::Latest] {
            let parsed = SnapshotPolicy::from_str(policy.as_str()).expect("Should parse");
            assert_eq!(policy, parsed);
        }
        assert_eq!(SnapshotPolicy::from_str("newest"), None);
        assert_eq!(SnapshotPolicy::default(), SnapshotPolicy::MergeAll);
    }

    #[test]
    fn test_settings_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(&temp_dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        let settings = Settings {
            target_root: Some(PathBuf::from("/srv/lm-studio/models")),
            snapshot_policy: Some(SnapshotPolicy::Latest),
            verbose: true,
            ..Settings::default()
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"snapshot_policy\": \"latest\""));
    }

    #[test]
    fn test_settings_rejects_prefix_with_separator() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "cache_prefix": "models--x" }"#).unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, SyncError::Config { .. }));
    }

    #[test]
    fn test_settings_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, SyncError::Json { .. }));
    }
}
