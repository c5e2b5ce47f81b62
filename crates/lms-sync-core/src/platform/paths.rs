//! Platform-specific cache root resolution.
//!
//! This module resolves the two roots the engine reconciles:
//! - the HuggingFace hub cache (source, read-only)
//! - the LM Studio models directory (target, engine-owned links)
//!
//! # Platform Behavior
//! - **Windows**: `%LOCALAPPDATA%\{app}`, else `{home}\AppData\Local\{app}`
//! - **macOS**: `{home}/.cache/{app}`
//! - **Linux and other Unix**: `$XDG_CACHE_HOME/{app}`, else `{home}/.cache/{app}`

use crate::config::PathsConfig;
use crate::error::{Result, SyncError};
use crate::platform::OsFamily;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the HuggingFace hub cache root for the current platform.
pub fn resolve_source_cache_root() -> Result<PathBuf> {
    resolve_for_current_platform(PathsConfig::SOURCE_APP_SEGMENTS)
}

/// Resolve the LM Studio models root for the current platform.
pub fn resolve_target_cache_root() -> Result<PathBuf> {
    resolve_for_current_platform(PathsConfig::TARGET_APP_SEGMENTS)
}

fn resolve_for_current_platform(app_segments: &[&str]) -> Result<PathBuf> {
    let root = resolve_cache_root(
        OsFamily::current(),
        |key| std::env::var_os(key),
        dirs::home_dir(),
        app_segments,
    )?;
    debug!("Resolved {} to {}", app_segments.join("/"), root.display());
    Ok(root)
}

/// Resolve a cache root from explicit inputs.
///
/// `env` looks up environment variables (empty values count as unset) and
/// `home` is the user's home directory if known. Kept free of process
/// state so every platform branch can be exercised on any host.
pub fn resolve_cache_root<F>(
    family: OsFamily,
    env: F,
    home: Option<PathBuf>,
    app_segments: &[&str],
) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);

    let base = match family {
        OsFamily::Windows => match non_empty(PathsConfig::LOCAL_APP_DATA_ENV) {
            Some(local_app_data) => local_app_data,
            None => home
                .ok_or(SyncError::HomeDirectoryUnavailable)?
                .join("AppData")
                .join("Local"),
        },
        OsFamily::MacOs => home
            .ok_or(SyncError::HomeDirectoryUnavailable)?
            .join(".cache"),
        OsFamily::Unix => match non_empty(PathsConfig::XDG_CACHE_HOME_ENV) {
            Some(xdg_cache) => xdg_cache,
            None => home
                .ok_or(SyncError::HomeDirectoryUnavailable)?
                .join(".cache"),
        },
    };

    Ok(join_segments(&base, app_segments))
}

fn join_segments(base: &Path, segments: &[&str]) -> PathBuf {
    segments
        .iter()
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}
