//! Cache directory name parsing.
//!
//! Source artifacts live in directories named `<prefix>--<org>--<name>`.
//! The organization and name are always the last two segments, so provider
//! prefixes that themselves contain `--` are tolerated.

use crate::config::SyncConfig;

/// Organization and model name parsed from a cache directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirName<'a> {
    pub organization: &'a str,
    pub name: &'a str,
}

/// Split a cache directory name into organization and name.
///
/// Returns `None` for names without the `--` separator.
///
/// # Examples
///
/// ```
/// use lms_sync_core::model_library::parse_cache_dir_name;
///
/// let parsed = parse_cache_dir_name("models--acme--widget").unwrap();
/// assert_eq!(parsed.organization, "acme");
/// assert_eq!(parsed.name, "widget");
///
/// assert!(parse_cache_dir_name("version.txt").is_none());
/// ```
pub fn parse_cache_dir_name(dir_name: &str) -> Option<CacheDirName<'_>> {
    if !dir_name.contains(SyncConfig::NAME_SEPARATOR) {
        return None;
    }

    let mut parts = dir_name.rsplit(SyncConfig::NAME_SEPARATOR);
    let name = parts.next()?;
    let organization = parts.next()?;

    // Both segments become target path components
    if !is_path_segment(organization) || !is_path_segment(name) {
        return None;
    }

    Some(CacheDirName { organization, name })
}

fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

/// Build the cache directory name for `organization`/`name`.
pub fn cache_dir_name(prefix: &str, organization: &str, name: &str) -> String {
    let sep = SyncConfig::NAME_SEPARATOR;
    format!("{prefix}{sep}{organization}{sep}{name}")
}

/// Suffix shared by every cache directory for `organization`/`name`,
/// whatever its provider prefix.
pub fn cache_dir_suffix(organization: &str, name: &str) -> String {
    let sep = SyncConfig::NAME_SEPARATOR;
    format!("{sep}{organization}{sep}{name}")
}
