//! Platform abstraction layer for cross-platform compatibility.
//!
//! All `#[cfg]` blocks for OS-specific behavior live in this module rather
//! than being scattered through discovery and linking.
//!
//! # Architecture
//!
//! - `paths` - Cache root resolution for the source and target trees
//! - `links` - Creating and removing symlinks on Unix and Windows

pub mod links;
pub mod paths;

pub use links::{remove_link, symlink_dir, symlink_file};
pub use paths::{resolve_cache_root, resolve_source_cache_root, resolve_target_cache_root};

/// Operating-system family that decides cache root conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    /// Linux and every other Unix-like system.
    Unix,
}

impl OsFamily {
    /// The family of the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Unix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::MacOs => "macos",
            OsFamily::Unix => "unix",
        }
    }
}
