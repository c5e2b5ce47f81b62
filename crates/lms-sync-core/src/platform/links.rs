//! Platform-specific symlink creation.

use std::io;
use std::path::Path;

/// Create a symbolic link at `link` pointing to the file at `original`.
///
/// # Platform Behavior
/// - **Linux/macOS**: `std::os::unix::fs::symlink`
/// - **Windows**: `std::os::windows::fs::symlink_file` (requires developer
///   mode or the symlink privilege)
pub fn symlink_file(original: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(original, link)
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(original, link)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = (original, link);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symbolic links are not supported on this platform",
        ))
    }
}

/// Create a symbolic link at `link` pointing to the directory at `original`.
///
/// Windows distinguishes directory links from file links; Unix does not.
pub fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(original, link)
    }

    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_dir(original, link)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = (original, link);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symbolic links are not supported on this platform",
        ))
    }
}

/// Remove a symlink without touching what it points to.
pub fn remove_link(link: &Path) -> io::Result<()> {
    // Windows directory links are removed as directories
    std::fs::remove_file(link).or_else(|err| {
        if cfg!(windows) {
            std::fs::remove_dir(link)
        } else {
            Err(err)
        }
    })
}
