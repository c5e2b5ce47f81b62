//! Metadata persistence.
//!
//! This module provides:
//! - Atomic file writes (marker file, settings JSON)
//! - The sentinel marker that records engine ownership of a target directory

mod atomic;
mod marker;

pub use atomic::{atomic_read_json, atomic_write_bytes, atomic_write_json};
pub use marker::{has_marker, marker_path, read_marker, write_marker};
