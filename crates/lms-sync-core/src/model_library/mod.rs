//! Model Library - Reconciles the HuggingFace hub cache with LM Studio.
//!
//! This module provides the core sync functionality:
//! - Cache directory name parsing
//! - Discovery of artifacts and stale links
//! - Linking and unlinking single artifacts
//! - Batch operations with per-item failure accounting
//!
//! # Architecture
//!
//! ```text
//! discovery (read-only)
//!     │
//!     ├── discover_artifacts   - source cache → ArtifactRecord (linked/unlinked)
//!     │
//!     └── discover_stale_links - marked target dirs without a source
//!
//! linker (mutating)
//!     │
//!     ├── link / unlink        - one artifact
//!     │
//!     └── batch                - link_all / unlink_all / purge_all_stale
//! ```

mod batch;
mod discovery;
mod linker;
mod naming;
mod types;

pub use batch::{link_all, purge_all_stale, unlink_all};
pub use discovery::{discover, discover_artifacts, discover_stale_links, verify_symlinks};
pub use linker::{link, unlink};
pub use naming::{cache_dir_name, cache_dir_suffix, parse_cache_dir_name, CacheDirName};
pub use types::{
    ArtifactRecord, BatchFailure, BatchReport, LinkState, LinkSummary, Snapshot,
};
