//! API implementation submodules.
//!
//! Each submodule contains `impl SyncEngine` blocks that extend the public
//! API. The struct definition remains in `lib.rs`.

mod builder;
mod commands;
mod models;

pub use builder::SyncEngineBuilder;
pub use commands::{Command, CommandOutcome};
