//! Command objects and the execute-then-rediscover facade.
//!
//! Front ends describe what the user asked for as a [`Command`] and get
//! back a [`CommandOutcome`] holding a status line and a fresh
//! [`Snapshot`]. Records inside commands come from an earlier snapshot;
//! they are only used to locate the paths to act on.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model_library::{ArtifactRecord, BatchReport, LinkSummary, Snapshot};
use crate::SyncEngine;

/// A user-level request against the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rescan without changing anything
    Refresh,
    Link(ArtifactRecord),
    Unlink(ArtifactRecord),
    /// Remove a stale link
    Purge(ArtifactRecord),
    LinkAll,
    UnlinkAll,
    PurgeAll,
}

/// What a command did, plus the state of both trees afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommandOutcome {
    /// Human-readable status line
    pub status: String,
    /// Discovery result taken after the command ran
    pub snapshot: Snapshot,
    /// What a single link produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkSummary>,
    /// Per-item accounting, for batch commands only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<BatchReport>,
}

impl CommandOutcome {
    fn new(status: String, snapshot: Snapshot) -> Self {
        Self {
            status,
            snapshot,
            link: None,
            report: None,
        }
    }
}

impl SyncEngine {
    /// Run `command`, then rediscover.
    ///
    /// Single-item failures surface as `Err`; batch commands always succeed
    /// and carry their failures in the report. A failing rediscovery is an
    /// error too: the listing would otherwise be out of date.
    pub fn execute(&self, command: Command) -> Result<CommandOutcome> {
        let mut link = None;
        let mut report = None;

        let status = match command {
            Command::Refresh => {
                let snapshot = self.discover()?;
                let status = format!(
                    "Found {} models ({} linked, {} not linked, {} stale)",
                    snapshot.artifacts.len(),
                    snapshot.linked_count(),
                    snapshot.unlinked_count(),
                    snapshot.stale.len()
                );
                return Ok(CommandOutcome::new(status, snapshot));
            }
            Command::Link(record) => {
                link = Some(self.link(&record)?);
                format!("Linked model: {}", record.name)
            }
            Command::Unlink(record) => {
                if self.unlink(&record)? {
                    format!("Unlinked model: {}", record.name)
                } else {
                    format!("Model is not linked: {}", record.name)
                }
            }
            Command::Purge(record) => {
                if self.unlink(&record)? {
                    format!("Purged stale model: {}", record.name)
                } else {
                    format!("Model is not linked: {}", record.name)
                }
            }
            Command::LinkAll => {
                let batch = self.link_all()?;
                let status = format!("Successfully linked {} models", batch.count());
                report = Some(batch);
                status
            }
            Command::UnlinkAll => {
                let batch = self.unlink_all()?;
                let status = format!("Successfully unlinked {} models", batch.count());
                report = Some(batch);
                status
            }
            Command::PurgeAll => {
                let batch = self.purge_all_stale()?;
                let status = format!("Successfully purged {} stale links", batch.count());
                report = Some(batch);
                status
            }
        };

        tracing::info!("{}", status);
        Ok(CommandOutcome {
            link,
            report,
            ..CommandOutcome::new(status, self.discover()?)
        })
    }
}
