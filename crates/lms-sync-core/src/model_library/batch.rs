//! Batch operations over a record set.
//!
//! Each batch filters the records by its precondition, runs the single-item
//! operation on every match, and keeps going past failures. Failures are
//! logged and collected into the [`BatchReport`]; they never abort the batch.

use crate::config::SnapshotPolicy;
use crate::error::Result;
use crate::model_library::linker::{link, unlink};
use crate::model_library::types::{ArtifactRecord, BatchFailure, BatchReport};
use tracing::{error, info};

/// Link every record that is not currently linked.
pub fn link_all(records: &[ArtifactRecord], policy: SnapshotPolicy) -> BatchReport {
    run_batch(
        "link",
        records,
        |r| !r.is_linked && !r.is_stale,
        |r| link(r, policy).map(|_| true),
    )
}

/// Unlink every record that is currently linked.
pub fn unlink_all(records: &[ArtifactRecord]) -> BatchReport {
    run_batch("unlink", records, |r| r.is_linked, unlink)
}

/// Remove the target directory of every stale record.
pub fn purge_all_stale(records: &[ArtifactRecord]) -> BatchReport {
    run_batch("purge", records, |r| r.is_stale, unlink)
}

/// An operation returning `Ok(false)` did nothing and is not counted as a
/// success.
fn run_batch<P, F>(action: &str, records: &[ArtifactRecord], precondition: P, op: F) -> BatchReport
where
    P: Fn(&ArtifactRecord) -> bool,
    F: Fn(&ArtifactRecord) -> Result<bool>,
{
    let mut report = BatchReport::default();

    for record in records.iter().filter(|&r| precondition(r)) {
        report.attempted += 1;
        match op(record) {
            Ok(true) => report.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                error!("Failed to {} {}: {}", action, record.label(), e);
                report.failures.push(BatchFailure {
                    record: record.label(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Batch {}: {}/{} succeeded, {} failed",
        action,
        report.succeeded,
        report.attempted,
        report.failures.len()
    );
    report
}
