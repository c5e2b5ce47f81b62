//! Rendering of records and outcomes for the terminal.

use anyhow::Result;
use lms_sync_core::{AppConfig, ArtifactRecord, BatchReport, CommandOutcome, LinkState};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

/// One listing line: state column, label, and the stale reason if any.
pub fn format_record(record: &ArtifactRecord) -> String {
    let state = match record.state() {
        LinkState::Linked => "[linked]",
        LinkState::Unlinked => "[      ]",
        LinkState::Stale => "[stale] ",
    };
    match (&record.stale_reason, record.is_stale) {
        (Some(reason), true) => format!("{} {} ({})", state, record.label(), reason),
        _ => format!("{} {}", state, record.label()),
    }
}

pub fn print_records(records: &[ArtifactRecord], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }

    let mut out = io::stdout().lock();
    for record in records {
        writeln!(out, "{}", format_record(record))?;
    }
    let linked = records.iter().filter(|r| r.state() == LinkState::Linked).count();
    let stale = records.iter().filter(|r| r.is_stale).count();
    writeln!(
        out,
        "{} models ({} linked, {} not linked, {} stale)",
        records.len(),
        linked,
        records.len() - linked - stale,
        stale
    )?;
    Ok(())
}

/// `show_failures` is off when the logger already printed each failure.
pub fn print_outcome(outcome: &CommandOutcome, json: bool, show_failures: bool) -> Result<()> {
    if json {
        return print_json(outcome);
    }

    println!("{}", outcome.status);
    if let (Some(report), true) = (&outcome.report, show_failures) {
        print_failures(report);
    }
    Ok(())
}

fn print_failures(report: &BatchReport) {
    for failure in &report.failures {
        eprintln!("  failed: {}: {}", failure.record, failure.error);
    }
}

#[derive(Serialize)]
struct PathsView<'a> {
    source_root: &'a Path,
    target_root: &'a Path,
    settings_file: Option<&'a Path>,
    snapshot_policy: &'a str,
    cache_prefix: &'a str,
}

pub fn print_paths(
    source_root: &Path,
    target_root: &Path,
    settings_file: Option<&Path>,
    snapshot_policy: &str,
    cache_prefix: &str,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(&PathsView {
            source_root,
            target_root,
            settings_file,
            snapshot_policy,
            cache_prefix,
        });
    }

    println!("{}", AppConfig::DISPLAY_NAME);
    println!("Source (HuggingFace): {}", source_root.display());
    println!("Target (LM Studio):   {}", target_root.display());
    match settings_file {
        Some(path) => println!("Settings file:        {}", path.display()),
        None => println!("Settings file:        (none)"),
    }
    println!("Snapshot policy:      {}", snapshot_policy);
    println!("Cache prefix:         {}", cache_prefix);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
