//! hf-lms-sync - Link HuggingFace cached models into LM Studio.
//!
//! This binary wraps the lms-sync-core engine: it resolves roots from flags,
//! the settings file and platform defaults, installs the logger, and runs
//! one command.

mod logging;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lms_sync_core::{
    ArtifactRecord, Command, LinkState, Settings, SnapshotPolicy, SyncEngine, SyncError,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use logging::LogSettings;

#[derive(Parser, Debug)]
#[command(name = "hf-lms-sync", version)]
#[command(about = "Link HuggingFace cached models into LM Studio without copying them")]
struct Args {
    /// HuggingFace hub cache (defaults to the platform cache location)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// LM Studio models directory (defaults to the platform cache location)
    #[arg(long, global = true)]
    target: Option<PathBuf>,

    /// Settings file (defaults to $HF_LMS_SYNC_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Which snapshots to link: merge-all or latest
    #[arg(long, global = true, value_parser = parse_snapshot_policy)]
    snapshot: Option<SnapshotPolicy>,

    /// Write debug logs to hf-lms-sync.log
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log file used with --verbose
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum CliCommand {
    /// Show the resolved source and target roots
    Paths,
    /// List models in the HuggingFace cache and their link state (default)
    List {
        /// Only show models whose organization or name contains TERM
        #[arg(long, value_name = "TERM")]
        filter: Option<String>,
        /// Only show linked models
        #[arg(long, conflicts_with = "unlinked")]
        linked: bool,
        /// Only show models that are not linked
        #[arg(long)]
        unlinked: bool,
    },
    /// List links whose source model is gone
    Stale,
    /// Link one model into LM Studio
    Link {
        #[arg(value_name = "ORG/NAME")]
        model: String,
    },
    /// Remove one model's links
    Unlink {
        #[arg(value_name = "ORG/NAME")]
        model: String,
    },
    /// Remove one stale link
    Purge {
        #[arg(value_name = "ORG/NAME")]
        model: String,
    },
    /// Link every model that is not linked yet
    LinkAll,
    /// Remove every link
    UnlinkAll,
    /// Remove every stale link
    PurgeAll,
}

fn parse_snapshot_policy(value: &str) -> std::result::Result<SnapshotPolicy, String> {
    SnapshotPolicy::from_str(value)
        .ok_or_else(|| format!("unknown snapshot policy '{value}' (expected merge-all or latest)"))
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<SyncError>()
                .map(SyncError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let settings_path = args.config.clone().or_else(Settings::default_path);
    let settings = match &settings_path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let log_settings = LogSettings::new(
        args.verbose || settings.verbose,
        args.log_file.clone().or_else(|| settings.log_file.clone()),
        args.json,
    );
    logging::init(&log_settings)?;

    let command = args.command.clone().unwrap_or(CliCommand::List {
        filter: None,
        linked: false,
        unlinked: false,
    });
    debug!("Running {:?}", command);

    let mut builder = SyncEngine::builder();
    if let Some(source) = &args.source {
        builder = builder.source_root(source);
    }
    if let Some(target) = &args.target {
        builder = builder.target_root(target);
    }
    if let Some(policy) = args.snapshot {
        builder = builder.snapshot_policy(policy);
    }
    let creates_links = matches!(command, CliCommand::Link { .. } | CliCommand::LinkAll);
    let engine = builder
        .settings(&settings)
        .create_target_root(creates_links)
        .build()?;

    match command {
        CliCommand::Paths => {
            let settings_file = settings_path.as_deref().filter(|p| p.is_file());
            output::print_paths(
                engine.source_root(),
                engine.target_root(),
                settings_file,
                engine.snapshot_policy().as_str(),
                engine.cache_prefix(),
                args.json,
            )?;
        }
        CliCommand::List {
            filter,
            linked,
            unlinked,
        } => {
            let snapshot = engine.discover()?;
            let records: Vec<ArtifactRecord> = snapshot
                .filter(filter.as_deref().unwrap_or_default())
                .into_iter()
                .filter(|r| !linked || r.state() == LinkState::Linked)
                .filter(|r| !unlinked || r.state() == LinkState::Unlinked)
                .collect();
            output::print_records(&records, args.json)?;
        }
        CliCommand::Stale => {
            let stale = engine.list_stale()?;
            output::print_records(&stale, args.json)?;
        }
        CliCommand::Link { model } => {
            let record = find_record(&engine, &model)?;
            if record.is_stale {
                bail!("{} is a stale link; use `purge` to remove it", record.label());
            }
            let outcome = engine.execute(Command::Link(record))?;
            output::print_outcome(&outcome, args.json, false)?;
        }
        CliCommand::Unlink { model } => {
            let record = find_record(&engine, &model)?;
            let outcome = engine.execute(Command::Unlink(record))?;
            output::print_outcome(&outcome, args.json, false)?;
        }
        CliCommand::Purge { model } => {
            let record = find_record(&engine, &model)?;
            if !record.is_stale {
                bail!("{} is not a stale link", record.label());
            }
            let outcome = engine.execute(Command::Purge(record))?;
            output::print_outcome(&outcome, args.json, false)?;
        }
        CliCommand::LinkAll => return run_batch(&engine, Command::LinkAll, &args, &log_settings),
        CliCommand::UnlinkAll => return run_batch(&engine, Command::UnlinkAll, &args, &log_settings),
        CliCommand::PurgeAll => return run_batch(&engine, Command::PurgeAll, &args, &log_settings),
    }

    Ok(ExitCode::SUCCESS)
}

/// Batch failures are reported per item and turn into a non-zero exit.
fn run_batch(
    engine: &SyncEngine,
    command: Command,
    args: &Args,
    log_settings: &LogSettings,
) -> Result<ExitCode> {
    let outcome = engine.execute(command)?;
    output::print_outcome(&outcome, args.json, !log_settings.errors_on_stderr())?;
    if outcome.report.as_ref().is_some_and(|r| r.has_failures()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn find_record(engine: &SyncEngine, label: &str) -> Result<ArtifactRecord> {
    match engine.find(label)? {
        Some(record) => Ok(record),
        None if !label.contains('/') => bail!("Expected ORG/NAME, got '{label}'"),
        None => bail!("Model not found: {label}"),
    }
}
