//! Config Snapshot - Main entry point
//!
//! Maintenance CLI over the snapshot manager. Results are printed to stdout
//! as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config_snapshot::{utils, Component, Config, SnapshotManager};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Live configuration directory (overrides config)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Snapshot the live directory (selective when components are given)
    Create {
        #[arg(short, long, default_value = "manual backup")]
        reason: String,

        /// agents, hooks, skills, settings, ecosystem or all
        #[arg(long = "component", value_name = "COMPONENT")]
        components: Vec<Component>,
    },
    /// List snapshots, newest first
    List,
    /// Print one snapshot's manifest
    Show { id: String },
    /// Restore a snapshot into the live directory
    Restore {
        id: String,

        #[arg(long = "component", value_name = "COMPONENT")]
        components: Vec<Component>,
    },
    /// Check that a snapshot's stored files are all present
    Verify { id: String },
    /// File count and measured size of a snapshot
    Stats { id: String },
    /// Delete a snapshot
    Delete { id: String },
    /// Delete all but the newest snapshots
    Cleanup {
        /// Number of snapshots to keep (overrides config)
        #[arg(short, long)]
        keep: Option<usize>,
    },
    /// Remove snapshot directories that have no manifest
    Prune,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::default(),
    };

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    let config_dir = config.resolve_config_dir(args.config_dir.as_deref())?;
    tracing::debug!("Using live directory {}", config_dir.display());

    let manager = SnapshotManager::new(config_dir);

    match args.command {
        Command::Create { reason, components } => {
            let report = if components.is_empty() || components.contains(&Component::All) {
                manager.create_full(&reason, Vec::new()).await
            } else {
                manager.create_selective(&reason, &components).await
            };
            print_json(&report)?;
            if !report.success {
                bail!("snapshot {} was not committed", report.id);
            }
        }
        Command::List => print_json(&manager.list().await)?,
        Command::Show { id } => match manager.get(&id).await {
            Some(manifest) => print_json(&manifest)?,
            None => bail!("snapshot not found: {}", id),
        },
        Command::Restore { id, components } => {
            let components = if components.is_empty() {
                vec![Component::All]
            } else {
                components
            };
            let report = manager.restore(&id, &components).await;
            print_json(&report)?;
            if !report.success {
                bail!("restore of {} finished with {} errors", id, report.errors.len());
            }
        }
        Command::Verify { id } => {
            let report = manager.verify(&id).await;
            print_json(&report)?;
            if !report.valid {
                bail!("snapshot {} is not valid", id);
            }
        }
        Command::Stats { id } => match manager.stats(&id).await {
            Some(stats) => print_json(&stats)?,
            None => bail!("snapshot not found: {}", id),
        },
        Command::Delete { id } => {
            if !manager.delete(&id).await {
                bail!("failed to delete snapshot {}", id);
            }
            tracing::info!("Deleted snapshot {}", id);
        }
        Command::Cleanup { keep } => {
            let report = manager.cleanup(keep.unwrap_or(config.snapshot.keep_count)).await;
            print_json(&report)?;
            if !report.errors.is_empty() {
                bail!("cleanup finished with {} errors", report.errors.len());
            }
        }
        Command::Prune => {
            let report = manager.prune_incomplete().await;
            print_json(&report)?;
            if !report.errors.is_empty() {
                bail!("prune finished with {} errors", report.errors.len());
            }
        }
    }

    Ok(())
}
