//! CLI for the pansync archive mirror.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pansync_core::config;
use std::path::PathBuf;

use commands::{run_plan, run_sync};

/// Top-level CLI for pansync.
#[derive(Debug, Parser)]
#[command(name = "pansync")]
#[command(about = "pansync: mirror a lazily-listed catalog into a local archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Reconcile the archive against the listing and download what is missing.
    Sync {
        /// JSON manifest mapping identifiers to URLs (the harvested listing).
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Destination directory (overrides the configured save_dir).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Worker pool width (overrides the configured max_threads).
        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        /// Compute and print the plan, remove stale files, download nothing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the download plan. Stale files are still removed; nothing is
    /// downloaded.
    Plan {
        /// JSON manifest mapping identifiers to URLs.
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Destination directory (overrides the configured save_dir).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

pub fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    match cli.command {
        CliCommand::Sync {
            manifest,
            dir,
            threads,
            dry_run,
        } => {
            if let Some(dir) = dir {
                cfg.save_dir = dir;
            }
            if let Some(threads) = threads {
                cfg.max_threads = threads;
            }
            run_sync(&cfg, &manifest, dry_run)
        }
        CliCommand::Plan { manifest, dir } => {
            if let Some(dir) = dir {
                cfg.save_dir = dir;
            }
            run_plan(&cfg, &manifest)
        }
    }
}
