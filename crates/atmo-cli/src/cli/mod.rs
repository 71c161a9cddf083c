//! CLI for the atmo bulk object fetcher.

mod commands;
mod interrupt;
mod report;

use anyhow::Result;
use atmo_core::config;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_fetch, run_grib, run_ranges};

/// Exit status when the run finished but some items failed.
pub const EXIT_ITEMS_FAILED: i32 = 2;

/// Top-level CLI for atmo.
#[derive(Debug, Parser)]
#[command(name = "atmo")]
#[command(about = "atmo: bulk fetcher for public atmospheric-data buckets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Scheduler overrides shared by commands that download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct RunArgs {
    /// Number of concurrent workers (default from config).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
    /// Attempts per item, including the first (default from config).
    #[arg(long, value_name = "N")]
    pub attempts: Option<u32>,
    /// Re-download files that already exist locally.
    #[arg(long)]
    pub overwrite: bool,
    /// Print the final report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every item listed in a TOML manifest.
    Fetch {
        /// Path to the manifest.
        manifest: PathBuf,
        /// Output root for relative item paths (overrides the manifest's root).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Bucket to read from (overrides manifest and config).
        #[arg(long)]
        bucket: Option<String>,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Download the messages of one GRIB2 file that match the given patterns.
    Grib {
        #[arg(long)]
        bucket: Option<String>,
        /// Key of the GRIB2 object; its inventory is `<key>.idx`.
        #[arg(long)]
        key: String,
        /// Regex matched against inventory lines (repeatable).
        #[arg(long = "pattern", value_name = "REGEX", required = true)]
        patterns: Vec<String>,
        /// Output file (default: the key's file name in the current directory).
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Statistics label.
        #[arg(long, default_value = "grib")]
        label: String,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the byte ranges a `grib` run would fetch, without downloading.
    Ranges {
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long)]
        key: String,
        #[arg(long = "pattern", value_name = "REGEX", required = true)]
        patterns: Vec<String>,
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        shell: Shell,
    },
}

/// Parses arguments and runs the command. Returns the process exit status.
pub async fn run_from_args() -> Result<i32> {
    let cli = Cli::parse();
    if let CliCommand::Completions { shell } = cli.command {
        run_completions(shell);
        return Ok(0);
    }

    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let all_succeeded = match cli.command {
        CliCommand::Fetch {
            manifest,
            out,
            bucket,
            run,
        } => run_fetch(&cfg, &manifest, out, bucket, &run).await?,
        CliCommand::Grib {
            bucket,
            key,
            patterns,
            out,
            label,
            run,
        } => run_grib(&cfg, bucket, &key, &patterns, out, &label, &run).await?,
        CliCommand::Ranges {
            bucket,
            key,
            patterns,
            json,
        } => {
            run_ranges(&cfg, bucket, &key, &patterns, json).await?;
            true
        }
        CliCommand::Completions { .. } => true,
    };

    Ok(if all_succeeded { 0 } else { EXIT_ITEMS_FAILED })
}

#[cfg(test)]
mod tests;
