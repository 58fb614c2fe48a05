//! CLI for the playmark position store.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use playmark_core::config;
use playmark_core::PositionStore;
use std::path::PathBuf;

use commands::{
    run_get, run_get_bulk, run_mark, run_remove, run_save, run_save_bulk, run_season, run_status,
    run_track,
};

/// Top-level CLI for playmark.
#[derive(Debug, Parser)]
#[command(name = "playmark")]
#[command(about = "playmark: resume-where-you-left-off playback positions, synced", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the value stored under a key.
    Get {
        /// Content path or other store key.
        key: String,
    },

    /// Print values for several keys, repairing tiers that disagree.
    GetBulk {
        /// Keys to look up.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Save a playback position.
    Save {
        /// Content path.
        key: String,
        /// Position in seconds.
        seconds: f64,
    },

    /// Save every entry of a JSON object file (key -> value) in one bulk write.
    SaveBulk {
        /// Path to the JSON file.
        path: PathBuf,
    },

    /// Remove one or more keys from every tier.
    Remove {
        /// Keys to remove.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Show or set the last watched season of a show.
    Season {
        /// Show path, e.g. /dimension-20.
        show: String,
        /// Season to record; omit to print the current one.
        season: Option<String>,
    },

    /// Mark content paths as watched (bulk save) or new (bulk remove).
    Mark {
        /// Content paths.
        #[arg(required = true)]
        keys: Vec<String>,
        /// Forget saved progress instead of setting it.
        #[arg(long, conflicts_with = "at")]
        new: bool,
        /// Position in seconds to record as watched (e.g. the episode length).
        #[arg(long, value_name = "SECONDS", required_unless_present = "new")]
        at: Option<f64>,
    },

    /// Read playback times (seconds, one per line) from stdin and save each for a key.
    Track {
        /// Content path being played.
        key: String,
    },

    /// Show configuration, sync window, and tier locations.
    Status,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let store = PositionStore::open(&cfg).await?;

        match cli.command {
            CliCommand::Get { key } => run_get(&store, &key).await?,
            CliCommand::GetBulk { keys } => run_get_bulk(&store, &keys).await?,
            CliCommand::Save { key, seconds } => run_save(&store, &key, seconds).await?,
            CliCommand::SaveBulk { path } => run_save_bulk(&store, &path).await?,
            CliCommand::Remove { keys } => run_remove(&store, &keys).await?,
            CliCommand::Season { show, season } => {
                run_season(&store, &show, season.as_deref()).await?
            }
            CliCommand::Mark { keys, new, at } => run_mark(&store, &keys, new, at).await?,
            CliCommand::Track { key } => run_track(&store, &key).await?,
            CliCommand::Status => run_status(&store, &cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
