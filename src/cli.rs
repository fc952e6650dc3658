//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use repo_fleet::output::OutputConfig;

/// Repo Fleet - Inventory git repositories across machines and rebuild them
/// elsewhere
#[derive(Parser, Debug)]
#[command(name = "repo-fleet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan root directories for repositories and record them in a store
    Backup(commands::backup::BackupArgs),

    /// Recreate stored repositories under a target root
    Restore(commands::restore::RestoreArgs),

    /// List the repositories recorded in the store files
    Ls(commands::ls::LsArgs),

    /// Upgrade and normalize store files in place
    Migrate(commands::migrate::MigrateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(&self.log_level),
        )
        .format_timestamp(None)
        .try_init()
        .ok();

        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Backup(args) => commands::backup::execute(args, &output),
            Commands::Restore(args) => commands::restore::execute(args, &output),
            Commands::Ls(args) => commands::ls::execute(args, &output),
            Commands::Migrate(args) => commands::migrate::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
