//! Restore command implementation
//!
//! The mirror of backup: finds every store file in the store directory by
//! the fixed naming convention, and for each one asks the restore engine to
//! materialize the enabled categories under the target root.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use repo_fleet::config::Config;
use repo_fleet::output::{emoji, OutputConfig};
use repo_fleet::processor::ProcessorRegistry;
use repo_fleet::restore::restore_all;
use repo_fleet::store::{find_store_files, Store};

/// Arguments for the restore command
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Root directory to restore repositories under
    pub root: PathBuf,

    /// Restrict restoration to these categories (defaults to the
    /// configured restore categories)
    #[arg(short = 'C', long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Directory holding the store files
    #[arg(long, value_name = "PATH", env = "REPO_FLEET_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "REPO_FLEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show what would be done without running git
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the restore command
pub fn execute(args: RestoreArgs, output: &OutputConfig) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let categories = if args.categories.is_empty() {
        config.restore_categories.clone()
    } else {
        args.categories.clone()
    };

    let store_dir = args.store_dir.clone().unwrap_or_else(super::default_store_dir);
    let store_files = find_store_files(&store_dir)?;
    anyhow::ensure!(
        !store_files.is_empty(),
        "no store files matching repo.db.*.json in {}",
        store_dir.display()
    );

    if !args.quiet {
        println!("{} Repo Fleet Restore", emoji(output, "🚀", "[RESTORE]"));
        println!("  categories: {}", categories.join(", "));
        if args.dry_run {
            println!("  DRY RUN MODE - no git commands will run");
        }
        println!();
    }

    let registry = ProcessorRegistry::default();
    let mut attempted = 0;
    let mut cloned = 0;
    let mut failed = 0;

    for store_path in &store_files {
        if !args.quiet {
            println!("  using store {}", store_path.display());
        }
        let store = Store::load(store_path, &config.machine)?;
        let summary = restore_all(&store, &args.root, &categories, &registry, args.dry_run);
        attempted += summary.attempted;
        cloned += summary.cloned;
        failed += summary.failed;
    }

    if !args.quiet {
        println!();
        println!(
            "{} Done: {} attempted, {} cloned, {} failed",
            emoji(output, "✅", "[OK]"),
            attempted,
            cloned,
            failed
        );
    }

    Ok(())
}
