//! Backup command implementation
//!
//! Scans one or more root directories, reconciles every discovered
//! repository into the store covering that root, and saves the store(s).
//! In single mode all roots share one store file; in multi mode each root
//! writes its own, named after the root path.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;

use repo_fleet::classify::Classifier;
use repo_fleet::config::{Config, StoreMode};
use repo_fleet::output::{emoji, OutputConfig};
use repo_fleet::processor::ProcessorRegistry;
use repo_fleet::store::{store_file_name, Store};
use repo_fleet::walker::{ScanSummary, Walker};

/// Arguments for the backup command
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Root directories to scan (defaults to the configured roots)
    pub roots: Vec<PathBuf>,

    /// Maximum recursion depth
    #[arg(short, long, value_name = "N")]
    pub depth: Option<usize>,

    /// Directory holding the store files
    #[arg(long, value_name = "PATH", env = "REPO_FLEET_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "REPO_FLEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Show detailed progress information
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the backup command
pub fn execute(args: BackupArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();

    let config = Config::load(args.config.as_deref())?;
    let roots = if args.roots.is_empty() {
        config.roots.clone()
    } else {
        args.roots.clone()
    };
    anyhow::ensure!(
        !roots.is_empty(),
        "no root directories: pass them as arguments or set 'roots' in repo-fleet.toml"
    );

    let depth = args.depth.unwrap_or(config.max_depth);
    let store_dir = args.store_dir.clone().unwrap_or_else(super::default_store_dir);
    std::fs::create_dir_all(&store_dir)?;

    let classifier = Classifier::new(config.aliases.clone());
    let registry = ProcessorRegistry::default();
    let walker = Walker::new(&registry, &classifier, &config.machine);

    // Configured roots that only exist on other machines are skipped, not
    // fatal
    let (present, missing): (Vec<_>, Vec<_>) = roots.into_iter().partition(|r| r.exists());
    for root in &missing {
        log::warn!("target folder not found, skipping: {}", root.display());
    }
    anyhow::ensure!(
        !present.is_empty(),
        "none of the given root directories exist on this machine"
    );

    if !args.quiet {
        println!("{} Repo Fleet Backup", emoji(output, "🔍", "[SCAN]"));
        println!();
    }

    let mut total = ScanSummary::default();
    match config.store_mode {
        StoreMode::Single => {
            let store_path = store_dir.join(store_file_name(StoreMode::Single, &store_dir));
            let mut store = Store::load(&store_path, &config.machine)?;
            for root in &present {
                if !args.quiet {
                    println!("  scanning {}", root.display());
                }
                let summary = walker.scan(root, depth, &mut store)?;
                report_root(args.quiet, args.verbose, &summary);
                total.directories_visited += summary.directories_visited;
                total.repos_found += summary.repos_found;
            }
            store.save(&store_path)?;
            if !args.quiet {
                println!("  store written to {}", store_path.display());
            }
        }
        StoreMode::Multi => {
            for root in &present {
                let store_path = store_dir.join(store_file_name(StoreMode::Multi, root));
                let mut store = Store::load(&store_path, &config.machine)?;
                if !args.quiet {
                    println!("  scanning {}", root.display());
                }
                let summary = walker.scan(root, depth, &mut store)?;
                report_root(args.quiet, args.verbose, &summary);
                store.save(&store_path)?;
                if !args.quiet {
                    println!("  store written to {}", store_path.display());
                }
                total.directories_visited += summary.directories_visited;
                total.repos_found += summary.repos_found;
            }
        }
    }

    if !args.quiet {
        let duration = start_time.elapsed();
        println!();
        println!(
            "{} Done: {} repositories across {} directories in {:.2}s",
            emoji(output, "✅", "[OK]"),
            total.repos_found,
            total.directories_visited,
            duration.as_secs_f64()
        );
    }

    Ok(())
}

fn report_root(quiet: bool, verbose: bool, summary: &ScanSummary) {
    if !quiet && verbose {
        println!(
            "    {} repositories, {} directories visited",
            summary.repos_found, summary.directories_visited
        );
    }
}
