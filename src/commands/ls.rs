//! Ls command implementation
//!
//! Tabulates the contents of every store file: classified path, record
//! name, remote count, and the machines that observed the repository.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use repo_fleet::config::Config;
use repo_fleet::output::OutputConfig;
use repo_fleet::store::{find_store_files, Store};

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Directory holding the store files
    #[arg(long, value_name = "PATH", env = "REPO_FLEET_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "REPO_FLEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print only the number of records
    #[arg(long)]
    pub count: bool,
}

/// Execute the ls command
pub fn execute(args: LsArgs, _output: &OutputConfig) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let store_dir = args.store_dir.clone().unwrap_or_else(super::default_store_dir);
    let store_files = find_store_files(&store_dir)?;
    anyhow::ensure!(
        !store_files.is_empty(),
        "no store files matching repo.db.*.json in {}",
        store_dir.display()
    );

    let mut total = 0usize;
    for store_path in &store_files {
        let store = Store::load(store_path, &config.machine)?;
        total += store.repos.len();
        if args.count {
            continue;
        }
        println!("{} ({} repos)", store_path.display(), store.repos.len());
        for (key, record) in &store.repos {
            let machines: Vec<&str> =
                record.from_paths.keys().map(String::as_str).collect();
            println!(
                "  {}  name={}  remotes={}  machines=[{}]",
                key,
                record.name,
                record.remotes.len(),
                machines.join(", ")
            );
        }
    }

    if args.count {
        println!("{}", total);
    }

    Ok(())
}
