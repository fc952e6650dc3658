//! Migrate command implementation
//!
//! Rewrites store files in place through the canonical schema: the load
//! path runs the version upgrade and key normalization, typed
//! deserialization drops non-canonical record fields legacy scans left
//! behind (core/branch subtrees, fetch refspecs), and this command
//! additionally strips remotes down to url-only before saving.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use repo_fleet::config::Config;
use repo_fleet::output::{emoji, OutputConfig};
use repo_fleet::store::{find_store_files, Store};

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Directory holding the store files
    #[arg(long, value_name = "PATH", env = "REPO_FLEET_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "REPO_FLEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show what would change without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the migrate command
pub fn execute(args: MigrateArgs, output: &OutputConfig) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let store_dir = args.store_dir.clone().unwrap_or_else(super::default_store_dir);
    let store_files = find_store_files(&store_dir)?;
    anyhow::ensure!(
        !store_files.is_empty(),
        "no store files matching repo.db.*.json in {}",
        store_dir.display()
    );

    for store_path in &store_files {
        let mut store = Store::load(store_path, &config.machine)?;
        for record in store.repos.values_mut() {
            for remote in record.remotes.values_mut() {
                remote.pushurl = None;
            }
        }
        if !args.quiet {
            println!(
                "{} {} ({} repos){}",
                emoji(output, "🔧", "[MIGRATE]"),
                store_path.display(),
                store.repos.len(),
                if args.dry_run { " - dry run, not written" } else { "" }
            );
        }
        if !args.dry_run {
            store.save(store_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_execute_strips_legacy_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("repo.db.all.json");
        let legacy = json!({
            "repos": {
                "comm/tool": {
                    "name": "tool",
                    "core": {"bare": "false"},
                    "remotes": {
                        "origin": {
                            "url": "https://host/a.git",
                            "pushurl": "git@host:a.git"
                        }
                    }
                }
            }
        });
        std::fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

        let args = MigrateArgs {
            store_dir: Some(temp.path().to_path_buf()),
            config: None,
            dry_run: false,
            quiet: true,
        };
        execute(args, &OutputConfig { use_color: false }).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"version\""));
        assert!(text.contains("https://host/a.git"));
        assert!(!text.contains("pushurl"));
        assert!(!text.contains("core"));
    }

    #[test]
    fn test_execute_dry_run_does_not_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("repo.db.all.json");
        std::fs::write(&path, r#"{"repos": {}}"#).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let args = MigrateArgs {
            store_dir: Some(temp.path().to_path_buf()),
            config: None,
            dry_run: true,
            quiet: true,
        };
        execute(args, &OutputConfig { use_color: false }).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
