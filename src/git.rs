//! # Git Process Boundary
//!
//! Every interaction with git goes through the system `git` command, which
//! automatically handles:
//! - SSH keys from `~/.ssh/`
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in `~/.gitconfig`
//!
//! Calls are synchronous and blocking with no timeout; a hung git process
//! hangs the run. Output is captured and trimmed.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::{info, warn};

use crate::error::{Error, Result};

/// Cap on remote-name suffix attempts when `git remote add` collides.
const MAX_REMOTE_NAME_ATTEMPTS: usize = 10;

/// What a clone-or-add call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction {
    /// The repository was cloned fresh, with the given initial remote name.
    Cloned,
    /// An existing work tree gained a new remote under this (possibly
    /// suffixed) name.
    AddedRemote(String),
    /// The URL was already configured under some remote; nothing to do.
    AlreadyPresent,
}

/// True iff `path` exists and git recognizes it as a repository.
pub fn repository_exists(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .current_dir(path)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Clone `url` into `target`, naming the initial remote `remote_name`.
pub fn clone(url: &str, target: &Path, remote_name: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let output = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(target)
        .args(["-o", remote_name])
        .output()
        .map_err(|err| Error::GitClone {
            url: url.to_string(),
            target: target.display().to_string(),
            message: err.to_string(),
            hint: None,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let hint = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            Some(
                "make sure you have access to the repository: SSH key in ssh-agent, \
                 credentials configured, or a personal access token set up"
                    .to_string(),
            )
        } else {
            None
        };
        return Err(Error::GitClone {
            url: url.to_string(),
            target: target.display().to_string(),
            message: stderr,
            hint,
        });
    }

    Ok(())
}

/// Run a git command in `dir`, returning trimmed stdout.
fn run_in(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|err| Error::GitCommand {
            command: format!("git {}", args.join(" ")),
            dir: dir.display().to_string(),
            stderr: err.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: format!("git {}", args.join(" ")),
            dir: dir.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// URLs currently configured in the work tree at `path`, in `git remote -v`
/// order, deduplicated.
pub fn list_remote_urls(path: &Path) -> Result<Vec<String>> {
    let listing = run_in(path, &["remote", "-v"])?;
    Ok(remote_urls_from_listing(&listing))
}

/// Parse `git remote -v` output: `<name>\t<url> (fetch|push)` per line.
fn remote_urls_from_listing(listing: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for line in listing.lines() {
        let Some(rest) = line.split_whitespace().nth(1) else {
            continue;
        };
        if !urls.iter().any(|u| u == rest) {
            urls.push(rest.to_string());
        }
    }
    urls
}

/// Add a remote to the work tree at `path`.
pub fn add_remote(path: &Path, name: &str, url: &str) -> Result<()> {
    run_in(path, &["remote", "add", name, url]).map(|_| ())
}

/// Materialize one remote at `target`: clone if the repository does not
/// exist there yet, otherwise add the remote unless its URL is already
/// configured under any name.
///
/// A failed clone is retried once, but only while the repository still does
/// not exist locally; this is a one-shot clone, not a resumable transfer.
/// Remote-name collisions retry with an incrementing suffix (`name`,
/// `name1`, `name2`, ...) up to a fixed cap.
pub fn clone_or_add_remote(target: &Path, name: &str, url: &str) -> Result<RestoreAction> {
    if !repository_exists(target) {
        info!("cloning {} into {}", url, target.display());
        return match clone(url, target, name) {
            Ok(()) => Ok(RestoreAction::Cloned),
            Err(first) => {
                if repository_exists(target) {
                    return Err(first);
                }
                warn!("clone failed, retrying once: {}", first);
                clone(url, target, name)?;
                Ok(RestoreAction::Cloned)
            }
        };
    }

    let existing = list_remote_urls(target)?;
    if existing.iter().any(|u| u == url) {
        return Ok(RestoreAction::AlreadyPresent);
    }

    let mut candidate = name.to_string();
    for attempt in 0..MAX_REMOTE_NAME_ATTEMPTS {
        match add_remote(target, &candidate, url) {
            Ok(()) => {
                info!(
                    "added remote {} = {} in {}",
                    candidate,
                    url,
                    target.display()
                );
                return Ok(RestoreAction::AddedRemote(candidate));
            }
            Err(Error::GitCommand { ref stderr, .. }) if stderr.contains("already exists") => {
                candidate = format!("{}{}", name, attempt + 1);
            }
            Err(err) => return Err(err),
        }
    }

    Err(Error::GitCommand {
        command: format!("git remote add {} {}", name, url),
        dir: target.display().to_string(),
        stderr: format!(
            "no free remote name after {} attempts",
            MAX_REMOTE_NAME_ATTEMPTS
        ),
    })
}
