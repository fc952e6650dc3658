//! Shared test utilities for the CLI end-to-end tests.
//!
//! The fixtures fabricate fake working trees (a `.git` directory holding a
//! plain `config` file) so backup, ls, and migrate flows run without the
//! git binary or the network.

use assert_cmd::Command;
use std::fs;
use std::path::Path;

/// Get a Command for the repo-fleet binary, isolated from the invoking
/// user's real configuration and with a fixed machine identity.
pub fn repo_fleet_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("repo-fleet").unwrap();
    cmd.env("HOME", home)
        .env("REPO_FLEET_MACHINE", "testbox")
        .env_remove("REPO_FLEET_STORE_DIR")
        .env_remove("REPO_FLEET_CONFIG");
    cmd
}

/// Fabricate a repository at `root/rel` whose `.git/config` names a single
/// `origin` remote.
#[allow(dead_code)]
pub fn fake_repo(root: &Path, rel: &str, url: &str) {
    let dir = root.join(rel);
    fs::create_dir_all(dir.join(".git")).unwrap();
    fs::write(
        dir.join(".git/config"),
        format!(
            "[core]\n\trepositoryformatversion = 0\n[remote \"origin\"]\n\turl = {}\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n",
            url
        ),
    )
    .unwrap();
}
