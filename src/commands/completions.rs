//! Completions command implementation
//!
//! Generates shell completion scripts via `clap_complete`. Users redirect
//! the output to the appropriate file for their shell:
//!
//! ```bash
//! repo-fleet completions bash > ~/.local/share/bash-completion/completions/repo-fleet
//! repo-fleet completions zsh > ~/.zfunc/_repo-fleet
//! ```

use std::io;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "repo-fleet", &mut io::stdout());
    Ok(())
}
