//! # Completions Command Implementation
//!
//! Prints a `clap_complete` script for the chosen shell.
//!
//! ```bash
//! composer-stager completions bash > ~/.local/share/bash-completion/completions/composer-stager
//! composer-stager completions zsh > ~/.zfunc/_composer-stager
//! ```

use std::io;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// bash, zsh, fish, powershell or elvish
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
