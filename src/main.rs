//! # Composer Stager CLI
//!
//! Binary entry point for the `composer-stager` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the selected command.
//! - Turning errors into a message on stderr and exit code 1. Usage errors
//!   exit with code 2 from `clap`.
//!
//! The workflow itself lives in the `composer_stager` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
