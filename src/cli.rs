//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, GlobalOptions};
use composer_stager::defaults::CONFIG_ENV_VAR;

/// Composer Stager - stage changes to a live directory tree and promote them safely
#[derive(Parser, Debug)]
#[command(name = "composer-stager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Configuration file [default: .composer-stager.yaml when present]
    #[arg(long, global = true, value_name = "FILE", env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy the active directory into a new staging directory
    Begin(commands::begin::BeginArgs),

    /// Run the mutation tool inside the staging directory
    Stage(commands::stage::StageArgs),

    /// Make the staged changes live
    Commit(commands::commit::CommitArgs),

    /// Remove the staging directory
    Clean(commands::clean::CleanArgs),

    /// Show which preconditions hold for each stage
    Status(commands::status::StatusArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let globals = GlobalOptions {
            color: self.color,
            config: self.config,
        };

        match self.command {
            Commands::Begin(args) => commands::begin::execute(args, &globals),
            Commands::Stage(args) => commands::stage::execute(args, &globals),
            Commands::Commit(args) => commands::commit::execute(args, &globals),
            Commands::Clean(args) => commands::clean::execute(args, &globals),
            Commands::Status(args) => commands::status::execute(args, &globals),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
