//! # CLI Command Implementations
//!
//! Each subcommand of `composer-stager` lives in its own file with:
//! - An `Args` struct deriving `clap::Args`.
//! - An `execute` function that resolves settings and calls into the
//!   `composer_stager` library.
//!
//! The argument groups shared by several commands, and the merge of command
//! line, config file and built-in defaults, live here.

pub mod begin;
pub mod clean;
pub mod commit;
pub mod completions;
pub mod stage;
pub mod status;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};

use composer_stager::config::StagerConfig;
use composer_stager::defaults::{
    DEFAULT_ACTIVE_DIR, DEFAULT_STAGING_DIR, DEFAULT_TIMEOUT_SECS, DEFAULT_TOOL,
};
use composer_stager::output::OutputConfig;
use composer_stager::path::{PathList, PathValue};
use composer_stager::process::{parse_timeout, OutputCallback, OutputKind};
use composer_stager::sync::SyncStrategy;

/// Options that apply to every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub color: String,
    pub config: Option<PathBuf>,
}

/// The directory pair.
#[derive(Args, Debug, Clone)]
pub struct DirArgs {
    /// The live directory
    #[arg(short = 'd', long, value_name = "DIR", default_value = DEFAULT_ACTIVE_DIR)]
    pub active_dir: String,

    /// The staging directory, relative to the active directory unless
    /// absolute [default: .composer_staging]
    #[arg(short = 's', long, value_name = "DIR")]
    pub staging_dir: Option<String>,
}

/// Sync strategy as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SyncerArg {
    /// rsync when available, native otherwise
    Auto,
    Rsync,
    Native,
}

impl From<SyncerArg> for SyncStrategy {
    fn from(arg: SyncerArg) -> Self {
        match arg {
            SyncerArg::Auto => SyncStrategy::Auto,
            SyncerArg::Rsync => SyncStrategy::Rsync,
            SyncerArg::Native => SyncStrategy::Native,
        }
    }
}

/// Options for commands that mirror a tree.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Path to leave untouched, relative to the tree root (repeatable)
    #[arg(short = 'e', long = "exclude", value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Give up after this many seconds (0 disables)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// File sync implementation
    #[arg(long, value_enum, value_name = "SYNCER")]
    pub syncer: Option<SyncerArg>,
}

/// Everything a command needs after merging flags, config and defaults.
#[derive(Debug)]
pub struct Settings {
    pub active_dir: PathValue,
    pub staging_dir: PathValue,
    pub exclusions: PathList,
    pub timeout: Option<Duration>,
    pub strategy: SyncStrategy,
    pub tool: String,
    pub out: OutputConfig,
}

impl Settings {
    /// Merge command-line values over the config file over the defaults.
    ///
    /// A non-empty `--exclude` list replaces the file's list.
    pub fn resolve(
        globals: &GlobalOptions,
        dirs: &DirArgs,
        sync: &SyncArgs,
        tool: Option<&str>,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
        let config = StagerConfig::discover(globals.config.as_deref(), &cwd)
            .context("Failed to load configuration")?;

        let active_dir = PathValue::with_base(dirs.active_dir.as_str(), &cwd);
        let staging_raw = dirs
            .staging_dir
            .clone()
            .or(config.staging_dir)
            .unwrap_or_else(|| DEFAULT_STAGING_DIR.to_string());
        let staging_dir = PathValue::with_base(staging_raw, active_dir.resolved());

        let exclusions = if sync.exclude.is_empty() {
            PathList::new(config.exclude)
        } else {
            PathList::new(sync.exclude.iter().cloned())
        };

        let timeout = parse_timeout(sync.timeout.or(config.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS))?;
        let strategy = sync
            .syncer
            .map(SyncStrategy::from)
            .or(config.syncer)
            .unwrap_or_default();
        let tool = tool
            .map(str::to_string)
            .or(config.tool)
            .unwrap_or_else(|| DEFAULT_TOOL.to_string());

        Ok(Self {
            active_dir,
            staging_dir,
            exclusions,
            timeout,
            strategy,
            tool,
            out: OutputConfig::from_env_and_flag(&globals.color),
        })
    }
}

/// Streams tool output to the terminal: stdout to stdout, stderr to stderr.
pub fn echo_output() -> impl OutputCallback {
    |kind: OutputKind, line: &str| match kind {
        OutputKind::Stdout => println!("{}", line),
        OutputKind::Stderr => eprintln!("{}", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        dirs: DirArgs,
        #[command(flatten)]
        sync: SyncArgs,
    }

    fn globals(config: Option<PathBuf>) -> GlobalOptions {
        GlobalOptions {
            color: "never".to_string(),
            config,
        }
    }

    #[test]
    fn test_defaults() {
        let h = Harness::parse_from(["t"]);
        let temp = tempfile::TempDir::new().unwrap();
        let empty = temp.path().join("empty.yaml");
        std::fs::write(&empty, "").unwrap();

        let s = Settings::resolve(&globals(Some(empty)), &h.dirs, &h.sync, None).unwrap();
        assert_eq!(s.active_dir.raw(), ".");
        assert_eq!(s.staging_dir.raw(), ".composer_staging");
        assert!(s.staging_dir.resolved().starts_with(s.active_dir.resolved()));
        assert!(s.exclusions.is_empty());
        assert_eq!(s.timeout, None);
        assert_eq!(s.strategy, SyncStrategy::Auto);
        assert_eq!(s.tool, "composer");
    }

    #[test]
    fn test_flags_override_config() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("stager.yaml");
        std::fs::write(
            &config,
            "staging_dir: from-config\nexclude: [cfg]\ntimeout: 9\nsyncer: rsync\ntool: cfg-tool\n",
        )
        .unwrap();

        let h = Harness::parse_from(["t"]);
        let s = Settings::resolve(&globals(Some(config.clone())), &h.dirs, &h.sync, None).unwrap();
        assert_eq!(s.staging_dir.raw(), "from-config");
        assert_eq!(s.exclusions.get_all(), &["cfg"]);
        assert_eq!(s.timeout, Some(Duration::from_secs(9)));
        assert_eq!(s.strategy, SyncStrategy::Rsync);
        assert_eq!(s.tool, "cfg-tool");

        let h = Harness::parse_from([
            "t", "-s", "flag", "-e", "a", "--exclude", "b", "--timeout", "0", "--syncer", "native",
        ]);
        let s = Settings::resolve(&globals(Some(config)), &h.dirs, &h.sync, Some("sh")).unwrap();
        assert_eq!(s.staging_dir.raw(), "flag");
        assert_eq!(s.exclusions.get_all(), &["a", "b"]);
        assert_eq!(s.timeout, None);
        assert_eq!(s.strategy, SyncStrategy::Native);
        assert_eq!(s.tool, "sh");
    }

    #[test]
    fn test_negative_timeout_is_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("empty.yaml");
        std::fs::write(&config, "").unwrap();

        let h = Harness::parse_from(["t", "--timeout", "-5"]);
        let err = Settings::resolve(&globals(Some(config)), &h.dirs, &h.sync, None).unwrap_err();
        assert!(err.to_string().contains("Timeout"));
    }
}
