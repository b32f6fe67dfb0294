//! # Configuration File
//!
//! An optional `.composer-stager.yaml` supplies defaults for the CLI:
//!
//! ```yaml
//! staging_dir: /var/tmp/app-staging
//! exclude:
//!   - var/cache
//!   - "*.log"
//! timeout: 300
//! syncer: auto
//! tool: composer
//! ```
//!
//! Every key is optional. Unknown keys are rejected so typos surface
//! immediately rather than silently falling back to defaults.
//!
//! ## Precedence
//!
//! A value given on the command line wins over the file, and the file wins
//! over the built-in defaults in [`crate::defaults`].

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::defaults::DEFAULT_CONFIG_FILENAME;
use crate::error::{Error, Result};
use crate::sync::SyncStrategy;

const KNOWN_KEYS: [&str; 5] = ["staging_dir", "exclude", "timeout", "syncer", "tool"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StagerConfig {
    /// Staging directory, relative to the active directory unless absolute
    pub staging_dir: Option<String>,
    /// Exclusion patterns applied to begin and commit
    pub exclude: Vec<String>,
    /// Seconds; `0` disables
    pub timeout: Option<i64>,
    pub syncer: Option<SyncStrategy>,
    /// Mutation tool run by `stage`
    pub tool: Option<String>,
}

impl StagerConfig {
    /// Parse a YAML document. An empty document is an empty config.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml_content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(|e| {
            let message = e.to_string();
            let hint = if message.contains("unknown field") {
                Some(format!("Supported keys are: {}", KNOWN_KEYS.join(", ")))
            } else if message.contains("unknown variant") {
                Some("syncer must be one of: auto, rsync, native".to_string())
            } else {
                None
            };
            Error::ConfigParse { message, hint }
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::parse(&content)
    }

    /// Load the config the CLI should use.
    ///
    /// An explicit path (flag or `COMPOSER_STAGER_CONFIG`) must exist. Without
    /// one, `.composer-stager.yaml` in `dir` is used if present, and an empty
    /// config otherwise.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = default_path(dir);
        if candidate.is_file() {
            Self::from_file(candidate)
        } else {
            debug!(
                "No {} in {}; using built-in defaults",
                DEFAULT_CONFIG_FILENAME,
                dir.display()
            );
            Ok(Self::default())
        }
    }
}

pub fn default_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILENAME)
}
