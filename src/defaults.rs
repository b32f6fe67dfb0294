//! Default values for composer-stager configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring the CLI, the config file and the library agree.

/// Active directory when `--active-dir` is not given.
pub const DEFAULT_ACTIVE_DIR: &str = ".";

/// Staging directory when neither `--staging-dir` nor the config file set one.
///
/// Relative values resolve against the active directory.
pub const DEFAULT_STAGING_DIR: &str = ".composer_staging";

/// Config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILENAME: &str = ".composer-stager.yaml";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "COMPOSER_STAGER_CONFIG";

/// Mutation tool run by `stage`.
pub const DEFAULT_TOOL: &str = "composer";

/// Timeout in seconds for syncs and the mutation tool. `0` disables it.
pub const DEFAULT_TIMEOUT_SECS: i64 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_staging_dir_is_relative() {
        assert!(!std::path::Path::new(DEFAULT_STAGING_DIR).is_absolute());
    }

    #[test]
    fn test_default_timeout_is_disabled() {
        assert_eq!(
            crate::process::parse_timeout(DEFAULT_TIMEOUT_SECS).unwrap(),
            None
        );
    }
}
