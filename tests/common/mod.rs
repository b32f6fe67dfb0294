//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("a.txt", "1");
//!     fixture.command().arg("begin").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{has_rsync, TestFixture, STAGING_DIR};
}

/// The default staging directory name, relative to the active directory.
pub const STAGING_DIR: &str = ".composer_staging";

/// Whether `rsync` is installed, for tests that exercise it directly.
#[allow(dead_code)]
pub fn has_rsync() -> bool {
    composer_stager::finder::ExecutableFinder::new().is_available("rsync")
}

/// An active directory in a temporary location.
///
/// Commands run with the fixture as working directory, `--color never`, and
/// no config file from the environment.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a `.composer-stager.yaml` with the given content.
    #[allow(dead_code)]
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".composer-stager.yaml", content)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of the default staging directory.
    pub fn staging(&self) -> PathBuf {
        self.path().join(STAGING_DIR)
    }

    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file relative to the active directory.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// A command for the composer-stager binary running in this fixture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("composer-stager");
        cmd.current_dir(self.path())
            .env_remove("COMPOSER_STAGER_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("b/c.txt", "2");
        assert_eq!(fixture.read("b/c.txt"), "2");
        assert!(!fixture.staging().exists());
    }
}
