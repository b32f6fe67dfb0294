//! Executable lookup with a per-instance cache
//!
//! Tool presence does not change while the process runs, so every lookup,
//! hit or miss, is remembered for the lifetime of the finder. Share one
//! finder by `Arc` so the file syncer factory and the stager probe the host
//! only once per tool.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

use crate::error::{Error, Result};

/// Resolves logical tool names (`rsync`, `composer`) to absolute paths.
#[derive(Debug, Default)]
pub struct ExecutableFinder {
    /// Overrides `PATH` when set
    search_path: Option<OsString>,
    cache: Mutex<HashMap<String, Option<PathBuf>>>,
}

impl ExecutableFinder {
    /// Create a finder that searches the process `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a finder that searches `search_path` instead of `PATH`.
    ///
    /// The value uses the platform's `PATH` syntax.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Find `name` on the host.
    ///
    /// A name containing a path separator is checked as a path directly.
    pub fn find(&self, name: &str) -> Result<PathBuf> {
        {
            let cache = self.cache.lock().map_err(|_| Error::LockPoisoned {
                context: "executable finder cache".to_string(),
            })?;
            if let Some(cached) = cache.get(name) {
                return cached.clone().ok_or_else(|| Error::ExecutableNotFound {
                    name: name.to_string(),
                });
            }
        }

        let found = self.search(name);
        debug!(
            "Executable lookup for '{}': {}",
            name,
            found
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not found".to_string())
        );

        let mut cache = self.cache.lock().map_err(|_| Error::LockPoisoned {
            context: "executable finder cache".to_string(),
        })?;
        cache.insert(name.to_string(), found.clone());

        found.ok_or_else(|| Error::ExecutableNotFound {
            name: name.to_string(),
        })
    }

    /// Whether `name` can be found, swallowing the error.
    pub fn is_available(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    fn search(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        let direct = Path::new(name);
        if direct.components().count() > 1 || direct.is_absolute() {
            return candidates(direct).into_iter().find(|c| is_executable(c));
        }

        let search_path = match &self.search_path {
            Some(path) => path.clone(),
            None => std::env::var_os("PATH")?,
        };

        std::env::split_paths(&search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| candidates(&dir.join(name)))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(windows)]
fn candidates(base: &Path) -> Vec<PathBuf> {
    let extensions = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    let mut out = vec![base.to_path_buf()];
    for ext in extensions.split(';').filter(|e| !e.is_empty()) {
        let mut with_ext = base.as_os_str().to_owned();
        with_ext.push(ext);
        out.push(PathBuf::from(with_ext));
    }
    out
}

#[cfg(not(windows))]
fn candidates(base: &Path) -> Vec<PathBuf> {
    vec![base.to_path_buf()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_tool(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    #[cfg(unix)]
    fn test_find_in_search_path() {
        let temp_dir = TempDir::new().unwrap();
        let tool = make_tool(temp_dir.path(), "fake-rsync");

        let finder = ExecutableFinder::with_search_path(temp_dir.path().as_os_str());
        assert_eq!(finder.find("fake-rsync").unwrap(), tool);
        assert!(finder.is_available("fake-rsync"));
    }

    #[test]
    fn test_missing_executable_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let finder = ExecutableFinder::with_search_path(temp_dir.path().as_os_str());

        let err = finder.find("definitely-not-a-tool").unwrap_err();
        assert!(matches!(err, Error::ExecutableNotFound { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    #[cfg(unix)]
    fn test_results_are_cached() {
        let temp_dir = TempDir::new().unwrap();
        let finder = ExecutableFinder::with_search_path(temp_dir.path().as_os_str());

        // A miss is remembered even after the tool appears
        assert!(!finder.is_available("late-tool"));
        make_tool(temp_dir.path(), "late-tool");
        assert!(!finder.is_available("late-tool"));

        // A fresh finder sees it
        let fresh = ExecutableFinder::with_search_path(temp_dir.path().as_os_str());
        assert!(fresh.is_available("late-tool"));
    }

    #[test]
    #[cfg(unix)]
    fn test_non_executable_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("plain"), "data").unwrap();

        let finder = ExecutableFinder::with_search_path(temp_dir.path().as_os_str());
        assert!(!finder.is_available("plain"));
    }

    #[test]
    #[cfg(unix)]
    fn test_direct_path_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let tool = make_tool(temp_dir.path(), "tool");

        let finder = ExecutableFinder::with_search_path("");
        assert_eq!(finder.find(tool.to_str().unwrap()).unwrap(), tool);
    }

    #[test]
    fn test_empty_name_is_not_found() {
        let finder = ExecutableFinder::new();
        assert!(finder.find("").is_err());
    }
}
