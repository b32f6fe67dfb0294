//! Clean: remove the staging directory

use std::fs;
use std::io;

use log::{debug, info};

use super::context;
use crate::error::{Error, Result};
use crate::path::{PathList, PathValue};
use crate::precondition::stages;

#[derive(Debug, Default)]
pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    /// Remove `staging_dir` recursively. Succeeds without doing anything
    /// when it does not exist.
    pub fn clean(&self, active_dir: &PathValue, staging_dir: &PathValue) -> Result<()> {
        let ctx = context(active_dir, staging_dir, &PathList::default());
        stages::cleaner().assert_is_fulfilled(&ctx)?;

        let staging = ctx.staging_dir();
        let meta = match fs::symlink_metadata(staging) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Nothing to clean at {}", staging.display());
                return Ok(());
            }
            Err(e) => return Err(Error::io(staging, e)),
        };

        info!("Removing staging directory {}", staging.display());
        let removed = if meta.is_dir() {
            fs::remove_dir_all(staging)
        } else {
            fs::remove_file(staging)
        };
        removed.map_err(|e| Error::io(staging, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_staging_tree() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join(".composer_staging");
        fs::create_dir_all(staging.join("vendor/pkg")).unwrap();
        fs::write(staging.join("vendor/pkg/lib.php"), "<?php").unwrap();
        fs::write(temp.path().join("live.txt"), "live").unwrap();

        Cleaner::new()
            .clean(
                &PathValue::from(temp.path()),
                &PathValue::from(staging.as_path()),
            )
            .unwrap();

        assert!(!staging.exists());
        assert!(temp.path().join("live.txt").exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let active = PathValue::from(temp.path());
        let staging = PathValue::from(temp.path().join(".composer_staging").as_path());

        Cleaner::new().clean(&active, &staging).unwrap();
        Cleaner::new().clean(&active, &staging).unwrap();
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_refuses_same_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("live.txt"), "live").unwrap();
        let dir = PathValue::from(temp.path());

        let err = Cleaner::new().clean(&dir, &dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(temp.path().join("live.txt").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_clean_removes_symlink_not_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("elsewhere");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "keep").unwrap();
        let staging = temp.path().join("stage");
        std::os::unix::fs::symlink(&target, &staging).unwrap();

        Cleaner::new()
            .clean(
                &PathValue::from(temp.path()),
                &PathValue::from(staging.as_path()),
            )
            .unwrap();

        assert!(fs::symlink_metadata(&staging).is_err());
        assert!(target.join("keep.txt").exists());
    }
}
