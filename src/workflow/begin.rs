//! Begin: create the staging copy

use std::sync::Arc;
use std::time::Duration;

use log::info;

use super::{context, marker, with_marker};
use crate::error::Result;
use crate::path::{PathList, PathValue};
use crate::precondition::stages;
use crate::process::OutputCallback;
use crate::sync::FileSyncer;

pub struct Beginner {
    syncer: Arc<dyn FileSyncer>,
}

impl Beginner {
    pub fn new(syncer: Arc<dyn FileSyncer>) -> Self {
        Self { syncer }
    }

    /// Mirror `active_dir` into a fresh `staging_dir`, then mark it ready.
    ///
    /// A staging directory nested under the active directory is excluded
    /// from its own copy. On failure the staging directory may be partially
    /// populated and must be cleaned before beginning again.
    pub fn begin(
        &self,
        active_dir: &PathValue,
        staging_dir: &PathValue,
        exclusions: &PathList,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let ctx = context(active_dir, staging_dir, exclusions);
        stages::beginner().assert_is_fulfilled(&ctx)?;

        info!(
            "Beginning: {} -> {}",
            ctx.active_dir().display(),
            ctx.staging_dir().display()
        );
        self.syncer.sync(
            ctx.active_dir(),
            ctx.staging_dir(),
            &with_marker(exclusions),
            callback,
            timeout,
        )?;

        marker::write(ctx.staging_dir(), ctx.active_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::sync::NativeFileSyncer;
    use std::fs;
    use tempfile::TempDir;

    fn beginner() -> Beginner {
        Beginner::new(Arc::new(NativeFileSyncer::new()))
    }

    fn pair(temp: &TempDir) -> (PathValue, PathValue) {
        let active = temp.path().join("app");
        fs::create_dir_all(active.join("b")).unwrap();
        fs::write(active.join("a.txt"), "1").unwrap();
        fs::write(active.join("b/c.txt"), "2").unwrap();
        (
            PathValue::from(active.as_path()),
            PathValue::with_base(".composer_staging", &active),
        )
    }

    #[test]
    fn test_begin_copies_and_marks_ready() {
        let temp = TempDir::new().unwrap();
        let (active, staging) = pair(&temp);

        beginner()
            .begin(&active, &staging, &PathList::default(), None, None)
            .unwrap();

        let staging = staging.resolved();
        assert_eq!(fs::read_to_string(staging.join("a.txt")).unwrap(), "1");
        assert_eq!(fs::read_to_string(staging.join("b/c.txt")).unwrap(), "2");
        assert!(!staging.join(".composer_staging").exists());
        assert!(marker::check(&staging, &active.resolved()).is_ok());
    }

    #[test]
    fn test_begin_honors_exclusions() {
        let temp = TempDir::new().unwrap();
        let (active, staging) = pair(&temp);

        beginner()
            .begin(&active, &staging, &PathList::new(["b"]), None, None)
            .unwrap();

        let staging = staging.resolved();
        assert!(staging.join("a.txt").exists());
        assert!(!staging.join("b").exists());
    }

    #[test]
    fn test_begin_refuses_existing_staging_dir() {
        let temp = TempDir::new().unwrap();
        let (active, staging) = pair(&temp);
        fs::create_dir(staging.resolved()).unwrap();
        fs::write(staging.resolved().join("in-progress.txt"), "keep").unwrap();

        let err = beginner()
            .begin(&active, &staging, &PathList::default(), None, None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(matches!(err, Error::Precondition { ref name, .. } if name == "Staging directory does not exist"));
        assert!(staging.resolved().join("in-progress.txt").exists());
    }

    #[test]
    fn test_begin_refuses_missing_active_dir() {
        let temp = TempDir::new().unwrap();
        let active = PathValue::from(temp.path().join("missing").as_path());
        let staging = PathValue::from(temp.path().join("stage").as_path());

        let err = beginner()
            .begin(&active, &staging, &PathList::default(), None, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(!temp.path().join("stage").exists());
    }

    #[test]
    fn test_begin_into_sibling_directory() {
        let temp = TempDir::new().unwrap();
        let (active, _) = pair(&temp);
        let staging = PathValue::from(temp.path().join("stage").as_path());

        beginner()
            .begin(&active, &staging, &PathList::default(), None, None)
            .unwrap();
        assert!(temp.path().join("stage/b/c.txt").exists());
    }
}
