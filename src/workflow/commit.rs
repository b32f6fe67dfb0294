//! Commit: make staged changes live

use std::sync::Arc;
use std::time::Duration;

use log::info;

use super::{context, with_marker};
use crate::error::Result;
use crate::path::{PathList, PathValue};
use crate::precondition::stages;
use crate::process::OutputCallback;
use crate::sync::FileSyncer;

pub struct Committer {
    syncer: Arc<dyn FileSyncer>,
}

impl Committer {
    pub fn new(syncer: Arc<dyn FileSyncer>) -> Self {
        Self { syncer }
    }

    /// Mirror `staging_dir` onto `active_dir`.
    ///
    /// The pass is not transactional. If it fails partway the active
    /// directory is left part-mirrored and the error is returned.
    pub fn commit(
        &self,
        staging_dir: &PathValue,
        active_dir: &PathValue,
        exclusions: &PathList,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let ctx = context(active_dir, staging_dir, exclusions);
        stages::committer().assert_is_fulfilled(&ctx)?;

        info!(
            "Committing: {} -> {}",
            ctx.staging_dir().display(),
            ctx.active_dir().display()
        );
        self.syncer.sync(
            ctx.staging_dir(),
            ctx.active_dir(),
            &with_marker(exclusions),
            callback,
            timeout,
        )
    }
}
