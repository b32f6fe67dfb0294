//! # Staging Workflow
//!
//! Four operations move one directory pair through its life cycle:
//!
//! ```text
//!  [absent] --begin--> [staged] --stage--> [staged] --commit--> [absent*]
//!                          |                                      ^
//!                          +----------------clean-----------------+
//! ```
//!
//! (*) commit leaves the staging directory in place; clean removes it.
//!
//! ## Key Components
//!
//! - **[`Beginner`]**: mirrors the active directory into a new staging
//!   directory and writes the ready marker.
//! - **[`Stager`]**: runs the mutation tool inside the staging directory.
//! - **[`Committer`]**: mirrors the staging directory back onto the active
//!   directory. The only operation that touches the live tree.
//! - **[`Cleaner`]**: removes the staging directory. A no-op when it is
//!   already gone.
//!
//! Every operation asserts its own precondition tree at call time. The four
//! steps usually run as separate invocations, so nothing checked by an
//! earlier step is trusted.
//!
//! [`Workflow`] owns the shared collaborators (file syncer, process runner,
//! executable finder) and hands out the four operations.

pub mod begin;
pub mod clean;
pub mod commit;
pub mod marker;
pub mod stage;

use std::path::PathBuf;
use std::sync::Arc;

use crate::defaults::DEFAULT_TOOL;
use crate::error::Result;
use crate::finder::ExecutableFinder;
use crate::path::{PathList, PathValue};
use crate::precondition::{stages, Context, Precondition};
use crate::process::{HostProcessRunner, ProcessRunner};
use crate::sync::{FileSyncer, FileSyncerFactory, SyncStrategy};

pub use begin::Beginner;
pub use clean::Cleaner;
pub use commit::Committer;
pub use stage::Stager;

/// The stages a directory pair moves through, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Begin,
    Stage,
    Commit,
    Clean,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Begin, Stage::Stage, Stage::Commit, Stage::Clean];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Begin => "begin",
            Stage::Stage => "stage",
            Stage::Commit => "commit",
            Stage::Clean => "clean",
        }
    }
}

/// Shared collaborators for the four operations.
#[derive(Clone)]
pub struct Workflow {
    syncer: Arc<dyn FileSyncer>,
    runner: Arc<dyn ProcessRunner>,
    finder: Arc<ExecutableFinder>,
    tool: String,
}

impl Workflow {
    pub fn new(
        syncer: Arc<dyn FileSyncer>,
        runner: Arc<dyn ProcessRunner>,
        finder: Arc<ExecutableFinder>,
    ) -> Self {
        Self {
            syncer,
            runner,
            finder,
            tool: DEFAULT_TOOL.to_string(),
        }
    }

    /// Wire the host process runner and a fresh finder, picking the file
    /// syncer for `strategy`.
    pub fn for_host(strategy: SyncStrategy) -> Result<Self> {
        let finder = Arc::new(ExecutableFinder::new());
        let runner: Arc<dyn ProcessRunner> = Arc::new(HostProcessRunner::new());
        let syncer = FileSyncerFactory::new(finder.clone(), runner.clone()).create(strategy)?;
        Ok(Self::new(syncer, runner, finder))
    }

    /// Use `tool` as the mutation tool instead of `composer`.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn syncer(&self) -> &dyn FileSyncer {
        self.syncer.as_ref()
    }

    pub fn beginner(&self) -> Beginner {
        Beginner::new(self.syncer.clone())
    }

    pub fn stager(&self) -> Stager {
        Stager::new(self.runner.clone(), self.finder.clone(), self.tool.clone())
    }

    pub fn committer(&self) -> Committer {
        Committer::new(self.syncer.clone())
    }

    pub fn cleaner(&self) -> Cleaner {
        Cleaner::new()
    }

    /// The precondition tree gating `stage`.
    pub fn preconditions(&self, stage: Stage) -> Precondition {
        match stage {
            Stage::Begin => stages::beginner(),
            Stage::Stage => stages::stager(self.finder.clone(), &self.tool),
            Stage::Commit => stages::committer(),
            Stage::Clean => stages::cleaner(),
        }
    }
}

/// Resolve a directory pair and build the evaluation context for it.
pub fn context(active_dir: &PathValue, staging_dir: &PathValue, exclusions: &PathList) -> Context {
    let active: PathBuf = active_dir.resolved();
    let staging: PathBuf = staging_dir.resolved();
    Context::new(active, staging).with_exclusions(exclusions.clone())
}

/// The caller's exclusions plus the ready marker, which never leaves the
/// staging directory.
fn with_marker(exclusions: &PathList) -> PathList {
    let mut exclusions = exclusions.clone();
    exclusions.add([marker::MARKER_FILENAME]);
    exclusions
}
