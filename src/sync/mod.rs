//! # File Synchronization
//!
//! A file syncer mirrors a source tree onto a destination tree, honoring an
//! exclusion list. After a successful pass the destination holds exactly the
//! non-excluded entries of the source, with the source's content; excluded
//! paths are neither copied nor touched at the destination.
//!
//! ## Strategies
//!
//! - **`rsync`** ([`rsync::RsyncFileSyncer`]): delegates the pass to the
//!   external `rsync` utility. Preferred whenever `rsync` is on `PATH`.
//! - **Native** ([`native::NativeFileSyncer`]): walks both trees itself. Used
//!   when `rsync` is missing, or when forced.
//!
//! [`FileSyncerFactory`] picks one at runtime using the shared
//! [`ExecutableFinder`], whose cache means the host is probed only once.
//!
//! ## Shared rules
//!
//! Both strategies go through [`SyncPlan::prepare`], which validates the
//! request, creates the destination, and adds the nested root to the
//! exclusions when one tree lives inside the other.

pub mod native;
pub mod rsync;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::finder::ExecutableFinder;
use crate::path::{nested_relative, to_slash, ExclusionMatcher, PathList, PathValue};
use crate::process::{OutputCallback, ProcessRunner};

pub use native::NativeFileSyncer;
pub use rsync::RsyncFileSyncer;

/// Mirrors one directory tree onto another.
pub trait FileSyncer: Send + Sync {
    /// Short name used in logs and status output.
    fn name(&self) -> &'static str;

    /// Mirror `source` onto `destination`, skipping `exclusions`.
    ///
    /// The pass is not atomic: a failure partway leaves the destination
    /// partially mirrored, and the error is returned.
    fn sync(
        &self,
        source: &Path,
        destination: &Path,
        exclusions: &PathList,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()>;
}

/// Which syncer implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStrategy {
    /// `rsync` when available, native otherwise
    #[default]
    Auto,
    Rsync,
    Native,
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStrategy::Auto => "auto",
            SyncStrategy::Rsync => "rsync",
            SyncStrategy::Native => "native",
        };
        f.write_str(name)
    }
}

impl FromStr for SyncStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(SyncStrategy::Auto),
            "rsync" => Ok(SyncStrategy::Rsync),
            "native" => Ok(SyncStrategy::Native),
            other => Err(Error::invalid_argument(format!(
                "Unknown sync strategy '{}' (expected auto, rsync or native)",
                other
            ))),
        }
    }
}

/// Builds file syncers, probing the host for `rsync` through the shared finder.
#[derive(Clone)]
pub struct FileSyncerFactory {
    finder: Arc<ExecutableFinder>,
    runner: Arc<dyn ProcessRunner>,
}

impl FileSyncerFactory {
    pub fn new(finder: Arc<ExecutableFinder>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { finder, runner }
    }

    pub fn create(&self, strategy: SyncStrategy) -> Result<Arc<dyn FileSyncer>> {
        match strategy {
            SyncStrategy::Native => Ok(Arc::new(NativeFileSyncer::new())),
            SyncStrategy::Rsync => {
                let executable = self.finder.find(rsync::RSYNC)?;
                Ok(Arc::new(RsyncFileSyncer::new(executable, self.runner.clone())))
            }
            SyncStrategy::Auto => match self.finder.find(rsync::RSYNC) {
                Ok(executable) => {
                    debug!("Using rsync at {}", executable.display());
                    Ok(Arc::new(RsyncFileSyncer::new(executable, self.runner.clone())))
                }
                Err(Error::ExecutableNotFound { .. }) => {
                    debug!("rsync not found; falling back to the native syncer");
                    Ok(Arc::new(NativeFileSyncer::new()))
                }
                Err(e) => Err(e),
            },
        }
    }
}

/// A validated sync request shared by both strategies.
#[derive(Debug)]
pub(crate) struct SyncPlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub matcher: ExclusionMatcher,
    pub deadline: Option<Instant>,
    pub timeout: Option<Duration>,
}

impl SyncPlan {
    pub fn prepare(
        source: &Path,
        destination: &Path,
        exclusions: &PathList,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let source = PathValue::from(source).resolved();
        let destination = PathValue::from(destination).resolved();

        match std::fs::metadata(&source) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::Filesystem {
                    path: source,
                    message: "The source is not a directory".to_string(),
                })
            }
            Err(e) => return Err(Error::io(&source, e)),
        }

        if same_location(&source, &destination) {
            return Err(Error::logic(format!(
                "The source and destination directories cannot be the same: {}",
                source.display()
            )));
        }

        let mut exclusions = exclusions.clone();
        if let Some(nested) = nested_relative(&destination, &source) {
            exclusions.add([to_slash(&nested)]);
        }
        if let Some(nested) = nested_relative(&source, &destination) {
            exclusions.add([to_slash(&nested)]);
        }
        let matcher = ExclusionMatcher::with_roots(&exclusions, &[&source, &destination])?;

        std::fs::create_dir_all(&destination).map_err(|e| Error::io(&destination, e))?;

        Ok(Self {
            source,
            destination,
            matcher,
            deadline: timeout.map(|t| Instant::now() + t),
            timeout,
        })
    }

    /// Fail with a timeout error once the deadline has passed.
    pub fn check_deadline(&self, operation: &str) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::Timeout {
                operation: operation.to_string(),
                timeout: self.timeout.unwrap_or_default(),
            }),
            _ => Ok(()),
        }
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
