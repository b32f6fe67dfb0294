//! The staging-ready marker
//!
//! Begin writes a small JSON file into the staging directory once its mirror
//! pass succeeds. Commit refuses to run without it. A missing, unreadable or
//! corrupt marker, or one recorded for a different active directory, means
//! "not ready"; it is never an error in itself.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the marker inside the staging directory.
pub const MARKER_FILENAME: &str = ".composer_stager_ready";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyMarker {
    /// The active directory this staging copy was begun from
    pub active_dir: PathBuf,
    /// Seconds since the Unix epoch
    pub created_at: u64,
    /// Version of the tool that wrote the marker
    pub version: String,
}

impl ReadyMarker {
    pub fn new(active_dir: &Path) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            active_dir: active_dir.to_path_buf(),
            created_at,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub fn marker_path(staging_dir: &Path) -> PathBuf {
    staging_dir.join(MARKER_FILENAME)
}

/// Record that `staging_dir` is a complete copy of `active_dir`.
pub fn write(staging_dir: &Path, active_dir: &Path) -> Result<()> {
    let path = marker_path(staging_dir);
    let json = serde_json::to_string_pretty(&ReadyMarker::new(active_dir))
        .map_err(|e| Error::logic(format!("Cannot serialize the ready marker: {}", e)))?;
    fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
    debug!("Wrote ready marker {}", path.display());
    Ok(())
}

/// Read the marker, treating anything unreadable as absent.
pub fn read(staging_dir: &Path) -> Option<ReadyMarker> {
    let path = marker_path(staging_dir);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(marker) => Some(marker),
        Err(e) => {
            debug!("Ignoring corrupt ready marker {}: {}", path.display(), e);
            None
        }
    }
}

/// Whether `staging_dir` holds a valid marker for `active_dir`, and if not, why.
pub fn check(staging_dir: &Path, active_dir: &Path) -> std::result::Result<(), String> {
    let path = marker_path(staging_dir);
    match read(staging_dir) {
        Some(marker) if marker.active_dir == active_dir => Ok(()),
        Some(marker) => Err(format!(
            "The staging ready marker {} was written for a different active directory: {}",
            path.display(),
            marker.active_dir.display()
        )),
        None => Err(format!(
            "The staging directory is not ready: the ready marker {} is missing or corrupt. Run begin first",
            path.display()
        )),
    }
}
