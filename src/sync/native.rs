//! Native mirror pass
//!
//! Two ordered walks:
//!
//! 1. **Copy**: depth-first over the source (sorted by file name), pruning
//!    excluded subtrees. Directories are created before their contents;
//!    files are copied in full, always overwriting; symlinks are recreated
//!    with the same target string and never followed.
//! 2. **Delete**: only after every copy, pre-order over the destination with
//!    excluded subtrees pruned. Entries with no mirrored source counterpart
//!    are removed in reverse walk order, children before their directory. A
//!    directory still holding excluded entries is kept.
//!
//! A destination directory that holds excluded entries is never replaced by
//! a file or symlink; the sync fails instead.
//!
//! Sockets, FIFOs and device nodes are skipped with a warning.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use walkdir::WalkDir;

use super::{FileSyncer, SyncPlan};
use crate::error::{Error, Result};
use crate::path::{to_slash, PathList};
use crate::process::{OutputCallback, OutputKind};

/// Mirrors trees by walking them directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFileSyncer;

impl NativeFileSyncer {
    pub fn new() -> Self {
        Self
    }
}

fn report(callback: &mut Option<&mut dyn OutputCallback>, line: &str) {
    if let Some(cb) = callback.as_mut() {
        cb.on_output(OutputKind::Stdout, line);
    }
}

fn walk_error(err: walkdir::Error, fallback: &Path) -> Error {
    let path = err.path().unwrap_or(fallback).to_path_buf();
    Error::Sync {
        path,
        message: err.to_string(),
    }
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> Result<&'a Path> {
    path.strip_prefix(root).map_err(|_| {
        Error::logic(format!(
            "Walked entry {} is outside of {}",
            path.display(),
            root.display()
        ))
    })
}

/// Remove whatever occupies `target`, directory or not.
///
/// Refuses to remove a directory with excluded entries beneath it.
fn remove_occupant(
    plan: &SyncPlan,
    relative: &Path,
    target: &Path,
    meta: &fs::Metadata,
) -> Result<()> {
    if !meta.is_dir() {
        return remove_link_or_file(target).map_err(|e| Error::sync(target, e));
    }
    if let Some(kept) = excluded_descendant(plan, relative, target)? {
        return Err(Error::Sync {
            path: target.to_path_buf(),
            message: format!(
                "Cannot replace directory: it holds the excluded entry {}",
                to_slash(&kept)
            ),
        });
    }
    fs::remove_dir_all(target).map_err(|e| Error::sync(target, e))
}

/// The first entry beneath the destination directory `target` that the
/// exclusions protect, relative to the destination root.
fn excluded_descendant(
    plan: &SyncPlan,
    relative: &Path,
    target: &Path,
) -> Result<Option<PathBuf>> {
    for entry in WalkDir::new(target).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(e, target))?;
        let inner = relative.join(relative_to(entry.path(), target)?);
        if plan.matcher.is_excluded(&inner) {
            return Ok(Some(inner));
        }
    }
    Ok(None)
}

fn remove_link_or_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        // Directory symlinks on Windows are removed as directories
        #[cfg(windows)]
        Err(_) => fs::remove_dir(path),
        other => other,
    }
}

fn ensure_dir(plan: &SyncPlan, relative: &Path, target: &Path) -> Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(meta) => remove_occupant(plan, relative, target, &meta)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::sync(target, e)),
    }
    fs::create_dir_all(target).map_err(|e| Error::sync(target, e))
}

fn copy_file(plan: &SyncPlan, relative: &Path, source: &Path, target: &Path) -> Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_file() && !meta.permissions().readonly() => {}
        Ok(meta) => remove_occupant(plan, relative, target, &meta)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::sync(target, e)),
    }
    fs::copy(source, target).map_err(|e| Error::sync(target, e))?;
    Ok(())
}

fn copy_symlink(plan: &SyncPlan, relative: &Path, source: &Path, target: &Path) -> Result<()> {
    let link = fs::read_link(source).map_err(|e| Error::sync(source, e))?;

    match fs::symlink_metadata(target) {
        Ok(meta) => {
            if meta.file_type().is_symlink() && fs::read_link(target).ok().as_ref() == Some(&link)
            {
                return Ok(());
            }
            remove_occupant(plan, relative, target, &meta)?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::sync(target, e)),
    }

    create_symlink(source, &link, target).map_err(|e| Error::sync(target, e))
}

#[cfg(unix)]
fn create_symlink(_source: &Path, link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

#[cfg(windows)]
fn create_symlink(source: &Path, link: &Path, target: &Path) -> io::Result<()> {
    let points_to_dir = fs::metadata(source).map(|m| m.is_dir()).unwrap_or(false);
    if points_to_dir {
        std::os::windows::fs::symlink_dir(link, target)
    } else {
        std::os::windows::fs::symlink_file(link, target)
    }
}

impl NativeFileSyncer {
    /// Copy phase. Returns the relative paths that now exist at the destination.
    fn copy_tree(
        &self,
        plan: &SyncPlan,
        callback: &mut Option<&mut dyn OutputCallback>,
    ) -> Result<HashSet<PathBuf>> {
        let mut mirrored = HashSet::new();
        let source = &plan.source;

        let walker = WalkDir::new(source)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(source)
                    .map(|rel| !plan.matcher.is_excluded(rel))
                    .unwrap_or(true)
            });

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(e, source))?;
            let relative = relative_to(entry.path(), source)?.to_path_buf();
            let target = plan.destination.join(&relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                ensure_dir(plan, &relative, &target)?;
            } else if file_type.is_file() {
                copy_file(plan, &relative, entry.path(), &target)?;
            } else if file_type.is_symlink() {
                copy_symlink(plan, &relative, entry.path(), &target)?;
            } else {
                warn!("Skipping special file {}", entry.path().display());
                continue;
            }

            debug!("Mirrored {}", relative.display());
            report(callback, &to_slash(&relative));
            mirrored.insert(relative);
            plan.check_deadline("native sync")?;
        }

        Ok(mirrored)
    }

    /// Delete phase. Returns the number of entries removed.
    fn delete_stale(
        &self,
        plan: &SyncPlan,
        mirrored: &HashSet<PathBuf>,
        callback: &mut Option<&mut dyn OutputCallback>,
    ) -> Result<usize> {
        let destination = &plan.destination;

        // Collect first so nothing is removed while a directory handle is
        // open. Must be pre-order: pruning a contents-first walk also skips
        // the pruned directory's later siblings.
        let mut stale = Vec::new();
        let walker = WalkDir::new(destination)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(destination)
                    .map(|rel| !plan.matcher.is_excluded(rel))
                    .unwrap_or(true)
            });
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(e, destination))?;
            let relative = relative_to(entry.path(), destination)?;
            if !mirrored.contains(relative) {
                stale.push((relative.to_path_buf(), entry.file_type().is_dir()));
            }
        }

        let mut deleted = 0;
        for (relative, is_dir) in stale.into_iter().rev() {
            let target = destination.join(&relative);
            if is_dir {
                let mut children = fs::read_dir(&target).map_err(|e| Error::sync(&target, e))?;
                if children.next().is_some() {
                    debug!("Keeping {} which holds excluded entries", relative.display());
                    continue;
                }
                fs::remove_dir(&target).map_err(|e| Error::sync(&target, e))?;
            } else {
                remove_link_or_file(&target).map_err(|e| Error::sync(&target, e))?;
            }

            debug!("Deleted {}", relative.display());
            report(callback, &format!("deleting {}", to_slash(&relative)));
            deleted += 1;
            plan.check_deadline("native sync")?;
        }

        Ok(deleted)
    }
}

impl FileSyncer for NativeFileSyncer {
    fn name(&self) -> &'static str {
        "native"
    }

    fn sync(
        &self,
        source: &Path,
        destination: &Path,
        exclusions: &PathList,
        mut callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let plan = SyncPlan::prepare(source, destination, exclusions, timeout)?;
        info!(
            "Syncing {} -> {} (native)",
            plan.source.display(),
            plan.destination.display()
        );

        let mirrored = self.copy_tree(&plan, &mut callback)?;
        let deleted = self.delete_stale(&plan, &mirrored, &mut callback)?;

        info!(
            "Native sync complete: {} entries mirrored, {} deleted",
            mirrored.len(),
            deleted
        );
        Ok(())
    }
}
