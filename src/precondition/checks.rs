//! Concrete precondition leaves
//!
//! Each constructor returns a [`Leaf`] whose check inspects the filesystem at
//! evaluation time. Nothing is cached between evaluations.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::{Context, Leaf};
use crate::finder::ExecutableFinder;
use crate::workflow::marker;

fn same_location(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn require_dir(path: &Path, label: &str) -> Result<(), String> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(format!(
            "The {} directory is not a directory: {}",
            label,
            path.display()
        )),
        Err(_) => Err(format!(
            "The {} directory does not exist: {}",
            label,
            path.display()
        )),
    }
}

fn require_writable(path: &Path, label: &str) -> Result<(), String> {
    require_dir(path, label)?;
    let meta = fs::metadata(path).map_err(|e| e.to_string())?;
    if meta.permissions().readonly() {
        return Err(format!(
            "The {} directory is not writable: {}",
            label,
            path.display()
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn has_read_bits(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o444 != 0
}

#[cfg(not(unix))]
fn has_read_bits(_meta: &fs::Metadata) -> bool {
    true
}

fn require_readable(path: &Path, label: &str) -> Result<(), String> {
    require_dir(path, label)?;
    let readable = fs::metadata(path)
        .map(|meta| has_read_bits(&meta))
        .unwrap_or(false)
        && fs::read_dir(path).is_ok();
    if readable {
        Ok(())
    } else {
        Err(format!(
            "The {} directory is not readable: {}",
            label,
            path.display()
        ))
    }
}

pub fn directories_are_different() -> Leaf {
    Leaf::new(
        "Active and staging directories are different",
        "The active and staging directories cannot be the same.",
        "The active and staging directories are different.",
        |ctx: &Context| {
            if same_location(ctx.active_dir(), ctx.staging_dir()) {
                Err(format!(
                    "The active and staging directories are the same: {}",
                    ctx.active_dir().display()
                ))
            } else {
                Ok(())
            }
        },
    )
}

pub fn active_dir_exists() -> Leaf {
    Leaf::new(
        "Active directory exists",
        "There must be an active directory present before staging can begin.",
        "The active directory exists.",
        |ctx: &Context| require_dir(ctx.active_dir(), "active"),
    )
}

pub fn active_dir_is_writable() -> Leaf {
    Leaf::new(
        "Active directory is writable",
        "The active directory must be writable before any changes can be made.",
        "The active directory is writable.",
        |ctx: &Context| require_writable(ctx.active_dir(), "active"),
    )
}

pub fn staging_dir_does_not_exist() -> Leaf {
    Leaf::new(
        "Staging directory does not exist",
        "The staging directory must not already exist before beginning the staging process.",
        "The staging directory does not already exist.",
        |ctx: &Context| match fs::symlink_metadata(ctx.staging_dir()) {
            Ok(_) => Err(format!(
                "The staging directory already exists: {}. Run clean first",
                ctx.staging_dir().display()
            )),
            Err(_) => Ok(()),
        },
    )
}

pub fn staging_dir_exists() -> Leaf {
    Leaf::new(
        "Staging directory exists",
        "The staging directory must already exist before any changes can be staged.",
        "The staging directory exists.",
        |ctx: &Context| require_dir(ctx.staging_dir(), "staging"),
    )
}

pub fn staging_dir_is_writable() -> Leaf {
    Leaf::new(
        "Staging directory is writable",
        "The staging directory must be writable before any changes can be staged.",
        "The staging directory is writable.",
        |ctx: &Context| require_writable(ctx.staging_dir(), "staging"),
    )
}

pub fn staging_dir_is_readable() -> Leaf {
    Leaf::new(
        "Staging directory is readable",
        "The staging directory must be readable before its changes can be committed.",
        "The staging directory is readable.",
        |ctx: &Context| require_readable(ctx.staging_dir(), "staging"),
    )
}

pub fn staging_dir_is_ready() -> Leaf {
    Leaf::new(
        "Staging directory is ready",
        "The staging directory must hold the ready marker written by a successful begin.",
        "The staging directory is ready.",
        |ctx: &Context| marker::check(ctx.staging_dir(), ctx.active_dir()),
    )
}

/// The mutation tool must be on the host. Lookups go through the shared
/// finder, so repeated evaluations hit its cache.
pub fn tool_is_available(finder: Arc<ExecutableFinder>, tool: impl Into<String>) -> Leaf {
    let tool = tool.into();
    Leaf::new(
        format!("{} is available", tool),
        format!("{} must be available on the host to stage changes.", tool),
        format!("{} is available.", tool),
        move |_: &Context| match finder.find(&tool) {
            Ok(_) => Ok(()),
            Err(e) => Err(format!("{} cannot be found: {}", tool, e)),
        },
    )
}
