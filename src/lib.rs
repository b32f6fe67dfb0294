//! # Composer Stager Library
//!
//! Stages changes to a live directory tree in an isolated working copy and
//! promotes the result back, so a failed or partial update never reaches
//! the live tree. Used by the `composer-stager` command-line tool.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use composer_stager::finder::ExecutableFinder;
//! use composer_stager::path::{PathList, PathValue};
//! use composer_stager::process::HostProcessRunner;
//! use composer_stager::sync::NativeFileSyncer;
//! use composer_stager::workflow::Workflow;
//!
//! let workflow = Workflow::new(
//!     Arc::new(NativeFileSyncer::new()),
//!     Arc::new(HostProcessRunner::new()),
//!     Arc::new(ExecutableFinder::new()),
//! );
//! let active = PathValue::new("/srv/app");
//! let staging = PathValue::with_base(".composer_staging", "/srv/app");
//! let exclusions = PathList::new(["var/cache"]);
//!
//! workflow.beginner().begin(&active, &staging, &exclusions, None, None)?;
//! workflow.stager().stage(&["update".to_string()], &active, &staging, None, None)?;
//! workflow.committer().commit(&staging, &active, &exclusions, None, None)?;
//! workflow.cleaner().clean(&active, &staging)?;
//! # Ok::<(), composer_stager::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Preconditions (`precondition`)**: a tree of named checks gating every
//!   operation. The first unfulfilled leaf becomes the error.
//! - **File syncing (`sync`)**: mirrors one tree onto another with
//!   exclusions, through `rsync` when available or a native walk otherwise.
//! - **Processes (`process`, `finder`)**: runs the mutation tool with
//!   streamed output and an optional timeout, and locates executables.
//! - **Workflow (`workflow`)**: begin, stage, commit and clean over one
//!   active/staging directory pair.

pub mod config;
pub mod defaults;
pub mod error;
pub mod finder;
pub mod output;
pub mod path;
pub mod precondition;
pub mod process;
pub mod sync;
pub mod workflow;

#[cfg(test)]
mod path_proptest;
