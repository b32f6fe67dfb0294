//! # Error Handling
//!
//! This module defines the centralized error type for `composer-stager`. It
//! uses `thiserror` to build a single `Error` enum covering every failure the
//! workflow engine, the file syncers and the process runner can produce.
//!
//! ## Key Components
//!
//! - **`Error`**: every failure mode, each variant carrying a human-readable,
//!   parameterized message and the offending path where one exists.
//!
//! - **`ErrorKind`**: the coarse taxonomy callers branch on. Every `Error`
//!   maps to exactly one kind through [`Error::kind`]:
//!
//!   - `Precondition`: a named check failed. Recoverable by fixing the
//!     environment and retrying.
//!   - `Io`: a device or filesystem failure, including a missing executable.
//!   - `ProcessFailed`: an external command exited non-zero, could not start,
//!     timed out, or a native copy step failed.
//!   - `InvalidArgument`: the caller supplied malformed input.
//!   - `Logic`: a contract violation. Fatal, never retried.
//!
//! - **`Result<T>`**: a type alias for `std::result::Result<T, Error>`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Main error type for composer-stager operations
#[derive(Error, Debug)]
pub enum Error {
    /// A precondition gating a workflow stage is not fulfilled.
    ///
    /// `name` is the name of the first unfulfilled leaf, `message` its status.
    #[error("Precondition failed: {name} - {message}")]
    Precondition { name: String, message: String },

    /// A filesystem operation failed on a specific path.
    #[error("Filesystem error at '{}': {message}", path.display())]
    Filesystem { path: PathBuf, message: String },

    /// An executable could not be located on the host.
    #[error("Executable not found: {name}")]
    ExecutableNotFound { name: String },

    /// An external command could not start or exited unsuccessfully.
    #[error("Process failed: {command}{} - {message}", exit_code.map(|c| format!(" (exit code {})", c)).unwrap_or_default())]
    ProcessFailed {
        command: String,
        exit_code: Option<i32>,
        message: String,
    },

    /// A native mirror step failed partway through a sync pass.
    #[error("Sync failed at '{}': {message}", path.display())]
    Sync { path: PathBuf, message: String },

    /// An operation did not finish within its timeout.
    #[error("Timed out after {}s: {operation}", timeout.as_secs())]
    Timeout { operation: String, timeout: Duration },

    /// The caller supplied a malformed input.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An error occurred while parsing the configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A contract violation inside the engine.
    #[error("Logic error: {message}")]
    Logic { message: String },

    /// An error indicating that a mutex has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// The error taxonomy callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    Io,
    ProcessFailed,
    InvalidArgument,
    Logic,
}

impl Error {
    /// Build a `Filesystem` error from an I/O failure on `path`.
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Build a `Sync` error from an I/O failure on `path`.
    pub fn sync(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Error::Sync {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Build an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build a `Logic` error.
    pub fn logic(message: impl Into<String>) -> Self {
        Error::Logic {
            message: message.into(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Precondition { .. } => ErrorKind::Precondition,
            Error::Filesystem { .. } | Error::ExecutableNotFound { .. } | Error::Io(_) => {
                ErrorKind::Io
            }
            Error::ProcessFailed { .. } | Error::Sync { .. } | Error::Timeout { .. } => {
                ErrorKind::ProcessFailed
            }
            Error::InvalidArgument { .. }
            | Error::ConfigParse { .. }
            | Error::Yaml(_)
            | Error::Glob(_) => ErrorKind::InvalidArgument,
            Error::Logic { .. } | Error::LockPoisoned { .. } => ErrorKind::Logic,
        }
    }

    /// Whether this error was caused by an expired timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
