//! `rsync`-backed mirror pass
//!
//! Runs `rsync --archive --checksum --delete-after` with every exclusion
//! anchored to the transfer root. `--checksum` replaces rsync's size and
//! mtime quick check so every differing file is rewritten. rsync never
//! deletes excluded paths at the receiving side unless `--delete-excluded`
//! is given, which leaves excluded destination entries untouched.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use super::{FileSyncer, SyncPlan};
use crate::error::{Error, Result};
use crate::path::PathList;
use crate::process::{OutputCallback, ProcessCommand, ProcessRunner};

/// Logical name used to look rsync up on the host.
pub const RSYNC: &str = "rsync";

/// Mirrors trees by delegating to an `rsync` executable.
pub struct RsyncFileSyncer {
    executable: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl RsyncFileSyncer {
    pub fn new(executable: PathBuf, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { executable, runner }
    }

    fn command(&self, plan: &SyncPlan) -> ProcessCommand {
        // A trailing slash makes rsync copy the contents, not the directory itself
        let mut source: OsString = plan.source.as_os_str().to_owned();
        source.push("/");

        ProcessCommand::new(&self.executable)
            .args(["--archive", "--checksum", "--delete-after", "--verbose"])
            .args(
                plan.matcher
                    .patterns()
                    .iter()
                    .map(|pattern| format!("--exclude=/{}", pattern)),
            )
            .arg(source)
            .arg(plan.destination.as_os_str())
    }
}

/// Human-readable meaning of an rsync exit status.
pub fn describe_exit_code(code: i32) -> &'static str {
    match code {
        1 => "syntax or usage error",
        2 => "protocol incompatibility",
        3 => "errors selecting input/output files or directories",
        5 => "error starting client-server protocol",
        10 => "error in socket I/O",
        11 => "error in file I/O",
        12 => "error in rsync protocol data stream",
        20 => "received SIGUSR1 or SIGINT",
        23 => "partial transfer due to error",
        24 => "partial transfer due to vanished source files",
        30 => "timeout in data send/receive",
        35 => "timeout waiting for daemon connection",
        _ => "unknown error",
    }
}

impl FileSyncer for RsyncFileSyncer {
    fn name(&self) -> &'static str {
        RSYNC
    }

    fn sync(
        &self,
        source: &Path,
        destination: &Path,
        exclusions: &PathList,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let plan = SyncPlan::prepare(source, destination, exclusions, timeout)?;
        let command = self.command(&plan);
        info!(
            "Syncing {} -> {} (rsync)",
            plan.source.display(),
            plan.destination.display()
        );
        debug!("Running {}", command);

        let output = self.runner.run(&command, callback, timeout)?;

        if output.timed_out {
            return Err(Error::Timeout {
                operation: command.to_string(),
                timeout: timeout.unwrap_or_default(),
            });
        }

        match output.exit_code {
            Some(0) => Ok(()),
            Some(code) => {
                let stderr = output.stderr.trim();
                let mut message = format!("rsync failed: {}", describe_exit_code(code));
                if !stderr.is_empty() {
                    message.push_str(": ");
                    message.push_str(stderr);
                }
                Err(Error::ProcessFailed {
                    command: command.to_string(),
                    exit_code: Some(code),
                    message,
                })
            }
            None => Err(Error::ProcessFailed {
                command: command.to_string(),
                exit_code: None,
                message: "rsync was terminated by a signal".to_string(),
            }),
        }
    }
}
