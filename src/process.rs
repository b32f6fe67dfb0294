//! # External Process Execution
//!
//! The workflow shells out twice: the stager runs the mutation tool inside the
//! staging directory, and the rsync file syncer delegates the mirror pass.
//! Both go through the [`ProcessRunner`] trait so tests can substitute a fake.
//!
//! ## Behavior
//!
//! [`HostProcessRunner`] spawns the command with piped stdout/stderr. Two
//! reader threads forward complete lines over a channel; the calling thread
//! drains the channel, hands each line to the optional [`OutputCallback`],
//! and checks the deadline between lines. The call blocks until the process
//! exits or the timeout expires, in which case the child is killed and the
//! result is flagged `timed_out`.
//!
//! `run` reports what happened as a [`ProcessOutput`]; `run_checked` (or
//! [`ProcessOutput::into_result`]) turns a non-zero exit or an expired
//! timeout into the matching [`Error`] variant.

use std::ffi::OsString;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Which stream a line of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Stderr,
}

/// Receives output incrementally while a process or sync pass is running.
pub trait OutputCallback {
    fn on_output(&mut self, kind: OutputKind, line: &str);
}

impl<F> OutputCallback for F
where
    F: FnMut(OutputKind, &str),
{
    fn on_output(&mut self, kind: OutputKind, line: &str) {
        self(kind, line)
    }
}

/// Convert a user-supplied timeout in seconds.
///
/// `0` disables the timeout; negative values are rejected.
pub fn parse_timeout(secs: i64) -> Result<Option<Duration>> {
    match secs {
        s if s < 0 => Err(Error::invalid_argument(format!(
            "Timeout must be zero (disabled) or a positive number of seconds, got {}",
            s
        ))),
        0 => Ok(None),
        s => Ok(Some(Duration::from_secs(s as u64))),
    }
}

/// A command line to execute: program, arguments, and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    program: PathBuf,
    args: Vec<OsString>,
    working_dir: Option<PathBuf>,
}

impl ProcessCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// What a finished (or killed) process produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal or timed out
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    fn push(&mut self, kind: OutputKind, line: &str) {
        let buffer = match kind {
            OutputKind::Stdout => &mut self.stdout,
            OutputKind::Stderr => &mut self.stderr,
        };
        buffer.push_str(line);
        buffer.push('\n');
    }

    /// Map a timed-out or unsuccessful run onto the error taxonomy.
    pub fn into_result(self, command: &ProcessCommand, timeout: Option<Duration>) -> Result<Self> {
        if self.timed_out {
            return Err(Error::Timeout {
                operation: command.to_string(),
                timeout: timeout.unwrap_or_default(),
            });
        }
        if self.exit_code == Some(0) {
            return Ok(self);
        }

        let stderr = self.stderr.trim();
        let message = if !stderr.is_empty() {
            stderr.to_string()
        } else if self.exit_code.is_none() {
            "terminated by a signal".to_string()
        } else {
            "exited unsuccessfully".to_string()
        };
        Err(Error::ProcessFailed {
            command: command.to_string(),
            exit_code: self.exit_code,
            message,
        })
    }
}

/// Runs external processes.
pub trait ProcessRunner: Send + Sync {
    /// Run `command` to completion, streaming its output to `callback`.
    ///
    /// Fails only when the process cannot be started or waited on; exit codes
    /// and timeouts are reported in the returned [`ProcessOutput`].
    fn run(
        &self,
        command: &ProcessCommand,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput>;

    /// Like [`ProcessRunner::run`], but a non-zero exit or an expired timeout is an error.
    fn run_checked(
        &self,
        command: &ProcessCommand,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput> {
        self.run(command, callback, timeout)?
            .into_result(command, timeout)
    }
}

/// The default [`ProcessRunner`], backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProcessRunner;

impl HostProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_reader<R>(pipe: R, kind: OutputKind, tx: Sender<(OutputKind, String)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    if tx.send((kind, line)).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

fn kill(child: &mut Child, command: &ProcessCommand, timeout: Option<Duration>) {
    warn!(
        "Killing '{}' after exceeding its {}s timeout",
        command,
        timeout.unwrap_or_default().as_secs()
    );
    let _ = child.kill();
    let _ = child.wait();
}

impl ProcessRunner for HostProcessRunner {
    fn run(
        &self,
        command: &ProcessCommand,
        mut callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }

        debug!("Running '{}'", command);
        let mut child = cmd.spawn().map_err(|e| Error::ProcessFailed {
            command: command.to_string(),
            exit_code: None,
            message: format!("could not start: {}", e),
        })?;

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, OutputKind::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, OutputKind::Stderr, tx.clone());
        }
        drop(tx);

        let deadline = timeout.map(|t| Instant::now() + t);
        let expired = |deadline: Option<Instant>| deadline.is_some_and(|d| Instant::now() >= d);
        let mut output = ProcessOutput::default();

        // Drain output until both pipes close
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok((kind, line)) => {
                    output.push(kind, &line);
                    if let Some(cb) = callback.as_mut() {
                        cb.on_output(kind, &line);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if expired(deadline) {
                kill(&mut child, command, timeout);
                output.timed_out = true;
                return Ok(output);
            }
        }

        loop {
            let status = child.try_wait().map_err(|e| Error::ProcessFailed {
                command: command.to_string(),
                exit_code: None,
                message: format!("could not wait for process: {}", e),
            })?;
            if let Some(status) = status {
                output.exit_code = status.code();
                debug!("'{}' exited with {:?}", command, output.exit_code);
                return Ok(output);
            }
            if expired(deadline) {
                kill(&mut child, command, timeout);
                output.timed_out = true;
                return Ok(output);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}
