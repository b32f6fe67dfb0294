//! Stage: run the mutation tool inside the staging directory

use std::sync::Arc;
use std::time::Duration;

use log::info;

use super::context;
use crate::error::{Error, Result};
use crate::finder::ExecutableFinder;
use crate::path::{PathList, PathValue};
use crate::precondition::stages;
use crate::process::{OutputCallback, ProcessCommand, ProcessOutput, ProcessRunner};

pub struct Stager {
    runner: Arc<dyn ProcessRunner>,
    finder: Arc<ExecutableFinder>,
    tool: String,
}

impl Stager {
    pub fn new(runner: Arc<dyn ProcessRunner>, finder: Arc<ExecutableFinder>, tool: String) -> Self {
        Self {
            runner,
            finder,
            tool,
        }
    }

    /// Reject arguments that would run the tool somewhere else.
    fn validate(&self, args: &[String]) -> Result<()> {
        let Some(first) = args.first() else {
            return Err(Error::invalid_argument(format!(
                "The {} command cannot be empty",
                self.tool
            )));
        };
        if *first == self.tool {
            return Err(Error::invalid_argument(format!(
                "The {} command cannot begin with '{}'; pass only its arguments",
                self.tool, self.tool
            )));
        }
        let redirects = args.iter().any(|arg| {
            arg == "--working-dir"
                || arg.starts_with("--working-dir=")
                || (arg.starts_with("-d") && !arg.starts_with("--"))
        });
        if redirects {
            return Err(Error::invalid_argument(format!(
                "The {} command cannot contain the --working-dir (or -d) option",
                self.tool
            )));
        }
        Ok(())
    }

    /// Run `<tool> <args...>` with the staging directory as working
    /// directory. The active directory is never touched.
    ///
    /// A non-zero exit fails the call; whatever the tool already changed in
    /// the staging directory stays there.
    pub fn stage(
        &self,
        args: &[String],
        active_dir: &PathValue,
        staging_dir: &PathValue,
        callback: Option<&mut dyn OutputCallback>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput> {
        self.validate(args)?;

        let ctx = context(active_dir, staging_dir, &PathList::default());
        stages::stager(self.finder.clone(), &self.tool).assert_is_fulfilled(&ctx)?;

        let program = self.finder.find(&self.tool)?;
        let command = ProcessCommand::new(program)
            .args(args)
            .current_dir(ctx.staging_dir());
        info!("Staging in {}: {}", ctx.staging_dir().display(), command);

        self.runner.run_checked(&command, callback, timeout)
    }
}
