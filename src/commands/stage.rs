//! # Stage Command Implementation
//!
//! Runs the mutation tool inside the staging directory. Everything after
//! `--` is passed to the tool; its output is streamed to the terminal as it
//! arrives.
//!
//! ```bash
//! composer-stager stage -- require vendor/package:^2.0
//! ```

use anyhow::Result;
use clap::Args;

use composer_stager::output::emoji;
use composer_stager::workflow::Workflow;

use super::{echo_output, DirArgs, GlobalOptions, Settings, SyncArgs};

/// Run a command in the staging directory
#[derive(Args, Debug)]
pub struct StageArgs {
    #[command(flatten)]
    pub dirs: DirArgs,

    /// Give up after this many seconds (0 disables)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// The mutation tool to run [default: composer]
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<String>,

    /// Arguments for the tool, without the tool name itself
    #[arg(last = true, required = true, value_name = "ARGS")]
    pub command: Vec<String>,
}

/// Execute the `stage` command.
pub fn execute(args: StageArgs, globals: &GlobalOptions) -> Result<()> {
    let sync = SyncArgs {
        timeout: args.timeout,
        ..SyncArgs::default()
    };
    let settings = Settings::resolve(globals, &args.dirs, &sync, args.tool.as_deref())?;
    let out = &settings.out;

    // Staging never syncs, so skip probing for rsync
    let workflow = Workflow::for_host(composer_stager::sync::SyncStrategy::Native)?
        .with_tool(settings.tool.as_str());

    println!(
        "{} Staging in {}: {} {}",
        emoji(out, "🔧", "[STAGE]"),
        settings.staging_dir.resolved().display(),
        settings.tool,
        args.command.join(" ")
    );

    let mut echo = echo_output();
    workflow.stager().stage(
        &args.command,
        &settings.active_dir,
        &settings.staging_dir,
        Some(&mut echo),
        settings.timeout,
    )?;

    println!("{} Changes staged", emoji(out, "✅", "[OK]"));
    Ok(())
}
