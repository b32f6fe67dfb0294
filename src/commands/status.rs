//! # Status Command Implementation
//!
//! Prints every precondition of every stage with a pass/fail mark and its
//! status message. Unlike the stages themselves, status evaluates every
//! leaf, so all problems are visible at once. Read-only; always exits 0
//! once settings load.

use anyhow::Result;
use clap::Args;

use composer_stager::finder::ExecutableFinder;
use composer_stager::output::{emoji, mark};
use composer_stager::sync::rsync::RSYNC;
use composer_stager::sync::SyncStrategy;
use composer_stager::workflow::{context, Stage, Workflow};

use super::{DirArgs, GlobalOptions, Settings, SyncArgs};

/// Show which preconditions hold for each stage
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub dirs: DirArgs,

    /// The mutation tool `stage` would run [default: composer]
    #[arg(long, value_name = "TOOL")]
    pub tool: Option<String>,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, globals: &GlobalOptions) -> Result<()> {
    let settings = Settings::resolve(globals, &args.dirs, &SyncArgs::default(), args.tool.as_deref())?;
    let out = &settings.out;
    let workflow = Workflow::for_host(SyncStrategy::Native)?.with_tool(settings.tool.as_str());
    let ctx = context(&settings.active_dir, &settings.staging_dir, &settings.exclusions);

    println!("{} Active directory:  {}", emoji(out, "📁", "[DIR]"), ctx.active_dir().display());
    println!("{} Staging directory: {}", emoji(out, "📁", "[DIR]"), ctx.staging_dir().display());
    let syncer = match settings.strategy {
        SyncStrategy::Auto if ExecutableFinder::new().is_available(RSYNC) => "rsync".to_string(),
        SyncStrategy::Auto => "native (rsync not found)".to_string(),
        other => other.to_string(),
    };
    println!("{} Syncer: {}", emoji(out, "🔄", "[SYNC]"), syncer);

    for stage in Stage::ALL {
        let tree = workflow.preconditions(stage);
        let ready = tree.is_fulfilled(&ctx);
        println!(
            "\n{} {}: {}",
            mark(out, ready),
            stage.as_str(),
            if ready { "ready" } else { "blocked" }
        );
        for leaf in tree.leaves() {
            let evaluation = leaf.evaluate(&ctx);
            println!(
                "   {} {}: {}",
                mark(out, evaluation.fulfilled),
                leaf.name(),
                evaluation.status_message
            );
        }
    }

    Ok(())
}
