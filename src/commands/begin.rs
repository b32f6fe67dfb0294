//! # Begin Command Implementation
//!
//! Copies the active directory into a fresh staging directory. Refuses to
//! run when the staging directory already exists; run `clean` first.

use anyhow::Result;
use clap::Args;

use composer_stager::output::emoji;
use composer_stager::process::OutputKind;
use composer_stager::workflow::Workflow;

use super::{DirArgs, GlobalOptions, Settings, SyncArgs};

/// Begin the staging process
#[derive(Args, Debug)]
pub struct BeginArgs {
    #[command(flatten)]
    pub dirs: DirArgs,

    #[command(flatten)]
    pub sync: SyncArgs,

    /// Print every mirrored path
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the `begin` command.
pub fn execute(args: BeginArgs, globals: &GlobalOptions) -> Result<()> {
    let settings = Settings::resolve(globals, &args.dirs, &args.sync, None)?;
    let out = &settings.out;
    let workflow = Workflow::for_host(settings.strategy)?;

    println!(
        "{} Beginning: {} -> {} ({} syncer)",
        emoji(out, "📦", "[BEGIN]"),
        settings.active_dir.resolved().display(),
        settings.staging_dir.resolved().display(),
        workflow.syncer().name()
    );

    let spinner = out.spinner("Copying the active directory", args.verbose);
    let verbose = args.verbose;
    let mut progress = |kind: OutputKind, line: &str| {
        if verbose && kind == OutputKind::Stdout {
            println!("  {}", line);
        } else {
            spinner.tick();
        }
    };

    let result = workflow.beginner().begin(
        &settings.active_dir,
        &settings.staging_dir,
        &settings.exclusions,
        Some(&mut progress),
        settings.timeout,
    );
    spinner.finish_and_clear();
    result?;

    println!("{} Staging directory is ready", emoji(out, "✅", "[OK]"));
    println!(
        "{} Next: composer-stager stage -- <args>, then composer-stager commit",
        emoji(out, "💡", "[TIP]")
    );
    Ok(())
}
