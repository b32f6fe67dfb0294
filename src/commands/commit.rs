//! # Commit Command Implementation
//!
//! Mirrors the staging directory back onto the active directory. This is
//! the only command that writes to the live tree, so it asks for
//! confirmation unless `--yes` is given. The prompt only appears once the
//! commit preconditions hold. Declining is the last point at which the
//! update can be abandoned without touching the live tree.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use composer_stager::output::emoji;
use composer_stager::process::OutputKind;
use composer_stager::workflow::{context, Stage, Workflow};

use super::{DirArgs, GlobalOptions, Settings, SyncArgs};

/// Make the staged changes live
#[derive(Args, Debug)]
pub struct CommitArgs {
    #[command(flatten)]
    pub dirs: DirArgs,

    #[command(flatten)]
    pub sync: SyncArgs,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print every mirrored path
    #[arg(short, long)]
    pub verbose: bool,
}

/// Execute the `commit` command.
pub fn execute(args: CommitArgs, globals: &GlobalOptions) -> Result<()> {
    let settings = Settings::resolve(globals, &args.dirs, &args.sync, None)?;
    let out = &settings.out;
    let active = settings.active_dir.resolved();

    // Fail before prompting when there is nothing committable
    let workflow = Workflow::for_host(settings.strategy)?;
    let ctx = context(&settings.active_dir, &settings.staging_dir, &settings.exclusions);
    workflow.preconditions(Stage::Commit).assert_is_fulfilled(&ctx)?;

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Make the staged changes live in {}?", active.display()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Commit cancelled. The active directory was not modified.");
            return Ok(());
        }
    }

    println!(
        "{} Committing: {} -> {} ({} syncer)",
        emoji(out, "🚀", "[COMMIT]"),
        settings.staging_dir.resolved().display(),
        active.display(),
        workflow.syncer().name()
    );

    let spinner = out.spinner("Syncing staged changes", args.verbose);
    let verbose = args.verbose;
    let mut progress = |kind: OutputKind, line: &str| {
        if verbose && kind == OutputKind::Stdout {
            println!("  {}", line);
        } else {
            spinner.tick();
        }
    };

    let result = workflow.committer().commit(
        &settings.staging_dir,
        &settings.active_dir,
        &settings.exclusions,
        Some(&mut progress),
        settings.timeout,
    );
    spinner.finish_and_clear();
    result?;

    println!("{} Changes are live", emoji(out, "✅", "[OK]"));
    println!(
        "{} Run composer-stager clean to remove the staging directory",
        emoji(out, "💡", "[TIP]")
    );
    Ok(())
}
