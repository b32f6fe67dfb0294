//! # Clean Command Implementation
//!
//! Removes the staging directory. Succeeds when there is nothing to remove.

use anyhow::Result;
use clap::Args;

use composer_stager::output::emoji;
use composer_stager::workflow::Cleaner;

use super::{DirArgs, GlobalOptions, Settings, SyncArgs};

/// Remove the staging directory
#[derive(Args, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub dirs: DirArgs,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, globals: &GlobalOptions) -> Result<()> {
    let settings = Settings::resolve(globals, &args.dirs, &SyncArgs::default(), None)?;
    let out = &settings.out;
    let staging = settings.staging_dir.resolved();
    let existed = staging.exists();

    Cleaner::new().clean(&settings.active_dir, &settings.staging_dir)?;

    if existed {
        println!(
            "{} Removed staging directory {}",
            emoji(out, "🗑️", "[CLEAN]"),
            staging.display()
        );
    } else {
        println!(
            "{} Nothing to clean at {}",
            emoji(out, "✅", "[OK]"),
            staging.display()
        );
    }
    Ok(())
}
