//! Per-stage precondition trees
//!
//! Every stage starts with the common set. Beginner, stager and committer
//! add their own leaves after it; the cleaner needs nothing more.

use std::sync::Arc;

use super::checks;
use super::{Composite, Precondition};
use crate::finder::ExecutableFinder;

/// Checks shared by every stage.
pub fn common() -> Composite {
    Composite::new("Common preconditions", "The preconditions for all operations")
        .with(checks::directories_are_different())
        .with(checks::active_dir_exists())
        .with(checks::active_dir_is_writable())
}

pub fn beginner() -> Precondition {
    Composite::new("Beginner preconditions", "The preconditions for beginning the staging process")
        .with(common())
        .with(checks::staging_dir_does_not_exist())
        .into()
}

pub fn stager(finder: Arc<ExecutableFinder>, tool: &str) -> Precondition {
    Composite::new("Stager preconditions", "The preconditions for staging changes")
        .with(common())
        .with(checks::staging_dir_exists())
        .with(checks::staging_dir_is_writable())
        .with(checks::tool_is_available(finder, tool))
        .into()
}

/// The ready marker is checked before readability, so committing without a
/// begin reports the missing marker.
pub fn committer() -> Precondition {
    Composite::new("Committer preconditions", "The preconditions for making staged changes live")
        .with(common())
        .with(checks::staging_dir_is_ready())
        .with(checks::staging_dir_is_readable())
        .into()
}

pub fn cleaner() -> Precondition {
    Composite::new("Cleaner preconditions", "The preconditions for removing the staging directory")
        .with(common())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::precondition::Context;
    use crate::workflow::marker;
    use std::fs;
    use tempfile::TempDir;

    fn names(tree: &Precondition) -> Vec<String> {
        tree.leaves().iter().map(|l| l.name().to_string()).collect()
    }

    #[test]
    fn test_every_stage_starts_with_common_leaves() {
        let finder = Arc::new(ExecutableFinder::new());
        let common: Vec<String> = Precondition::from(common())
            .leaves()
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        assert_eq!(common.len(), 3);

        for tree in [beginner(), stager(finder, "composer"), committer(), cleaner()] {
            assert_eq!(&names(&tree)[..3], &common[..]);
        }
    }

    #[test]
    fn test_stage_specific_leaves() {
        let finder = Arc::new(ExecutableFinder::new());
        assert_eq!(names(&beginner())[3..], ["Staging directory does not exist"]);
        assert_eq!(
            names(&stager(finder, "composer"))[3..],
            [
                "Staging directory exists",
                "Staging directory is writable",
                "composer is available"
            ]
        );
        assert_eq!(
            names(&committer())[3..],
            ["Staging directory is ready", "Staging directory is readable"]
        );
        assert_eq!(names(&cleaner()).len(), 3);
    }

    #[test]
    fn test_committer_without_begin_names_marker() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::new(temp.path(), temp.path().join(".composer_staging"));

        match committer().assert_is_fulfilled(&ctx) {
            Err(Error::Precondition { name, message }) => {
                assert_eq!(name, "Staging directory is ready");
                assert!(message.contains(marker::MARKER_FILENAME));
            }
            other => panic!("expected a precondition error, got {:?}", other),
        }
    }

    #[test]
    fn test_beginner_then_committer_states() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join(".composer_staging");
        let ctx = Context::new(temp.path(), &staging);

        assert!(beginner().is_fulfilled(&ctx));
        assert!(cleaner().is_fulfilled(&ctx));

        fs::create_dir(&staging).unwrap();
        assert!(!beginner().is_fulfilled(&ctx));
        assert!(!committer().is_fulfilled(&ctx));

        marker::write(&staging, temp.path()).unwrap();
        assert!(committer().is_fulfilled(&ctx));
    }

    #[test]
    fn test_common_failure_masks_stage_failures() {
        let temp = TempDir::new().unwrap();
        let ctx = Context::new(temp.path().join("missing"), temp.path().join("stage"));
        let evaluation = committer().evaluate(&ctx);
        assert_eq!(evaluation.name, "Active directory exists");
    }
}
