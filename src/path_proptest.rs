//! Property-based tests for path normalization and exclusion matching.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{normalize, PathList, PathValue};
    use proptest::prelude::*;
    use std::path::{Component, Path, PathBuf};

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9_]{1,8}"
    }

    fn messy_segment() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => segment(),
            1 => Just(".".to_string()),
            1 => Just("..".to_string()),
        ]
    }

    // ============================================================================
    // normalize property tests
    // ============================================================================

    proptest! {
        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(parts in prop::collection::vec(messy_segment(), 0..8)) {
            let raw = format!("/{}", parts.join("/"));
            let once = normalize(Path::new(&raw));
            let twice = normalize(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: an absolute normalized path never contains `.` or `..`
        #[test]
        fn normalize_absolute_has_no_dot_segments(parts in prop::collection::vec(messy_segment(), 0..8)) {
            let raw = format!("/{}", parts.join("/"));
            let normalized = normalize(Path::new(&raw));
            prop_assert!(normalized.is_absolute());
            for component in normalized.components() {
                prop_assert!(
                    !matches!(component, Component::CurDir | Component::ParentDir),
                    "'{}' normalized to '{}'",
                    raw,
                    normalized.display()
                );
            }
        }

        /// Property: a relative path without `..` resolves beneath its base
        #[test]
        fn resolved_stays_beneath_base(parts in prop::collection::vec(segment(), 1..6)) {
            let value = PathValue::with_base(parts.join("/"), "/base");
            let resolved = value.resolved();
            prop_assert!(resolved.starts_with("/base"));
            prop_assert_eq!(resolved, PathBuf::from("/base").join(parts.join("/")));
        }
    }

    // ============================================================================
    // exclusion matching property tests
    // ============================================================================

    proptest! {
        /// Property: a literal exclusion covers everything beneath it
        #[test]
        fn literal_exclusion_covers_descendants(
            excluded in prop::collection::vec(segment(), 1..4),
            below in prop::collection::vec(segment(), 0..4),
        ) {
            let pattern = excluded.join("/");
            let matcher = PathList::new([pattern.clone()]).matcher(Path::new("/root")).unwrap();

            let mut candidate = PathBuf::from(&pattern);
            for part in &below {
                candidate.push(part);
            }
            prop_assert!(matcher.is_excluded(&candidate));
        }

        /// Property: a path whose first component differs is never excluded
        #[test]
        fn literal_exclusion_does_not_leak_to_siblings(
            excluded in prop::collection::vec(segment(), 1..4),
            other in prop::collection::vec(segment(), 1..4),
        ) {
            prop_assume!(excluded[0] != other[0]);
            let matcher = PathList::new([excluded.join("/")]).matcher(Path::new("/root")).unwrap();
            prop_assert!(!matcher.is_excluded(Path::new(&other.join("/"))));
        }

        /// Property: duplicates never change the compiled pattern set
        #[test]
        fn duplicates_are_harmless(pattern in segment(), copies in 1usize..5) {
            let list = PathList::new(std::iter::repeat(pattern.clone()).take(copies));
            let matcher = list.matcher(Path::new("/root")).unwrap();
            prop_assert_eq!(matcher.patterns().len(), 1);
        }
    }
}
