//! Path values and exclusion lists
//!
//! [`PathValue`] is the immutable location type the workflow passes around:
//! the raw string the user typed plus the base it resolves against.
//! [`PathList`] is the ordered exclusion list, and [`ExclusionMatcher`] is its
//! compiled, root-relative form used by the file syncers.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use log::debug;

use crate::error::Result;

/// An immutable filesystem location, absolute or relative to a base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathValue {
    raw: String,
    base: Option<PathBuf>,
}

impl PathValue {
    /// Create a path that resolves against the process working directory.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            base: None,
        }
    }

    /// Create a path that resolves against `base` instead of the working directory.
    pub fn with_base(raw: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self {
            raw: raw.into(),
            base: Some(base.into()),
        }
    }

    /// The path exactly as given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_absolute(&self) -> bool {
        Path::new(&self.raw).is_absolute()
    }

    /// The absolute, lexically normalized form of this path.
    ///
    /// Symlinks are not resolved and the path does not need to exist.
    pub fn resolved(&self) -> PathBuf {
        match &self.base {
            Some(base) => self.resolved_relative_to(base),
            None => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
                self.resolved_relative_to(&cwd)
            }
        }
    }

    /// The absolute form of this path, resolving a relative path against `base`.
    pub fn resolved_relative_to(&self, base: &Path) -> PathBuf {
        let raw = Path::new(&self.raw);
        if raw.is_absolute() {
            normalize(raw)
        } else {
            normalize(&base.join(raw))
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&Path> for PathValue {
    fn from(path: &Path) -> Self {
        PathValue::new(path.to_string_lossy().into_owned())
    }
}

/// Lexically normalize a path: drop `.` segments and fold `..` into its parent.
///
/// A `..` that would climb above the start of a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// If `path` lies strictly beneath `root`, return its root-relative form.
pub fn nested_relative(path: &Path, root: &Path) -> Option<PathBuf> {
    let path = normalize(path);
    let root = normalize(root);
    match path.strip_prefix(&root) {
        Ok(relative) if !relative.as_os_str().is_empty() => Some(relative.to_path_buf()),
        _ => None,
    }
}

/// An ordered list of raw exclusion patterns.
///
/// Duplicates are kept in the list but have no effect on matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathList {
    paths: Vec<String>,
}

impl PathList {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Append any number of patterns, keeping insertion order.
    pub fn add<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
    }

    pub fn get_all(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Compile the list against a sync root.
    pub fn matcher(&self, root: &Path) -> Result<ExclusionMatcher> {
        ExclusionMatcher::new(self, root)
    }
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Turn a raw pattern into its root-relative form, or `None` when it cannot
/// refer to anything beneath one of `roots`.
fn relative_pattern(raw: &str, roots: &[&Path]) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let candidate = Path::new(trimmed);
    let relative = if candidate.is_absolute() {
        let absolute = normalize(candidate);
        match roots
            .iter()
            .find_map(|root| absolute.strip_prefix(normalize(root)).ok())
        {
            Some(rel) => rel.to_path_buf(),
            None => {
                debug!("Ignoring exclusion outside of the sync roots: {}", raw);
                return None;
            }
        }
    } else {
        normalize(candidate)
    };

    if relative.as_os_str().is_empty() {
        debug!("Ignoring exclusion that names the sync root itself: {}", raw);
        return None;
    }
    if relative.starts_with("..") {
        debug!("Ignoring exclusion that escapes the sync root: {}", raw);
        return None;
    }

    Some(to_slash(&relative))
}

/// Render a relative path with `/` separators on every platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A compiled exclusion list, relative to one sync root.
#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    patterns: Vec<String>,
    literals: Vec<PathBuf>,
    globs: Vec<Pattern>,
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl ExclusionMatcher {
    pub fn new(list: &PathList, root: &Path) -> Result<Self> {
        Self::with_roots(list, &[root])
    }

    /// Compile `list` for a pass between several roots (source and
    /// destination); absolute patterns may live under any of them.
    pub fn with_roots(list: &PathList, roots: &[&Path]) -> Result<Self> {
        let mut matcher = Self::default();
        for raw in list.get_all() {
            let Some(pattern) = relative_pattern(raw, roots) else {
                continue;
            };
            if matcher.patterns.contains(&pattern) {
                continue;
            }
            if has_glob_meta(&pattern) {
                matcher.globs.push(Pattern::new(&pattern)?);
            } else {
                matcher.literals.push(PathBuf::from(&pattern));
            }
            matcher.patterns.push(pattern);
        }
        Ok(matcher)
    }

    /// The normalized, root-relative patterns, deduplicated, in insertion order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `relative` (a path relative to the sync root) is excluded,
    /// either directly or because one of its ancestors is.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        if relative.as_os_str().is_empty() {
            return false;
        }
        if self.literals.iter().any(|lit| relative.starts_with(lit)) {
            return true;
        }
        if self.globs.is_empty() {
            return false;
        }
        relative
            .ancestors()
            .filter(|a| !a.as_os_str().is_empty())
            .any(|ancestor| {
                let slashed = to_slash(ancestor);
                self.globs
                    .iter()
                    .any(|g| g.matches_with(&slashed, GLOB_OPTIONS))
            })
    }
}
