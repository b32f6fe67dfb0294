//! # Precondition Tree
//!
//! Every workflow stage is gated by a tree of boolean checks. A
//! [`Precondition`] is either a [`Leaf`], which checks one concrete condition
//! against the directory pair, or a [`Composite`], an ordered list of child
//! preconditions.
//!
//! ## Evaluation
//!
//! A composite is fulfilled iff every child is fulfilled. Children are
//! evaluated in list order and evaluation stops at the first failure, so the
//! status reported for a composite is the status of the first unfulfilled
//! leaf found depth-first, left to right.
//!
//! ## Ownership
//!
//! Children are owned by their parent, so the structure is a strict tree:
//! there are no cycles and no leaf is shared between two parents.
//!
//! ## Key Components
//!
//! - **[`Context`]**: the directory pair and exclusions a tree is evaluated
//!   against.
//! - **[`checks`]**: the concrete leaves.
//! - **[`stages`]**: the per-stage composites (common, beginner, stager,
//!   committer, cleaner).

pub mod checks;
pub mod stages;

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::path::PathList;

/// What a precondition tree is evaluated against.
#[derive(Debug, Clone)]
pub struct Context {
    pub active_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub exclusions: PathList,
}

impl Context {
    pub fn new(active_dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            active_dir: active_dir.into(),
            staging_dir: staging_dir.into(),
            exclusions: PathList::default(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: PathList) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn active_dir(&self) -> &Path {
        &self.active_dir
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }
}

/// A leaf's check: `Ok(())` when fulfilled, otherwise the reason it is not.
pub type Check = Box<dyn Fn(&Context) -> std::result::Result<(), String> + Send + Sync>;

/// One concrete condition.
pub struct Leaf {
    name: String,
    description: String,
    fulfilled_message: String,
    check: Check,
}

impl Leaf {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        fulfilled_message: impl Into<String>,
        check: F,
    ) -> Self
    where
        F: Fn(&Context) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            fulfilled_message: fulfilled_message.into(),
            check: Box::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluate this leaf on its own.
    pub fn evaluate(&self, ctx: &Context) -> Evaluation {
        match (self.check)(ctx) {
            Ok(()) => Evaluation {
                fulfilled: true,
                name: self.name.clone(),
                status_message: self.fulfilled_message.clone(),
            },
            Err(message) => Evaluation {
                fulfilled: false,
                name: self.name.clone(),
                status_message: message,
            },
        }
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf").field("name", &self.name).finish()
    }
}

/// An ordered grouping of preconditions.
#[derive(Debug)]
pub struct Composite {
    name: String,
    description: String,
    children: Vec<Precondition>,
}

impl Composite {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            children: Vec::new(),
        }
    }

    /// Append a child, builder style.
    pub fn with(mut self, child: impl Into<Precondition>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(&self) -> &[Precondition] {
        &self.children
    }
}

/// A node in a precondition tree.
#[derive(Debug)]
pub enum Precondition {
    Leaf(Leaf),
    Composite(Composite),
}

impl From<Leaf> for Precondition {
    fn from(leaf: Leaf) -> Self {
        Precondition::Leaf(leaf)
    }
}

impl From<Composite> for Precondition {
    fn from(composite: Composite) -> Self {
        Precondition::Composite(composite)
    }
}

/// The outcome of evaluating a precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub fulfilled: bool,
    /// Name of the deciding node: the first unfulfilled leaf on failure
    pub name: String,
    pub status_message: String,
}

impl Precondition {
    pub fn name(&self) -> &str {
        match self {
            Precondition::Leaf(leaf) => &leaf.name,
            Precondition::Composite(composite) => &composite.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Precondition::Leaf(leaf) => &leaf.description,
            Precondition::Composite(composite) => &composite.description,
        }
    }

    /// Evaluate the tree, stopping at the first unfulfilled leaf.
    pub fn evaluate(&self, ctx: &Context) -> Evaluation {
        match self {
            Precondition::Leaf(leaf) => leaf.evaluate(ctx),
            Precondition::Composite(composite) => {
                for child in &composite.children {
                    let evaluation = child.evaluate(ctx);
                    if !evaluation.fulfilled {
                        return evaluation;
                    }
                }
                Evaluation {
                    fulfilled: true,
                    name: composite.name.clone(),
                    status_message: format!("{} are fulfilled", composite.description),
                }
            }
        }
    }

    pub fn is_fulfilled(&self, ctx: &Context) -> bool {
        self.evaluate(ctx).fulfilled
    }

    pub fn status_message(&self, ctx: &Context) -> String {
        self.evaluate(ctx).status_message
    }

    /// Fail with [`Error::Precondition`] carrying the first unfulfilled
    /// leaf's name and status message.
    pub fn assert_is_fulfilled(&self, ctx: &Context) -> Result<()> {
        let evaluation = self.evaluate(ctx);
        if evaluation.fulfilled {
            debug!("Preconditions fulfilled: {}", self.name());
            Ok(())
        } else {
            debug!(
                "Precondition '{}' unfulfilled: {}",
                evaluation.name, evaluation.status_message
            );
            Err(Error::Precondition {
                name: evaluation.name,
                message: evaluation.status_message,
            })
        }
    }

    /// Every leaf in the tree, depth-first in source order.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            Precondition::Leaf(leaf) => out.push(leaf),
            Precondition::Composite(composite) => {
                for child in &composite.children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}
