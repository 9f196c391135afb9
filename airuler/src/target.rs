//! Target registry
//!
//! The closed set of assistant tools a template can be compiled for. Each
//! target owns an output subdirectory and a file extension; the rendering
//! context only ever sees the target's name.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompileError;

/// An assistant tool that consumes compiled rule files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Cursor,
    Claude,
    Cline,
    Copilot,
    Roo,
}

impl Target {
    /// Every known target, in registry order
    pub const ALL: [Target; 5] = [
        Target::Cursor,
        Target::Claude,
        Target::Cline,
        Target::Copilot,
        Target::Roo,
    ];

    /// Identifier used on the command line and in templates
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Claude => "claude",
            Self::Cline => "cline",
            Self::Copilot => "copilot",
            Self::Roo => "roo",
        }
    }

    /// Subdirectory of the output root holding this target's files
    pub fn output_dir(&self) -> &'static str {
        self.name()
    }

    /// File extension (without the leading dot) of compiled files
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Cursor => "mdc",
            Self::Claude | Self::Cline | Self::Roo => "md",
            Self::Copilot => "instructions.md",
        }
    }

    /// Output file for a template compiled for this target
    ///
    /// `template_name` is a slash-separated logical name; nested segments
    /// become nested directories, e.g. `subdir/nested` compiled for cursor
    /// lands at `<output_root>/cursor/subdir/nested.mdc`.
    pub fn output_path(&self, output_root: &Path, template_name: &str) -> PathBuf {
        let mut path = output_root.join(self.output_dir());
        let mut segments = template_name.split('/').filter(|s| !s.is_empty()).peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{}.{}", segment, self.extension()));
            }
        }
        path
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Target {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|target| target.name() == s)
            .ok_or_else(|| CompileError::InvalidTarget {
                name: s.to_string(),
                valid: target_names().join(", "),
            })
    }
}

/// Check a candidate name against the registry (exact, case-sensitive)
pub fn is_valid_target(name: &str) -> bool {
    Target::ALL.iter().any(|target| target.name() == name)
}

/// Names of all known targets, for help and usage text
pub fn target_names() -> Vec<&'static str> {
    Target::ALL.iter().map(Target::name).collect()
}

/// Validate requested target names, dropping duplicates but keeping order
///
/// Fails on the first unknown name.
pub fn parse_targets<S: AsRef<str>>(names: &[S]) -> Result<Vec<Target>, CompileError> {
    debug!(count = names.len(), "parse_targets: called");
    let mut targets = Vec::with_capacity(names.len());
    for name in names {
        let target: Target = name.as_ref().parse()?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}
