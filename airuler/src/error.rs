//! Compilation error types

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::target::Target;

/// Errors that can occur while loading, parsing, rendering or writing templates
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Invalid target '{name}' (valid targets: {valid})")]
    InvalidTarget { name: String, valid: String },

    #[error("Malformed front matter: {reason}")]
    MalformedFrontMatter { reason: String },

    #[error("Partial not found: {name}")]
    UnresolvedPartial { name: String },

    #[error("Render failed: {0}")]
    Render(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} compilation(s) failed:\n{}", .failures.len(), format_failures(.failures))]
    Failed { failures: Vec<PairFailure> },
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrontMatter { reason: reason.into() }
    }
}

/// A failure attributed to one template (and the target it was compiled for)
///
/// `target` is `None` when the failure is not specific to a target, e.g. a
/// partial whose source does not parse.
#[derive(Debug)]
pub struct PairFailure {
    pub template: String,
    pub target: Option<Target>,
    pub error: CompileError,
}

impl PairFailure {
    pub fn new(template: impl Into<String>, target: Option<Target>, error: CompileError) -> Self {
        Self {
            template: template.into(),
            target,
            error,
        }
    }
}

impl fmt::Display for PairFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(target) => write!(f, "{} [{}]: {}", self.template, target, self.error),
            None => write!(f, "{}: {}", self.template, self.error),
        }
    }
}

fn format_failures(failures: &[PairFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("  - {}", failure))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_target_message() {
        let err = CompileError::InvalidTarget {
            name: "vim".to_string(),
            valid: "cursor, claude".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("'vim'"));
        assert!(msg.contains("cursor, claude"));
    }

    #[test]
    fn test_failed_lists_every_pair() {
        let err = CompileError::Failed {
            failures: vec![
                PairFailure::new(
                    "main",
                    Some(Target::Cursor),
                    CompileError::UnresolvedPartial {
                        name: "partials/header".to_string(),
                    },
                ),
                PairFailure::new("partials/broken", None, CompileError::Render("bad syntax".to_string())),
            ],
        };

        let msg = err.to_string();
        assert!(msg.starts_with("2 compilation(s) failed"));
        assert!(msg.contains("main [cursor]: Partial not found: partials/header"));
        assert!(msg.contains("partials/broken: Render failed: bad syntax"));
    }
}
