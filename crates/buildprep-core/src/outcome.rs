//! Failure taxonomy shared by every pipeline phase.
//!
//! A failed step produces a [`Failure`] value carrying a human-readable
//! cause and, where an external tool was involved, the path to the log
//! file holding its diagnostics. Whether a failure stops the pipeline is
//! expressed by [`Severity`] / [`Outcome`] and decided in one place (the
//! report absorbing it), never at the call site that noticed the problem.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How a failed check or step affects the rest of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Recorded and reported at the end; execution continues.
    Soft,
    /// Aborts the whole pipeline immediately.
    Hard,
}

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Human-readable cause.
    pub cause: String,

    /// Diagnostic log file produced by the failing external tool, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<PathBuf>,
}

impl Failure {
    /// Create a failure with a cause only.
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            log: None,
        }
    }

    /// Create a failure referencing a diagnostic log file.
    pub fn with_log(cause: impl Into<String>, log: impl AsRef<Path>) -> Self {
        Self {
            cause: cause.into(),
            log: Some(log.as_ref().to_path_buf()),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.log {
            Some(log) => write!(f, "{} (see {})", self.cause, log.display()),
            None => write!(f, "{}", self.cause),
        }
    }
}

/// Result of evaluating one check or pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The step succeeded.
    Ok,
    /// The step failed; record and continue.
    Soft(Failure),
    /// The step failed; abort the pipeline.
    Hard(Failure),
}

impl Outcome {
    /// Whether the step succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    /// Build an outcome from a failure and its configured severity.
    pub fn from_failure(failure: Failure, severity: Severity) -> Self {
        match severity {
            Severity::Soft => Outcome::Soft(failure),
            Severity::Hard => Outcome::Hard(failure),
        }
    }
}
