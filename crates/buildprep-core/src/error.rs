//! Error types for the buildprep pipeline.
//!
//! Soft failures are *values* ([`crate::Failure`] inside a
//! [`crate::Report`]); only failures that must stop the pipeline
//! propagate as `Err(PrepError)`.

use crate::outcome::Failure;
use thiserror::Error;

/// Result type for buildprep operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Errors that stop the current operation.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Underlying IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The dependency scanner emitted output that is not a makefile rule.
    #[error("malformed dependency rule: {0}")]
    MalformedRule(String),

    /// An external tool could not be spawned.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// The tool that could not be started.
        tool: String,
        /// The spawn error.
        source: std::io::Error,
    },

    /// A hard failure: the pipeline must abort with a non-zero status.
    #[error("fatal error: {}", .0.cause)]
    Hard(Failure),
}

impl PrepError {
    /// Wrap a spawn error with the tool name.
    pub fn spawn(tool: impl Into<String>, source: std::io::Error) -> Self {
        PrepError::Spawn {
            tool: tool.into(),
            source,
        }
    }

    /// The failure carried by a hard error, if this is one.
    pub fn hard_failure(&self) -> Option<&Failure> {
        match self {
            PrepError::Hard(f) => Some(f),
            _ => None,
        }
    }
}
