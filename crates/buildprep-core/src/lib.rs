//! buildprep-core - shared data model for the buildprep pipeline
//!
//! This crate provides the pieces every phase of the pipeline depends on:
//! - Failure taxonomy (`Outcome`, `Failure`, `Severity`)
//! - The `Report` accumulator that replaces ad-hoc global error state
//! - Typed errors (`PrepError`)
//! - TOML configuration (`PrepConfig` from `prep.toml`)
//! - Manifest digesting for regenerability checks

pub mod config;
pub mod digest;
pub mod error;
pub mod outcome;
pub mod report;
pub mod telemetry;

// Re-export key types
pub use config::{BuildConfig, CheckConfig, GroupConfig, PrepConfig, ProbeConfig, VendorConfig};
pub use digest::manifest_digest;
pub use error::{PrepError, Result};
pub use outcome::{Failure, Outcome, Severity};
pub use report::{PhaseRun, Report};
pub use telemetry::init_tracing;
