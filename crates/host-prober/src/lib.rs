//! host-prober - prerequisite validation for buildprep
//!
//! Runs an ordered list of checks against the host: toolchain presence,
//! header/library availability, and CPU feature flags. Each check is
//! announced before its probe runs, and either passes, records a soft
//! failure (execution continues), or halts the pipeline (hard failure).

pub mod check;
pub mod cpu;
pub mod validator;

// Re-export key types
pub use check::{Check, Probe};
pub use cpu::cpu_supports;
pub use validator::Validator;
