//! buildprep-cli - orchestration behind the `buildprep` binary.
//!
//! The pipeline module is a library so the full-run semantics (phase
//! ordering, hard-failure gating, report merging) can be integration
//! tested without spawning the binary.

pub mod pipeline;
