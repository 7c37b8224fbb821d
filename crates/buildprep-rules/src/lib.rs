//! buildprep-rules - dependency-aware manifest generation
//!
//! Walks the configured source groups, runs the compiler's dependency
//! scan (`-MM`) once per source file, rewrites each rule's target into
//! the private output directory, appends an explicit compile recipe,
//! and finally merges the per-file rule files into one manifest.

pub mod enumerate;
pub mod generator;
pub mod merge;
pub mod rule;

// Re-export key types
pub use enumerate::{collect_sources, generate_all, generate_group};
pub use generator::RuleGenerator;
pub use merge::merge_rules;
pub use rule::DepRule;
