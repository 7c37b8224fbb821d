//! Structured makefile dependency rules.
//!
//! The dependency scanner (`compiler -MM`) emits one rule per source
//! file, possibly wrapped over several lines with backslash
//! continuations. Parsing the rule into a value and rewriting the
//! target field structurally avoids the classic string-substitution
//! trap where a prerequisite path happens to contain the target text.

use buildprep_core::{PrepError, Result};
use std::path::Path;

/// One parsed dependency rule: a target and its prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepRule {
    /// Object file the rule builds.
    pub target: String,

    /// Source and header files the target depends on.
    pub prereqs: Vec<String>,
}

impl DepRule {
    /// Parse scanner output into a rule.
    ///
    /// Backslash continuations are joined first, so the rule is one
    /// logical `target: prereq...` line regardless of how the scanner
    /// wrapped it.
    pub fn parse(output: &str) -> Result<Self> {
        let joined = output.replace("\\\r\n", " ").replace("\\\n", " ");
        let line = joined
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| PrepError::MalformedRule("scanner produced no output".to_string()))?;

        let (target, prereqs) = line
            .split_once(':')
            .ok_or_else(|| PrepError::MalformedRule(format!("no target separator in {line:?}")))?;

        let target = target.trim();
        if target.is_empty() {
            return Err(PrepError::MalformedRule(format!(
                "empty target in {line:?}"
            )));
        }

        Ok(Self {
            target: target.to_string(),
            prereqs: prereqs.split_whitespace().map(str::to_string).collect(),
        })
    }

    /// Point the target at `<out_dir>/<object>`, leaving prerequisites
    /// untouched.
    pub fn relocate(&mut self, out_dir: &Path, object: &str) {
        self.target = out_dir.join(object).to_string_lossy().into_owned();
    }

    /// Render the rule as a single normalized makefile line.
    pub fn render(&self) -> String {
        format!("{}: {}\n", self.target, self.prereqs.join(" "))
    }
}
