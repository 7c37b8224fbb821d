//! Pipeline failure report.
//!
//! Each phase of the pipeline returns its own [`Report`]; the top-level
//! orchestrator merges them and renders one final summary. This replaces
//! a process-global error accumulator with an explicit value, so phases
//! can be tested in isolation.

use crate::outcome::{Failure, Outcome};
use serde::Serialize;

/// Ordered collection of failures recorded during a run.
///
/// Failures are stored in the order they occurred and rendered
/// most-recent-first, matching the report contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    failures: Vec<Failure>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn record(&mut self, failure: Failure) {
        tracing::warn!(cause = %failure.cause, "failure recorded");
        self.failures.push(failure);
    }

    /// Record a soft or hard outcome; `Outcome::Ok` is a no-op.
    pub fn record_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Ok => {}
            Outcome::Soft(failure) | Outcome::Hard(failure) => self.record(failure.clone()),
        }
    }

    /// Fold another phase's report into this one, preserving order.
    pub fn merge(&mut self, other: Report) {
        self.failures.extend(other.failures);
    }

    /// Whether no failure has been recorded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Recorded failures, oldest first.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Process exit code: 0 only if no failure occurred.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }

    /// Render the final human-readable report.
    ///
    /// Lists causes most-recent-first under a banner, followed by an
    /// overall failure marker; a clean report renders as a success line.
    pub fn render(&self) -> String {
        if self.is_clean() {
            return "build preparation completed successfully".to_string();
        }

        let mut out = String::new();
        out.push_str("The following errors occurred (most recent first):\n");
        for failure in self.failures.iter().rev() {
            out.push_str(&format!("  - {}\n", failure));
        }
        out.push_str("BUILD PREPARATION FAILED");
        out
    }
}

/// Result of one pipeline phase.
///
/// The phase's failures are all inside `report` (a hard failure is
/// recorded there too, so the final render shows it); `hard_stop` tells
/// the orchestrator that nothing further may run. Keeping the
/// continue-vs-abort decision out of the phases and in the orchestrator
/// is deliberate.
#[derive(Debug, Clone, Default)]
pub struct PhaseRun {
    /// Failures recorded during the phase.
    pub report: Report,

    /// Set when the phase hit a hard failure.
    pub hard_stop: Option<Failure>,
}

impl PhaseRun {
    /// A phase that recorded the given failures and may continue.
    pub fn from_report(report: Report) -> Self {
        Self {
            report,
            hard_stop: None,
        }
    }

    /// A phase that hit a hard failure; the failure is also recorded.
    pub fn halted(mut report: Report, failure: Failure) -> Self {
        report.record(failure.clone());
        Self {
            report,
            hard_stop: Some(failure),
        }
    }

    /// Whether the pipeline must abort after this phase.
    pub fn is_halted(&self) -> bool {
        self.hard_stop.is_some()
    }
}
