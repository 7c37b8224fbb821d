//! Sequential check execution with the announce-then-result protocol.

use crate::check::Check;
use buildprep_core::{Outcome, PhaseRun, Report};
use std::io::Write;
use tracing::info;

/// Runs an ordered list of checks.
pub struct Validator;

impl Validator {
    /// Execute every check in order.
    ///
    /// Each check's label is printed before its probe runs, so a hung
    /// probe is visible as a label with no trailing result. The result
    /// (`ok` / `error` / `fatal error`) lands on the same line. A hard
    /// failure stops evaluation immediately; the remaining checks are
    /// never probed.
    pub fn run(checks: &[Check]) -> PhaseRun {
        let mut report = Report::new();

        for check in checks {
            print!("checking {}... ", check.label);
            std::io::stdout().flush().ok();

            let outcome = check.evaluate();
            match &outcome {
                Outcome::Ok => {
                    println!("ok");
                    info!(check = %check.label, "check passed");
                }
                Outcome::Soft(failure) => {
                    println!("error");
                    report.record(failure.clone());
                }
                Outcome::Hard(failure) => {
                    println!("fatal error");
                    return PhaseRun::halted(report, failure.clone());
                }
            }
        }

        PhaseRun::from_report(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Probe;
    use buildprep_core::Severity;

    fn command_check(label: &str, program: &str, severity: Severity) -> Check {
        Check {
            label: label.to_string(),
            probe: Probe::CommandOk {
                program: program.to_string(),
                args: vec![],
            },
            cause: format!("{label} failed"),
            severity,
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let checks = vec![
            command_check("one", "true", Severity::Soft),
            command_check("two", "true", Severity::Hard),
        ];
        let run = Validator::run(&checks);
        assert!(!run.is_halted());
        assert!(run.report.is_clean());
    }

    #[test]
    fn test_soft_failure_continues() {
        let checks = vec![
            command_check("doomed", "false", Severity::Soft),
            command_check("fine", "true", Severity::Soft),
        ];
        let run = Validator::run(&checks);
        assert!(!run.is_halted());
        assert_eq!(run.report.failures().len(), 1);
        assert_eq!(run.report.failures()[0].cause, "doomed failed");
    }

    #[test]
    fn test_hard_failure_halts_remaining_checks() {
        let checks = vec![
            command_check("soft-miss", "false", Severity::Soft),
            command_check("fatal", "false", Severity::Hard),
            // Would pass, but must never be reached.
            command_check("later", "true", Severity::Soft),
        ];
        let run = Validator::run(&checks);
        assert!(run.is_halted());
        assert_eq!(run.hard_stop.as_ref().unwrap().cause, "fatal failed");
        // Both the soft and the hard failure are in the report.
        assert_eq!(run.report.failures().len(), 2);
    }

    #[test]
    fn test_missing_cpu_feature_is_soft() {
        let checks = vec![Check {
            label: "imaginary feature".to_string(),
            probe: Probe::CpuFeature("not-a-real-cpu-flag".to_string()),
            cause: "CPU does not support not-a-real-cpu-flag".to_string(),
            severity: Severity::Soft,
        }];
        let run = Validator::run(&checks);
        assert!(!run.is_halted(), "absent CPU feature must not abort");
        assert_eq!(run.report.failures().len(), 1);
        assert!(run.report.failures()[0].cause.contains("does not support"));
    }
}
