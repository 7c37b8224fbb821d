//! Prerequisite checks and their probes.

use crate::cpu;
use buildprep_core::{CheckConfig, Failure, Outcome, ProbeConfig, Severity};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// A probe that decides whether one prerequisite is satisfied.
///
/// Probes are judged by success/failure only; their native output is
/// always suppressed.
#[derive(Debug, Clone)]
pub enum Probe {
    /// Run a command; pass iff it exits zero.
    CommandOk {
        /// Program to run.
        program: String,
        /// Arguments.
        args: Vec<String>,
    },

    /// Pass iff the CPU advertises the feature flag.
    CpuFeature(String),

    /// Pass iff the path exists.
    PathExists(PathBuf),

    /// Pass iff an empty program links against `-l<lib>`.
    LibraryLinks {
        /// Library name without the `lib` prefix.
        lib: String,
        /// Compiler used for the link probe.
        compiler: String,
    },
}

impl Probe {
    /// Evaluate the probe.
    pub fn passes(&self) -> bool {
        match self {
            Probe::CommandOk { program, args } => command_succeeds(program, args),
            Probe::CpuFeature(flag) => cpu::cpu_supports(flag),
            Probe::PathExists(path) => path.exists(),
            Probe::LibraryLinks { lib, compiler } => library_links(compiler, lib),
        }
    }
}

/// One unit of validation: announced label, probe, recorded cause and
/// severity. Evaluated exactly once.
#[derive(Debug, Clone)]
pub struct Check {
    /// Label announced before the probe runs.
    pub label: String,

    /// The probe to evaluate.
    pub probe: Probe,

    /// Cause recorded on failure.
    pub cause: String,

    /// Soft failures continue; hard failures abort the pipeline.
    pub severity: Severity,
}

impl Check {
    /// Build a runtime check from its configuration.
    ///
    /// The compiler binary is needed for link probes, which the config
    /// does not repeat per check.
    pub fn from_config(config: &CheckConfig, compiler: &str) -> Self {
        let probe = match &config.probe {
            ProbeConfig::Command { program, args } => Probe::CommandOk {
                program: program.clone(),
                args: args.clone(),
            },
            ProbeConfig::CpuFeature { flag } => Probe::CpuFeature(flag.clone()),
            ProbeConfig::PathExists { path } => Probe::PathExists(path.clone()),
            ProbeConfig::LibraryLinks { lib } => Probe::LibraryLinks {
                lib: lib.clone(),
                compiler: compiler.to_string(),
            },
        };
        Self {
            label: config.label.clone(),
            probe,
            cause: config.cause.clone(),
            severity: config.severity,
        }
    }

    /// Evaluate the check once.
    pub fn evaluate(&self) -> Outcome {
        if self.probe.passes() {
            Outcome::Ok
        } else {
            Outcome::from_failure(Failure::new(self.cause.clone()), self.severity)
        }
    }
}

/// Run a command with all output suppressed; pass iff exit status zero.
fn command_succeeds(program: &str, args: &[String]) -> bool {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(s) => s.success(),
        Err(e) => {
            debug!(program = %program, error = %e, "probe command could not run");
            false
        }
    }
}

/// Compile and link an empty program against `-l<lib>`, output discarded.
fn library_links(compiler: &str, lib: &str) -> bool {
    let child = Command::new(compiler)
        .args(["-x", "c++", "-", &format!("-l{lib}"), "-o", "/dev/null"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match child {
        Ok(c) => c,
        Err(e) => {
            debug!(compiler = %compiler, error = %e, "link probe could not spawn compiler");
            return false;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(b"int main() { return 0; }\n");
    }

    child.wait().map(|s| s.success()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_command_probe_passes_on_zero_exit() {
        let probe = Probe::CommandOk {
            program: "true".to_string(),
            args: vec![],
        };
        assert!(probe.passes());
    }

    #[test]
    fn test_command_probe_fails_on_nonzero_exit() {
        let probe = Probe::CommandOk {
            program: "false".to_string(),
            args: vec![],
        };
        assert!(!probe.passes());
    }

    #[test]
    fn test_command_probe_fails_on_missing_binary() {
        let probe = Probe::CommandOk {
            program: "/nonexistent-binary-that-does-not-exist".to_string(),
            args: vec![],
        };
        assert!(!probe.passes());
    }

    #[test]
    fn test_path_probe() {
        let dir = tempdir().unwrap();
        assert!(Probe::PathExists(dir.path().to_path_buf()).passes());
        assert!(!Probe::PathExists(dir.path().join("absent")).passes());
    }

    #[test]
    fn test_evaluate_maps_severity() {
        let soft = Check {
            label: "doomed".to_string(),
            probe: Probe::CommandOk {
                program: "false".to_string(),
                args: vec![],
            },
            cause: "it failed".to_string(),
            severity: Severity::Soft,
        };
        assert!(matches!(soft.evaluate(), Outcome::Soft(_)));

        let hard = Check {
            severity: Severity::Hard,
            ..soft
        };
        match hard.evaluate() {
            Outcome::Hard(failure) => assert_eq!(failure.cause, "it failed"),
            other => panic!("expected hard failure, got {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_ok() {
        let check = Check {
            label: "fine".to_string(),
            probe: Probe::CommandOk {
                program: "true".to_string(),
                args: vec![],
            },
            cause: "unused".to_string(),
            severity: Severity::Hard,
        };
        assert!(check.evaluate().is_ok());
    }

    #[test]
    fn test_from_config() {
        let config = CheckConfig {
            label: "zlib".to_string(),
            probe: buildprep_core::ProbeConfig::LibraryLinks {
                lib: "z".to_string(),
            },
            cause: "zlib development library is missing".to_string(),
            severity: Severity::Soft,
        };
        let check = Check::from_config(&config, "g++");
        match check.probe {
            Probe::LibraryLinks { lib, compiler } => {
                assert_eq!(lib, "z");
                assert_eq!(compiler, "g++");
            }
            other => panic!("unexpected probe: {other:?}"),
        }
    }
}
