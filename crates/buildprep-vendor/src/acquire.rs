//! Vendor snapshot acquisition: clone, pin, patch.

use buildprep_core::{Failure, PrepError, Result, VendorConfig};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Marker file written into the snapshot once clone, pin and patch all
/// succeeded. Its presence is what makes re-runs idempotent.
pub const ACQUIRED_MARKER: &str = ".buildprep-acquired";

/// What the local snapshot directory looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// No snapshot directory; acquisition must run.
    Absent,
    /// Snapshot present and marked complete; nothing to do.
    Acquired,
    /// Snapshot directory exists but carries no completion marker, so
    /// its contents cannot be trusted (an earlier run died mid-way, or
    /// the directory is something else entirely).
    Failed,
}

/// Inspect the snapshot directory without touching it.
pub fn detect_state(dir: &Path) -> AcquisitionState {
    if !dir.exists() {
        AcquisitionState::Absent
    } else if dir.join(ACQUIRED_MARKER).exists() {
        AcquisitionState::Acquired
    } else {
        AcquisitionState::Failed
    }
}

/// Make sure the vendor snapshot is acquired.
///
/// An already-acquired snapshot is left exactly as it is, with no git
/// invocation at all. An `Absent` snapshot is cloned, hard-reset to the
/// pinned tag, and patched; any of those failing is a hard error, since
/// everything downstream builds on this code. A `Failed` snapshot is
/// returned as-is for the caller to report.
pub fn ensure_snapshot(vendor: &VendorConfig) -> Result<AcquisitionState> {
    match detect_state(&vendor.dir) {
        AcquisitionState::Acquired => {
            info!(dir = %vendor.dir.display(), "vendor snapshot already acquired, skipping");
            Ok(AcquisitionState::Acquired)
        }
        AcquisitionState::Failed => {
            warn!(dir = %vendor.dir.display(), "vendor snapshot present but not marked acquired");
            Ok(AcquisitionState::Failed)
        }
        AcquisitionState::Absent => {
            acquire(vendor)?;
            Ok(AcquisitionState::Acquired)
        }
    }
}

fn acquire(vendor: &VendorConfig) -> Result<()> {
    info!(url = %vendor.url, tag = %vendor.tag, "acquiring vendor snapshot");

    let dir = vendor.dir.to_string_lossy().into_owned();
    run_git(&["clone", vendor.url.as_str(), dir.as_str()]).map_err(|detail| {
        hard(
            format!("failed to clone vendor dependency from {}", vendor.url),
            detail,
        )
    })?;

    run_git(&["-C", dir.as_str(), "reset", "--hard", vendor.tag.as_str()]).map_err(|detail| {
        hard(
            format!("vendor tag {} does not exist upstream", vendor.tag),
            detail,
        )
    })?;

    if let Some(patch) = &vendor.patch {
        // The patch path is relative to the invocation directory, not
        // to the snapshot, so hand git an absolute path.
        let patch = std::fs::canonicalize(patch).map_err(|e| {
            hard(
                format!("vendor patch {} is missing", patch.display()),
                e.to_string(),
            )
        })?;
        let patch_arg = patch.to_string_lossy();
        run_git(&[
            "-C",
            dir.as_str(),
            "apply",
            "--ignore-whitespace",
            patch_arg.as_ref(),
        ])
        .map_err(|detail| {
            hard(
                format!("failed to apply vendor patch {}", patch.display()),
                detail,
            )
        })?;
    }

    std::fs::write(vendor.dir.join(ACQUIRED_MARKER), &vendor.tag)?;
    info!(dir = %vendor.dir.display(), "vendor snapshot acquired");
    Ok(())
}

fn hard(cause: String, detail: String) -> PrepError {
    warn!(cause = %cause, detail = %detail, "vendor acquisition failed");
    PrepError::Hard(Failure::new(cause))
}

/// Run git with the given arguments; on failure return its stderr.
fn run_git(args: &[&str]) -> std::result::Result<(), String> {
    let output = Command::new("git")
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| format!("failed to run git: {e}"))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}
