//! buildprep-vendor - vendored-dependency integration
//!
//! Acquires a pinned snapshot of an upstream dependency (clone,
//! hard-reset to tag, patch), runs its build, and packs the resulting
//! objects into a static archive inside the output directory. A marker
//! file makes re-runs idempotent: an acquired snapshot is never
//! touched again.

pub mod acquire;
pub mod archive;
pub mod build;

// Re-export key types
pub use acquire::{detect_state, ensure_snapshot, AcquisitionState, ACQUIRED_MARKER};
pub use archive::archive;
pub use build::build;

use buildprep_core::{Failure, PhaseRun, Report, VendorConfig};
use std::path::Path;

/// A soft failure describing a snapshot directory in an unknown state.
pub fn stale_snapshot_failure(vendor: &VendorConfig) -> Failure {
    Failure::new(format!(
        "vendor snapshot {} exists but is not marked acquired; delete it and re-run",
        vendor.dir.display()
    ))
}

/// Build the acquired snapshot and archive its objects.
///
/// Both steps are soft: a build failure still attempts the archive, so
/// the report shows everything wrong at once.
pub async fn build_and_archive(vendor: &VendorConfig, out_dir: &Path, log_path: &Path) -> Report {
    let mut report = Report::new();
    report.record_outcome(&build::build(vendor, log_path).await);
    report.record_outcome(&archive::archive(vendor, out_dir, log_path));
    report
}

/// Full vendor integration: acquire, build, archive.
///
/// Acquisition failures are hard and halt the phase; a snapshot in an
/// unknown state skips the build and is reported soft.
pub async fn integrate(vendor: &VendorConfig, out_dir: &Path, log_path: &Path) -> PhaseRun {
    let mut report = Report::new();
    match acquire::ensure_snapshot(vendor) {
        Err(e) => {
            let failure = e
                .hard_failure()
                .cloned()
                .unwrap_or_else(|| Failure::new(e.to_string()));
            return PhaseRun::halted(report, failure);
        }
        Ok(AcquisitionState::Acquired) => {}
        Ok(_) => {
            report.record(stale_snapshot_failure(vendor));
            return PhaseRun::from_report(report);
        }
    }

    report.merge(build_and_archive(vendor, out_dir, log_path).await);
    PhaseRun::from_report(report)
}
