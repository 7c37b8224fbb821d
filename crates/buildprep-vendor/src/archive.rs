//! Packing vendor objects into a static archive.

use buildprep_core::{Failure, Outcome, PrepError, Result, VendorConfig};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Archive the vendor's object files into `<out_dir>/<archive>`.
///
/// Every object listed in the configuration must exist; the first
/// missing one fails the step (soft) and names the file, which turns a
/// silent vendor-layout change into a diagnosable report line. An
/// archive left by an earlier run is replaced.
pub fn archive(vendor: &VendorConfig, out_dir: &Path, log_path: &Path) -> Outcome {
    let mut objects: Vec<PathBuf> = Vec::with_capacity(vendor.objects.len());
    for object in &vendor.objects {
        let path = vendor.dir.join(object);
        if !path.exists() {
            return Outcome::Soft(Failure::new(format!(
                "vendor object {} is missing; the vendor build may have failed or its layout changed",
                path.display()
            )));
        }
        objects.push(path);
    }

    match try_archive(vendor, &objects, out_dir, log_path) {
        Ok(()) => Outcome::Ok,
        Err(e) => {
            debug!(error = %e, "vendor archiving failed");
            Outcome::Soft(Failure::with_log(
                format!("failed to archive vendor objects into {}", vendor.archive),
                log_path,
            ))
        }
    }
}

fn try_archive(
    vendor: &VendorConfig,
    objects: &[PathBuf],
    out_dir: &Path,
    log_path: &Path,
) -> Result<()> {
    let target = out_dir.join(&vendor.archive);
    if target.exists() {
        std::fs::remove_file(&target)?;
    }

    let log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let log_err = log.try_clone()?;

    let status = Command::new("ar")
        .arg("rcs")
        .arg(&target)
        .args(objects)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .status()
        .map_err(|e| PrepError::spawn("ar", e))?;

    if !status.success() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("ar exited with {status}"),
        )
        .into());
    }

    info!(archive = %target.display(), objects = objects.len(), "vendor archive written");
    Ok(())
}
