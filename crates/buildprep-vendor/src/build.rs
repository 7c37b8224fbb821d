//! Running the vendored dependency's own build.

use buildprep_core::{Failure, Outcome, PrepError, Result, VendorConfig};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Run the vendor's build command inside its snapshot directory.
///
/// All build output goes to the vendor log. A failing build is soft:
/// the report names the directory and points at the log.
pub async fn build(vendor: &VendorConfig, log_path: &Path) -> Outcome {
    match try_build(vendor, log_path).await {
        Ok(()) => Outcome::Ok,
        Err(e) => {
            debug!(error = %e, "vendor build failed");
            Outcome::Soft(Failure::with_log(
                format!("vendor build failed in {}", vendor.dir.display()),
                log_path,
            ))
        }
    }
}

async fn try_build(vendor: &VendorConfig, log_path: &Path) -> Result<()> {
    let (program, args) = vendor.build_command.split_first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "build_command is empty")
    })?;

    info!(command = ?vendor.build_command, dir = %vendor.dir.display(), "building vendor dependency");

    let log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let log_err = log.try_clone()?;

    let status = Command::new(program)
        .args(args)
        .current_dir(&vendor.dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .status()
        .await
        .map_err(|e| PrepError::spawn(program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("build command exited with {status}"),
        )
        .into())
    }
}
