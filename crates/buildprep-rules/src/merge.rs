//! Merging per-file rule files into the manifest.

use buildprep_core::{Failure, Outcome, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Concatenate every intermediate `.dep` file in the output directory
/// into the manifest, then delete the intermediates.
///
/// Rule files are taken in sorted order, so two runs over the same tree
/// produce byte-identical manifests. Any IO trouble is a single soft
/// failure for the merge step as a whole.
pub fn merge_rules(out_dir: &Path, manifest: &str) -> Outcome {
    match try_merge(out_dir, manifest) {
        Ok(count) => {
            info!(rules = count, manifest = %manifest, "manifest merged");
            Outcome::Ok
        }
        Err(e) => {
            debug!(error = %e, "manifest merge failed");
            Outcome::Soft(Failure::new("error merging rule files into manifest"))
        }
    }
}

fn try_merge(out_dir: &Path, manifest: &str) -> Result<usize> {
    let mut rule_files: Vec<PathBuf> = std::fs::read_dir(out_dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "dep").unwrap_or(false))
        .collect();
    rule_files.sort();

    let mut merged = String::new();
    for file in &rule_files {
        merged.push_str(&std::fs::read_to_string(file)?);
    }
    std::fs::write(out_dir.join(manifest), merged)?;

    for file in &rule_files {
        std::fs::remove_file(file)?;
    }
    Ok(rule_files.len())
}
