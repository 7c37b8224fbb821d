//! Manifest content digesting.
//!
//! The merged manifest must be regenerable byte-for-byte from an
//! unchanged source tree; hashing it gives a cheap way to verify that.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// SHA-256 hex digest of a manifest file's exact bytes.
pub fn manifest_digest(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;

    let mut hasher = Sha256::new();
    hasher.update(&content);
    let digest = hex::encode(hasher.finalize());

    debug!(manifest = %path.display(), digest = %&digest[..12], "manifest digested");
    Ok(digest)
}
