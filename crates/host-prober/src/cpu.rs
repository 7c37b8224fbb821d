//! CPU feature detection via `/proc/cpuinfo`.

use tracing::debug;

/// Whether the CPU advertises the given feature flag (e.g. `avx2`).
///
/// Reads `/proc/cpuinfo` and scans the `flags` line. An unreadable
/// cpuinfo counts as unsupported.
pub fn cpu_supports(flag: &str) -> bool {
    match std::fs::read_to_string("/proc/cpuinfo") {
        Ok(content) => cpuinfo_has_flag(&content, flag),
        Err(e) => {
            debug!(error = %e, "could not read /proc/cpuinfo");
            false
        }
    }
}

/// Scan cpuinfo content for a feature flag.
///
/// Matches whole tokens on `flags` lines only, so `avx` does not match
/// `avx2` and model-name text cannot produce false positives.
fn cpuinfo_has_flag(content: &str, flag: &str) -> bool {
    content
        .lines()
        .filter(|line| line.starts_with("flags") || line.starts_with("Features"))
        .filter_map(|line| line.split_once(':'))
        .any(|(_, values)| values.split_whitespace().any(|f| f == flag))
}
