//! Source enumeration and group-level rule generation.

use crate::generator::RuleGenerator;
use buildprep_core::{Failure, GroupConfig, Report, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Recursively collect the compilable files under a group's roots.
///
/// Returns `(path, relative)` pairs, where `relative` is the path under
/// the group root that owns the file. The walk is depth-first with
/// entries sorted by name, so the result (and everything derived from
/// it) is deterministic. Hidden entries are skipped.
pub fn collect_sources(group: &GroupConfig) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut sources = Vec::new();
    for root in &group.roots {
        if !root.is_dir() {
            warn!(root = %root.display(), group = %group.name, "group root is not a directory, skipping");
            continue;
        }
        walk(root, root, &group.extensions, &mut sources)?;
    }
    sources.sort();
    Ok(sources)
}

fn walk(
    root: &Path,
    dir: &Path,
    extensions: &[String],
    out: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in entries {
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if hidden {
            continue;
        }

        if path.is_dir() {
            walk(root, &path, extensions, out)?;
        } else if has_extension(&path, extensions) {
            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_path_buf();
            out.push((path, relative));
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| extensions.iter().any(|want| e == want.as_str()))
        .unwrap_or(false)
}

/// Generate rule files for every source in one group.
///
/// Per-file failures are soft; enumeration trouble (an unreadable
/// subdirectory) fails the group as a whole, also soft.
pub async fn generate_group(generator: &RuleGenerator, group: &GroupConfig) -> Report {
    let mut report = Report::new();

    let sources = match collect_sources(group) {
        Ok(sources) => sources,
        Err(e) => {
            warn!(group = %group.name, error = %e, "source enumeration failed");
            report.record(Failure::new(format!(
                "error enumerating sources for group {}",
                group.name
            )));
            return report;
        }
    };

    info!(group = %group.name, sources = sources.len(), "generating dependency rules");
    for (source, relative) in &sources {
        let outcome = generator.generate(source, relative, group).await;
        report.record_outcome(&outcome);
    }
    report
}

/// Generate rule files for every configured group, in order.
pub async fn generate_all(generator: &RuleGenerator, groups: &[GroupConfig]) -> Report {
    let mut report = Report::new();
    for group in groups {
        report.merge(generate_group(generator, group).await);
    }
    report
}
