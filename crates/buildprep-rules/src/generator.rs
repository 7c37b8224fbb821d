//! Per-file dependency-rule generation.

use crate::rule::DepRule;
use buildprep_core::{BuildConfig, Failure, GroupConfig, Outcome, PrepError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs the compiler's dependency scan for one source file at a time
/// and writes the rewritten rule (plus a compile recipe) into the
/// output directory.
pub struct RuleGenerator {
    compiler: String,
    output_dir: PathBuf,
    include_dir: PathBuf,
    scan_std: String,
    vector_flags: Vec<String>,
    log_path: PathBuf,
}

impl RuleGenerator {
    /// Build a generator from the compiler/output settings.
    pub fn from_config(build: &BuildConfig) -> Self {
        Self {
            compiler: build.compiler.clone(),
            output_dir: build.output_dir.clone(),
            include_dir: build.include_dir.clone(),
            scan_std: build.scan_std.clone(),
            vector_flags: build.scan_vector_flags.clone(),
            log_path: build.log_path(),
        }
    }

    /// Object file name for a source path relative to its group root.
    ///
    /// Path separators are flattened into `_` so sources with the same
    /// stem in different subdirectories cannot collide inside the flat
    /// output directory.
    pub fn object_name(relative: &Path) -> String {
        let stem: Vec<String> = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("{}.o", stem.join("_"))
    }

    /// Scan one source file and write its rule file.
    ///
    /// Any failure (scanner exits non-zero, unparseable output, IO) is
    /// soft: the file is reported and the remaining sources still get
    /// their rules.
    pub async fn generate(&self, source: &Path, relative: &Path, group: &GroupConfig) -> Outcome {
        match self.try_generate(source, relative, group).await {
            Ok(()) => Outcome::Ok,
            Err(e) => {
                debug!(source = %source.display(), error = %e, "rule generation failed");
                Outcome::Soft(Failure::with_log(
                    format!("error generating rule for {}", source.display()),
                    &self.log_path,
                ))
            }
        }
    }

    async fn try_generate(&self, source: &Path, relative: &Path, group: &GroupConfig) -> Result<()> {
        let object = Self::object_name(relative);
        let scan_std = group.scan_std.as_deref().unwrap_or(&self.scan_std);

        let mut cmd = Command::new(&self.compiler);
        cmd.arg(format!("-std={scan_std}"));
        if group.vectorize {
            cmd.args(&self.vector_flags);
        }
        cmd.arg("-MM")
            .arg("-I")
            .arg(&self.include_dir)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped());

        let output = cmd
            .output()
            .await
            .map_err(|e| PrepError::spawn(&self.compiler, e))?;

        // Scanner stderr goes to the shared log so a failure report can
        // point somewhere useful. `tokio::process::Command::output`
        // forces stderr onto a pipe, so append the captured bytes here
        // instead of pre-wiring the file as the child's stderr.
        let mut log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        std::io::Write::write_all(&mut log, &output.stderr)?;

        if !output.status.success() {
            return Err(PrepError::MalformedRule(format!(
                "dependency scan of {} exited with {}",
                source.display(),
                output.status
            )));
        }

        let mut rule = DepRule::parse(&String::from_utf8_lossy(&output.stdout))?;
        rule.relocate(&self.output_dir, &object);

        let recipe = format!(
            "\t{} {} -I{} -L{} -c {} -o {}\n",
            self.compiler,
            group.flags,
            self.include_dir.display(),
            self.output_dir.display(),
            source.display(),
            rule.target,
        );

        let mut content = rule.render();
        content.push_str(&recipe);
        std::fs::write(self.rule_file(&object), content)?;
        Ok(())
    }

    /// Path of the intermediate rule file for an object.
    pub fn rule_file(&self, object: &str) -> PathBuf {
        let stem = object.strip_suffix(".o").unwrap_or(object);
        self.output_dir.join(format!("{stem}.dep"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_flat() {
        assert_eq!(RuleGenerator::object_name(Path::new("a.cpp")), "a.o");
        assert_eq!(RuleGenerator::object_name(Path::new("timer.cc")), "timer.o");
    }

    #[test]
    fn test_object_name_namespaces_subdirectories() {
        assert_eq!(
            RuleGenerator::object_name(Path::new("net/util.cpp")),
            "net_util.o"
        );
        assert_eq!(
            RuleGenerator::object_name(Path::new("io/util.cpp")),
            "io_util.o"
        );
    }

    #[test]
    fn test_rule_file_name() {
        let generator = RuleGenerator::from_config(&BuildConfig::default());
        assert_eq!(generator.rule_file("net_util.o"), Path::new("bin/net_util.dep"));
    }
}
