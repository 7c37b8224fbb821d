//! Build-preparation configuration (`prep.toml` format).

use crate::error::Result;
use crate::outcome::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for a preparation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Compiler and output settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Source groups, each with its own flag profile.
    #[serde(rename = "group", default = "GroupConfig::default_groups")]
    pub groups: Vec<GroupConfig>,

    /// Prerequisite checks; empty means the built-in sequence.
    #[serde(rename = "check", default)]
    pub checks: Vec<CheckConfig>,

    /// Vendored dependency, if this project integrates one.
    #[serde(default)]
    pub vendor: Option<VendorConfig>,
}

/// Compiler and output-directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Compiler binary used for dependency scanning and in recipes.
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Private directory all generated objects and rules point into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Include path for the project's own headers.
    #[serde(default = "default_include_dir")]
    pub include_dir: PathBuf,

    /// Language standard used for the dependency scan.
    #[serde(default = "default_scan_std")]
    pub scan_std: String,

    /// Instruction-set-extension flags required by the scan.
    #[serde(default = "default_vector_flags")]
    pub scan_vector_flags: Vec<String>,

    /// Name of the merged manifest file inside the output directory.
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Name of the shared diagnostic log inside the output directory.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Name of the vendor build/archive log inside the output directory.
    /// Separate from `log_file` because the vendor build may run while
    /// the dependency scan is still appending to the main log.
    #[serde(default = "default_vendor_log_file")]
    pub vendor_log_file: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            output_dir: default_output_dir(),
            include_dir: default_include_dir(),
            scan_std: default_scan_std(),
            scan_vector_flags: default_vector_flags(),
            manifest: default_manifest(),
            log_file: default_log_file(),
            vendor_log_file: default_vendor_log_file(),
        }
    }
}

impl BuildConfig {
    /// Path of the merged manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest)
    }

    /// Path of the shared diagnostic log.
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file)
    }

    /// Path of the vendor build/archive log.
    pub fn vendor_log_path(&self) -> PathBuf {
        self.output_dir.join(&self.vendor_log_file)
    }
}

/// A named collection of source roots sharing one compiler-flag profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group name, used in diagnostics.
    pub name: String,

    /// Directories scanned recursively for compilable files.
    pub roots: Vec<PathBuf>,

    /// Compile-recipe flag profile (may reference make variables).
    pub flags: String,

    /// File extensions considered compilable.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Per-group override of the dependency-scan standard.
    #[serde(default)]
    pub scan_std: Option<String>,

    /// Whether the scan passes the vectorization flags.
    #[serde(default = "default_true")]
    pub vectorize: bool,
}

impl GroupConfig {
    /// Built-in groups: the project tree and the vendor adapter tree.
    pub fn default_groups() -> Vec<GroupConfig> {
        vec![
            GroupConfig {
                name: "core".to_string(),
                roots: vec![PathBuf::from("src")],
                flags: "-std=c++14 -O2 -g -mavx -mavx2".to_string(),
                extensions: default_extensions(),
                scan_std: None,
                vectorize: true,
            },
            GroupConfig {
                name: "vendor-adapter".to_string(),
                roots: vec![PathBuf::from("vendor/adapter")],
                flags: "-std=gnu++11 -fpermissive -O2".to_string(),
                extensions: default_extensions(),
                scan_std: Some("gnu++11".to_string()),
                vectorize: false,
            },
        ]
    }
}

/// One prerequisite check, as configuration data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Label announced before the probe runs.
    pub label: String,

    /// The probe to evaluate.
    pub probe: ProbeConfig,

    /// Cause recorded when the probe fails.
    pub cause: String,

    /// Soft failures continue; hard failures abort.
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

/// Probe kinds a check can use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeConfig {
    /// Run a command; pass iff it exits zero. Output is suppressed.
    Command {
        /// Program to run.
        program: String,
        /// Arguments.
        #[serde(default)]
        args: Vec<String>,
    },

    /// Pass iff the CPU advertises the given feature flag.
    CpuFeature {
        /// Flag name as listed in `/proc/cpuinfo` (e.g. `avx2`).
        flag: String,
    },

    /// Pass iff the path exists.
    PathExists {
        /// Path to test.
        path: PathBuf,
    },

    /// Pass iff an empty program links against `-l<lib>`.
    LibraryLinks {
        /// Library name without the `lib` prefix (e.g. `z`).
        lib: String,
    },
}

/// Vendored dependency acquired by snapshot-and-patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Upstream clone URL.
    pub url: String,

    /// Pinned tag the snapshot is hard-reset to.
    pub tag: String,

    /// Local snapshot directory.
    pub dir: PathBuf,

    /// Local patch file applied after checkout.
    #[serde(default)]
    pub patch: Option<PathBuf>,

    /// The dependency's own build invocation, run inside `dir`.
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    /// Explicit table of object artifacts the build is expected to leave,
    /// relative to `dir`. A vendor layout change is a one-place edit here.
    pub objects: Vec<PathBuf>,

    /// Static library file name placed in the output directory.
    pub archive: String,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            groups: GroupConfig::default_groups(),
            checks: Vec::new(),
            vendor: None,
        }
    }
}

impl PrepConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PrepConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// The built-in check sequence used when `[[check]]` tables are absent.
    ///
    /// Order is fixed: compiler (hard) gates everything, then the soft
    /// tool/header/CPU/library probes.
    pub fn default_checks(&self) -> Vec<CheckConfig> {
        let compiler = self.build.compiler.clone();
        vec![
            CheckConfig {
                label: format!("{compiler} compiler"),
                probe: ProbeConfig::Command {
                    program: compiler.clone(),
                    args: vec!["--version".to_string()],
                },
                cause: format!("{compiler} is not installed"),
                severity: Severity::Hard,
            },
            CheckConfig {
                label: "make".to_string(),
                probe: ProbeConfig::Command {
                    program: "make".to_string(),
                    args: vec!["--version".to_string()],
                },
                cause: "make is not installed".to_string(),
                severity: Severity::Soft,
            },
            CheckConfig {
                label: "project headers".to_string(),
                probe: ProbeConfig::PathExists {
                    path: self.build.include_dir.clone(),
                },
                cause: format!(
                    "project include directory {} is missing",
                    self.build.include_dir.display()
                ),
                severity: Severity::Soft,
            },
            CheckConfig {
                label: "avx support".to_string(),
                probe: ProbeConfig::CpuFeature {
                    flag: "avx".to_string(),
                },
                cause: "CPU does not support avx".to_string(),
                severity: Severity::Soft,
            },
            CheckConfig {
                label: "avx2 support".to_string(),
                probe: ProbeConfig::CpuFeature {
                    flag: "avx2".to_string(),
                },
                cause: "CPU does not support avx2".to_string(),
                severity: Severity::Soft,
            },
            CheckConfig {
                label: "zlib".to_string(),
                probe: ProbeConfig::LibraryLinks {
                    lib: "z".to_string(),
                },
                cause: "zlib development library is missing".to_string(),
                severity: Severity::Soft,
            },
        ]
    }

    /// The checks to run: configured ones, or the built-in sequence.
    pub fn effective_checks(&self) -> Vec<CheckConfig> {
        if self.checks.is_empty() {
            self.default_checks()
        } else {
            self.checks.clone()
        }
    }
}

fn default_compiler() -> String {
    "g++".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("bin")
}

fn default_include_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_scan_std() -> String {
    "c++14".to_string()
}

fn default_vector_flags() -> Vec<String> {
    vec!["-mavx".to_string(), "-mavx2".to_string()]
}

fn default_manifest() -> String {
    "rules.mk".to_string()
}

fn default_log_file() -> String {
    "prep.log".to_string()
}

fn default_vendor_log_file() -> String {
    "vendor.log".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["cpp".to_string(), "cc".to_string(), "c".to_string()]
}

fn default_build_command() -> Vec<String> {
    vec!["make".to_string(), "-j4".to_string()]
}

fn default_severity() -> Severity {
    Severity::Soft
}

fn default_true() -> bool {
    true
}
