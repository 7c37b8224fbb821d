//! End-to-end rule generation against a stub dependency scanner.
//!
//! The stub shell script stands in for the compiler's `-MM` mode: it
//! prints `<stem>.o: <source> <quoted includes>` like a real scanner
//! would, so the pipeline can be exercised hermetically.

use buildprep_core::{manifest_digest, BuildConfig, GroupConfig};
use buildprep_rules::{generate_all, merge_rules, RuleGenerator};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STUB_SCANNER: &str = r#"#!/bin/sh
# Emulates `cc ... -MM <src>`: the source is the last argument.
for arg in "$@"; do src="$arg"; done
if grep -q DOOMED "$src" 2>/dev/null; then
    echo "stub scanner: cannot parse $src" >&2
    exit 1
fi
base=$(basename "$src")
base="${base%.*}"
deps=$(sed -n 's/^#include "\(.*\)"$/\1/p' "$src" | tr '\n' ' ')
printf '%s.o: %s %s\n' "$base" "$src" "$deps"
"#;

struct Workspace {
    _dir: TempDir,
    src: PathBuf,
    build: BuildConfig,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let src = dir.path().join("src");
        std::fs::create_dir(&src).unwrap();

        let scanner = dir.path().join("stubcc");
        std::fs::write(&scanner, STUB_SCANNER).unwrap();
        std::fs::set_permissions(&scanner, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output_dir = dir.path().join("bin");
        std::fs::create_dir(&output_dir).unwrap();

        let build = BuildConfig {
            compiler: scanner.to_string_lossy().into_owned(),
            output_dir,
            include_dir: src.clone(),
            ..BuildConfig::default()
        };

        Self {
            _dir: dir,
            src,
            build,
        }
    }

    fn write_source(&self, name: &str, content: &str) {
        let path = self.src.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn group(&self, flags: &str) -> GroupConfig {
        GroupConfig {
            name: "core".to_string(),
            roots: vec![self.src.clone()],
            flags: flags.to_string(),
            extensions: vec!["cpp".to_string()],
            scan_std: None,
            vectorize: false,
        }
    }

    fn manifest(&self) -> String {
        std::fs::read_to_string(self.build.manifest_path()).expect("manifest exists")
    }
}

async fn run_pipeline(ws: &Workspace, flags: &str) -> buildprep_core::Report {
    let generator = RuleGenerator::from_config(&ws.build);
    let mut report = generate_all(&generator, &[ws.group(flags)]).await;
    report.record_outcome(&merge_rules(&ws.build.output_dir, &ws.build.manifest));
    report
}

#[tokio::test]
async fn test_generates_relocated_rules_with_recipes() {
    let ws = Workspace::new();
    ws.write_source("a.cpp", "#include \"a.h\"\nint f();\n");
    ws.write_source("a.h", "int f();\n");
    ws.write_source("b.cpp", "int g();\n");

    let report = run_pipeline(&ws, "-O2").await;
    assert!(report.is_clean(), "failures: {:?}", report.failures());

    let manifest = ws.manifest();
    let bin = ws.build.output_dir.display().to_string();
    let src = ws.src.display().to_string();

    // Targets point into the output directory; prerequisites keep the
    // scanner's paths.
    assert!(
        manifest.contains(&format!("{bin}/a.o: {src}/a.cpp a.h")),
        "manifest:\n{manifest}"
    );
    assert!(manifest.contains(&format!("{bin}/b.o: {src}/b.cpp")));

    // Each rule carries a tab-indented recipe with the group's flags.
    assert!(
        manifest.contains(&format!(
            "\t{} -O2 -I{src} -L{bin} -c {src}/a.cpp -o {bin}/a.o\n",
            ws.build.compiler
        )),
        "manifest:\n{manifest}"
    );

    // No target may be left outside the output directory.
    for line in manifest.lines().filter(|l| !l.starts_with('\t')) {
        if let Some((target, _)) = line.split_once(':') {
            assert!(
                target.starts_with(&bin),
                "target escaped the output directory: {target}"
            );
        }
    }

    // Intermediate rule files were consumed by the merge.
    let leftovers: Vec<_> = std::fs::read_dir(&ws.build.output_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .filter(|n| n.to_string_lossy().ends_with(".dep"))
        .collect();
    assert!(leftovers.is_empty(), "leftover rule files: {leftovers:?}");
}

#[tokio::test]
async fn test_regeneration_is_byte_identical() {
    let ws = Workspace::new();
    ws.write_source("a.cpp", "#include \"a.h\"\n");
    ws.write_source("a.h", "");
    ws.write_source("util/io.cpp", "");

    let report = run_pipeline(&ws, "-O2 -g").await;
    assert!(report.is_clean());
    let first = manifest_digest(&ws.build.manifest_path()).unwrap();

    let report = run_pipeline(&ws, "-O2 -g").await;
    assert!(report.is_clean());
    let second = manifest_digest(&ws.build.manifest_path()).unwrap();

    assert_eq!(first, second, "manifest must be regenerable");
}

#[tokio::test]
async fn test_subdirectory_sources_get_namespaced_objects() {
    let ws = Workspace::new();
    ws.write_source("util.cpp", "");
    ws.write_source("net/util.cpp", "");

    let report = run_pipeline(&ws, "-O2").await;
    assert!(report.is_clean());

    let manifest = ws.manifest();
    let bin = ws.build.output_dir.display().to_string();
    assert!(manifest.contains(&format!("{bin}/util.o:")));
    assert!(manifest.contains(&format!("{bin}/net_util.o:")));
}

#[tokio::test]
async fn test_scan_failure_is_soft_and_names_the_file() {
    let ws = Workspace::new();
    ws.write_source("good.cpp", "");
    ws.write_source("broken.cpp", "// DOOMED\n");

    let report = run_pipeline(&ws, "-O2").await;
    assert_eq!(report.failures().len(), 1);
    let failure = &report.failures()[0];
    assert!(
        failure.cause.contains("broken.cpp"),
        "cause should name the file: {}",
        failure.cause
    );
    assert_eq!(failure.log.as_deref(), Some(ws.build.log_path().as_path()));

    // The good file still made it into the manifest.
    assert!(ws.manifest().contains("good.o:"));
    // The scanner's stderr landed in the shared log.
    let log = std::fs::read_to_string(ws.build.log_path()).unwrap();
    assert!(log.contains("cannot parse"));
}

#[tokio::test]
async fn test_group_scan_std_override() {
    // A scanner that records its arguments proves the per-group
    // standard and the vectorization switch are honored.
    let ws = Workspace::new();
    ws.write_source("x.cpp", "");

    let recorder = ws.src.parent().unwrap().join("recorder");
    let args_file = ws.src.parent().unwrap().join("args.txt");
    let script = format!(
        "#!/bin/sh\necho \"$@\" >> {}\nfor arg in \"$@\"; do src=\"$arg\"; done\necho \"x.o: $src\"\n",
        args_file.display()
    );
    std::fs::write(&recorder, script).unwrap();
    std::fs::set_permissions(&recorder, std::fs::Permissions::from_mode(0o755)).unwrap();

    let build = BuildConfig {
        compiler: recorder.to_string_lossy().into_owned(),
        ..ws.build.clone()
    };
    let generator = RuleGenerator::from_config(&build);

    let mut group = ws.group("-O2");
    group.scan_std = Some("gnu++11".to_string());
    group.vectorize = false;
    let report = generate_all(&generator, &[group]).await;
    assert!(report.is_clean());

    let args = std::fs::read_to_string(&args_file).unwrap();
    assert!(args.contains("-std=gnu++11"));
    assert!(!args.contains("-mavx"), "vectorize=false must drop flags");

    // And with vectorization on, the default flags appear.
    let mut group = ws.group("-O2");
    group.vectorize = true;
    let report = generate_all(&generator, &[group]).await;
    assert!(report.is_clean());
    let args = std::fs::read_to_string(&args_file).unwrap();
    assert!(args.contains("-mavx -mavx2"));
}

#[tokio::test]
async fn test_empty_group_produces_empty_manifest() {
    let ws = Workspace::new();
    let report = run_pipeline(&ws, "-O2").await;
    assert!(report.is_clean());
    assert_eq!(ws.manifest(), "");
    assert!(Path::new(&ws.build.manifest_path()).exists());
}
