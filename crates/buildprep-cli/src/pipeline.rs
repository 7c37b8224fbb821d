//! Top-level pipeline orchestration.
//!
//! Each phase returns its failures as a value; this module owns the
//! continue-vs-abort decisions and the merging of phase reports into
//! the one the binary prints.

use anyhow::{Context, Result};
use buildprep_core::{manifest_digest, Failure, PrepConfig, Report};
use buildprep_rules::{generate_all, merge_rules, RuleGenerator};
use buildprep_vendor::AcquisitionState;
use host_prober::{Check, Validator};
use tracing::info;

/// Runtime checks built from the configuration.
pub fn checks_for(config: &PrepConfig) -> Vec<Check> {
    config
        .effective_checks()
        .iter()
        .map(|c| Check::from_config(c, &config.build.compiler))
        .collect()
}

/// Validator phase only (`buildprep check`).
pub fn run_checks(config: &PrepConfig) -> Report {
    Validator::run(&checks_for(config)).report
}

/// Create the output directory and truncate both diagnostic logs, so
/// every run's logs start fresh.
pub fn prepare_output(config: &PrepConfig) -> Result<()> {
    std::fs::create_dir_all(&config.build.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.build.output_dir.display()
        )
    })?;
    std::fs::write(config.build.log_path(), "")?;
    std::fs::write(config.build.vendor_log_path(), "")?;
    Ok(())
}

/// Manifest generation (`buildprep rules`).
pub async fn run_rules(config: &PrepConfig, digest: bool) -> Result<Report> {
    prepare_output(config)?;

    let generator = RuleGenerator::from_config(&config.build);
    let mut report = generate_all(&generator, &config.groups).await;
    report.record_outcome(&merge_rules(
        &config.build.output_dir,
        &config.build.manifest,
    ));

    if digest {
        let path = config.build.manifest_path();
        let digest =
            manifest_digest(&path).with_context(|| format!("failed to digest {}", path.display()))?;
        println!("{digest}  {}", path.display());
    }
    Ok(report)
}

/// Vendor integration (`buildprep vendor`).
pub async fn run_vendor(config: &PrepConfig) -> Result<Report> {
    let Some(vendor) = &config.vendor else {
        info!("no [vendor] table in configuration, nothing to do");
        return Ok(Report::new());
    };
    prepare_output(config)?;

    let run = buildprep_vendor::integrate(
        vendor,
        &config.build.output_dir,
        &config.build.vendor_log_path(),
    )
    .await;
    Ok(run.report)
}

/// Full pipeline (`buildprep run`).
pub async fn run_full(config: &PrepConfig) -> Result<Report> {
    let mut total = Report::new();

    let validation = Validator::run(&checks_for(config));
    let halted = validation.is_halted();
    total.merge(validation.report);
    if halted {
        return Ok(total);
    }

    prepare_output(config)?;

    // Vendor acquisition gates everything downstream: the adapter group
    // scans headers out of the snapshot, so there is no point generating
    // rules against a tree that failed to materialize.
    let mut vendor_ready = false;
    if let Some(vendor) = &config.vendor {
        match buildprep_vendor::ensure_snapshot(vendor) {
            Ok(AcquisitionState::Acquired) => vendor_ready = true,
            Ok(_) => total.record(buildprep_vendor::stale_snapshot_failure(vendor)),
            Err(e) => {
                let failure = e
                    .hard_failure()
                    .cloned()
                    .unwrap_or_else(|| Failure::new(e.to_string()));
                total.record(failure);
                return Ok(total);
            }
        }
    }

    // The vendor's own build and the manifest generation are
    // independent of each other; overlap them. Each writes its own log.
    let generator = RuleGenerator::from_config(&config.build);
    let rules = async {
        let mut report = generate_all(&generator, &config.groups).await;
        report.record_outcome(&merge_rules(
            &config.build.output_dir,
            &config.build.manifest,
        ));
        report
    };
    let vendor_build = async {
        match &config.vendor {
            Some(vendor) if vendor_ready => {
                buildprep_vendor::build_and_archive(
                    vendor,
                    &config.build.output_dir,
                    &config.build.vendor_log_path(),
                )
                .await
            }
            _ => Report::new(),
        }
    };

    let (rules_report, vendor_report) = tokio::join!(rules, vendor_build);
    total.merge(rules_report);
    total.merge(vendor_report);
    Ok(total)
}
