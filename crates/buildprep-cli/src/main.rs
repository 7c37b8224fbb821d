//! buildprep - build preparation for the packet-classification engine
//!
//! ## Commands
//!
//! - `check`: validate host prerequisites (toolchain, headers, CPU features)
//! - `rules`: generate the dependency-tracked build manifest
//! - `vendor`: acquire, build and archive the vendored dependency
//! - `run`: the full pipeline
//!
//! Every command ends with the failure report on stdout and exits
//! non-zero if anything at all went wrong, so CI can gate on it.

use anyhow::{Context, Result};
use buildprep_cli::pipeline;
use buildprep_core::{init_tracing, PrepConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "buildprep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Host validation, build-manifest generation and vendor integration", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines and a JSON report
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "prep.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate host prerequisites only
    Check,

    /// Generate the dependency manifest only
    Rules {
        /// Print the manifest digest after merging
        #[arg(long)]
        digest: bool,
    },

    /// Acquire, build and archive the vendored dependency only
    Vendor,

    /// Full pipeline: checks, then manifest generation and vendor integration
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let config = load_config(&cli.config)?;

    let report = match cli.command {
        Commands::Check => pipeline::run_checks(&config),
        Commands::Rules { digest } => pipeline::run_rules(&config, digest).await?,
        Commands::Vendor => pipeline::run_vendor(&config).await?,
        Commands::Run => pipeline::run_full(&config).await?,
    };

    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", report.render());
    }
    std::process::exit(report.exit_code());
}

/// Load `prep.toml`, or fall back to the built-in defaults when the
/// file is absent (the defaults describe the stock project layout).
fn load_config(path: &Path) -> Result<PrepConfig> {
    if path.exists() {
        PrepConfig::from_file(path).with_context(|| format!("failed to load {}", path.display()))
    } else {
        info!(config = %path.display(), "no configuration file, using defaults");
        Ok(PrepConfig::default())
    }
}
