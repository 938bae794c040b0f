#![warn(missing_docs)]
//! Uplift CLI Library
//!
//! Command-line front end for the uplift analyzers. The `uplift` binary calls
//! [`run`]; embedders that build their own argument list can call
//! [`run_with_cli`].
//!
//! # Example
//!
//! ```text
//! uplift bayesian 50000 1500 50000 1560 --seed 42
//! uplift frequentist 80000 1600 80000 1696 --tails one --format json
//! uplift init > uplift.toml
//! ```

mod config;
mod executor;

pub use config::*;
pub use executor::{AnalysisRequest, execute, format_human_output, render};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use uplift_report::OutputFormat;
use uplift_stats::{AnalysisError, TailMode};

/// Uplift CLI arguments
#[derive(Parser, Debug)]
#[command(name = "uplift")]
#[command(author, version, about = "Uplift - A/B test calculator")]
pub struct Cli {
    /// Analysis to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: human, json, markdown, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to the nearest uplift.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare Beta posteriors by Monte Carlo sampling
    Bayesian {
        /// Observed counts
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Posterior draws per variant
        #[arg(long, short = 'n')]
        samples: Option<usize>,

        /// Seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,

        /// Sample the variants one after the other
        #[arg(long)]
        serial: bool,

        /// Credible level of the relative uplift interval
        #[arg(long)]
        credible_level: Option<f64>,
    },
    /// Pooled two-proportion z-test
    Frequentist {
        /// Observed counts
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Significance level (e.g. 0.05)
        #[arg(long, conflicts_with = "confidence")]
        alpha: Option<f64>,

        /// Confidence level, as a fraction (0.95) or percentage (95)
        #[arg(long)]
        confidence: Option<f64>,

        /// Tails: one or two
        #[arg(long)]
        tails: Option<String>,
    },
    /// Print a default uplift.toml
    Init,
}

/// Visitor and conversion counts of both variants
#[derive(Args, Debug, Clone, Copy)]
pub struct ExperimentArgs {
    /// Visitors of the control (A)
    #[arg(value_name = "VISITORS_A")]
    pub visitors_a: u64,
    /// Conversions of the control (A)
    #[arg(value_name = "CONVERSIONS_A")]
    pub conversions_a: u64,
    /// Visitors of the variant (B)
    #[arg(value_name = "VISITORS_B")]
    pub visitors_b: u64,
    /// Conversions of the variant (B)
    #[arg(value_name = "CONVERSIONS_B")]
    pub conversions_b: u64,
}

/// Run the Uplift CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if the input or configuration is
/// rejected or the report cannot be written.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Uplift CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging; a subscriber installed by an embedder wins
    let filter = if cli.verbose {
        "uplift=debug"
    } else {
        "uplift=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Commands::Init = cli.command {
        return write_output(&cli, &UpliftConfig::default_toml());
    }

    let config = load_config(&cli)?;
    let format: OutputFormat = match &cli.format {
        Some(format) => format.parse()?,
        None => config.output.format.parse()?,
    };

    let request = build_request(&cli.command, &config)?;
    let report = execute(&request)?;
    let output = render(&report, format, &config.output.style())?;

    write_output(&cli, &output)
}

/// Explicit `--config`, else the discovered uplift.toml, else defaults
fn load_config(cli: &Cli) -> anyhow::Result<UpliftConfig> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => UpliftConfig::discover_path(),
    };
    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            UpliftConfig::load(&path)
        }
        None => {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
            Ok(UpliftConfig::default())
        }
    }
}

/// Layer command-line flags over the configuration file
fn build_request(command: &Commands, config: &UpliftConfig) -> anyhow::Result<AnalysisRequest> {
    let request = match command {
        Commands::Bayesian {
            experiment,
            samples,
            seed,
            serial,
            credible_level,
        } => {
            let mut section = config.bayesian.clone();
            if let Some(samples) = samples {
                section.samples = *samples;
            }
            if seed.is_some() {
                section.seed = *seed;
            }
            if *serial {
                section.parallel = false;
            }
            if let Some(level) = credible_level {
                section.credible_level = *level;
            }
            AnalysisRequest::Bayesian {
                counts: *experiment,
                sampling: section.sampling(),
                seed: section.seed,
                options: section.report_options(),
            }
        }
        Commands::Frequentist {
            experiment,
            alpha,
            confidence,
            tails,
        } => {
            let alpha = match (alpha, confidence) {
                (Some(alpha), _) => *alpha,
                (None, Some(confidence)) => alpha_from_confidence(*confidence),
                (None, None) => config.frequentist.alpha,
            };
            let tails: TailMode = tails
                .as_deref()
                .unwrap_or(config.frequentist.tails.as_str())
                .parse()?;
            AnalysisRequest::Frequentist {
                counts: *experiment,
                alpha,
                tails,
            }
        }
        Commands::Init => {
            return Err(AnalysisError::InvalidConfig(
                "init does not run an analysis".to_string(),
            )
            .into());
        }
    };
    Ok(request)
}

/// Accepts 0.95 as well as 95
fn alpha_from_confidence(confidence: f64) -> f64 {
    if confidence > 1.0 {
        1.0 - confidence / 100.0
    } else {
        1.0 - confidence
    }
}

fn write_output(cli: &Cli, output: &str) -> anyhow::Result<()> {
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }
    Ok(())
}
