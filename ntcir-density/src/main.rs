//! ntcir-density - positional relevance estimator
//!
//! Uses NTCIR-10 Math, NTCIR-11 Math-2 and NTCIR-12 MathIR datasets to fit
//! P(relevant), p(position) and p(position | relevant), and writes them to a
//! JSON estimator bundle.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use ntcir_common::config::{ConfigOverrides, RunConfig};
use ntcir_common::{Dataset, JudgementSource};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Command-line arguments for ntcir-density
#[derive(Parser, Debug)]
#[command(name = "ntcir-density")]
#[command(about = "Fit positional relevance density estimators from NTCIR Math datasets")]
#[command(version)]
struct Args {
    /// Dataset directories, each prefixed with a unique single-letter label
    /// (e.g. "A=/some/path"). All datasets must be in the NTCIR-11 Math-2 and
    /// NTCIR-12 MathIR format.
    #[arg(long, num_args = 1.., value_name = "LABEL=PATH")]
    datasets: Vec<Dataset>,

    /// Relevance judgement files, each prefixed with the label of the judged
    /// dataset (e.g. "A:/some/path/judgement.dat")
    #[arg(long, num_args = 1.., value_name = "LABEL:PATH")]
    judgements: Vec<JudgementSource>,

    /// Where the estimator bundle is written [default: estimators.json]
    #[arg(long, value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Number of threads resolving paragraph positions [default: 1]
    #[arg(long)]
    num_workers: Option<usize>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug log file, written in addition to the terminal log
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_tracing(config: &RunConfig) -> Result<()> {
    let terminal_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .with_context(|| format!("Invalid log level {:?}", config.logging.level))?;

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(terminal_filter))
        .with(file_layer)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = RunConfig::resolve(ConfigOverrides {
        config_path: args.config,
        datasets: args.datasets,
        judgements: args.judgements,
        output_file: args.output_file,
        num_workers: args.num_workers,
        log_file: args.log_file,
    })
    .context("Failed to resolve configuration")?;

    init_tracing(&config)?;

    info!(
        "Starting ntcir-density v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match config.config_file() {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => debug!("No configuration file, using command-line arguments and defaults"),
    }
    for dataset in config.datasets() {
        info!("Dataset {}", dataset);
    }
    for judgement in config.judgements() {
        info!("Judgements {}", judgement);
    }
    info!("Workers: {}", config.num_workers);

    let report = ntcir_density::run(&config).context("Estimation failed")?;

    info!(
        "Done: P(relevant) = {:.6}, {} / {} positions, written to {}",
        report.bundle.prior_relevant,
        report.bundle.conditional_density.len(),
        report.bundle.prior_density.len(),
        report.output_file.display()
    );

    Ok(())
}
