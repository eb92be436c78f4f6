//! Mortality Explorer - mortality linkage data analysis
//!
//! Loads a CenSoc-style linkage CSV, answers the descriptive queries, builds
//! the per-age and per-month aggregates and exports the charts.

mod charts;
mod config;
mod data;
mod pipeline;
mod report;
mod stats;

use anyhow::{Context, Result};
use clap::Parser;
use config::PipelineConfig;
use data::DEFAULT_SAMPLE_SIZE;
use pipeline::MortalityPipeline;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore a mortality linkage CSV", long_about = None)]
struct Cli {
    /// Linkage CSV (histid,byear,bmonth,dyear,dmonth,death_age,weight)
    input: Option<PathBuf>,

    /// TOML config file; command line values take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for charts and summary.json
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Aggregate a uniform sample of the reduced table (default 10000 rows)
    #[arg(long, num_args = 0..=1, default_missing_value = "10000")]
    sample: Option<usize>,

    /// Seed for a reproducible sample
    #[arg(long)]
    seed: Option<u64>,

    /// Skip chart and summary output
    #[arg(long)]
    no_charts: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.sample.is_some() {
            config.sample_size = self.sample;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_charts {
            config.charts.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    info!(input = %config.input.display(), sample = ?config.sample_size, "starting run");

    let report = MortalityPipeline::run(&config)
        .with_context(|| format!("pipeline failed for {}", config.input.display()))?;

    report::print_report(&report);
    Ok(())
}
