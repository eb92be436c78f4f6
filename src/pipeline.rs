//! Mortality Pipeline
//! Ingestion, exploration, reshaping, aggregation and chart output, run in
//! sequence. Each stage consumes the table produced by the one before.

use crate::charts::{ChartError, SeriesAnimator, StaticChartRenderer};
use crate::config::PipelineConfig;
use crate::data::{DataProcessor, LoaderError, MortalityLoader, MortalityRecord, ProcessorError};
use crate::stats::{
    AgeCount, AgeSummary, BirthYearAverage, DateAggregate, MonthCount, StatsCalculator,
};
use polars::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const AGE_HISTOGRAM_FILE: &str = "age_histogram.png";
pub const DATE_SERIES_FILE: &str = "deaths_by_month.gif";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything one run produced.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub dropped_rows: usize,
    /// Rows of the reduced table that went into the aggregates
    pub analysed_rows: usize,
    pub sampled: bool,
    pub oldest: Vec<MortalityRecord>,
    pub highest_average_age: Vec<BirthYearAverage>,
    pub lowest_average_age: Vec<BirthYearAverage>,
    pub top_death_months: Vec<MonthCount>,
    pub age_summary: AgeSummary,
    pub age_histogram: Vec<AgeCount>,
    pub date_series: Vec<DateAggregate>,
    pub artifacts: Vec<PathBuf>,
}

pub struct MortalityPipeline;

impl MortalityPipeline {
    /// Load `config.input` and run every stage.
    pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
        let mut loader = MortalityLoader::new();
        loader.load_csv(&config.input)?;
        Self::run_loaded(loader, config)
    }

    /// Run every stage over an already-parsed raw table.
    pub fn run_on_frame(
        raw: DataFrame,
        config: &PipelineConfig,
    ) -> Result<PipelineReport, PipelineError> {
        let mut loader = MortalityLoader::new();
        loader.set_dataframe(raw)?;
        Self::run_loaded(loader, config)
    }

    fn run_loaded(
        mut loader: MortalityLoader,
        config: &PipelineConfig,
    ) -> Result<PipelineReport, PipelineError> {
        let raw_rows = loader.get_raw_row_count();
        let dropped_rows = loader.get_dropped_row_count();
        let clean_rows = loader.get_row_count();
        let cleaned = loader.take_dataframe()?;

        // Exploration
        let oldest = StatsCalculator::oldest_records(&cleaned, config.oldest_rows)?;
        let highest_average_age =
            StatsCalculator::highest_average_age(&cleaned, config.top_birth_years)?;
        let lowest_average_age =
            StatsCalculator::lowest_average_age(&cleaned, config.top_birth_years)?;
        let top_death_months =
            StatsCalculator::top_death_months(&cleaned, config.top_death_months)?;
        let age_summary = StatsCalculator::death_age_summary(&cleaned)?;
        info!(
            oldest = oldest.len(),
            highest = highest_average_age.len(),
            lowest = lowest_average_age.len(),
            months = top_death_months.len(),
            "exploration queries done"
        );

        // Reshaping
        let reduced = DataProcessor::reduce(&cleaned)?;
        let analysed = match config.sample_size {
            Some(n) => DataProcessor::sample(&reduced, n, config.seed)?,
            None => reduced,
        };

        // Aggregation
        let age_histogram = StatsCalculator::age_histogram(&analysed)?;
        let date_series = StatsCalculator::date_series(&analysed)?;
        info!(
            ages = age_histogram.len(),
            months = date_series.len(),
            rows = analysed.height(),
            "aggregates built"
        );

        let mut report = PipelineReport {
            raw_rows,
            clean_rows,
            dropped_rows,
            analysed_rows: analysed.height(),
            sampled: config.sample_size.is_some(),
            oldest,
            highest_average_age,
            lowest_average_age,
            top_death_months,
            age_summary,
            age_histogram,
            date_series,
            artifacts: Vec::new(),
        };

        // Visualization
        if config.charts.enabled {
            report.artifacts = Self::write_artifacts(&report, config)?;
        }

        Ok(report)
    }

    fn write_artifacts(
        report: &PipelineReport,
        config: &PipelineConfig,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let dir = &config.output_dir;
        fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut written = Vec::new();

        let histogram_path = dir.join(AGE_HISTOGRAM_FILE);
        match StaticChartRenderer::render_age_histogram(
            &report.age_histogram,
            &histogram_path,
            &config.charts,
        ) {
            Ok(()) => written.push(histogram_path),
            Err(ChartError::EmptyData(what)) => warn!("skipping {what}: no rows"),
            Err(e) => return Err(e.into()),
        }

        let series_path = dir.join(DATE_SERIES_FILE);
        match SeriesAnimator::render_date_series(&report.date_series, &series_path, &config.charts)
        {
            Ok(_) => written.push(series_path),
            Err(ChartError::EmptyData(what)) => warn!("skipping {what}: no rows"),
            Err(e) => return Err(e.into()),
        }

        let summary_path = dir.join(SUMMARY_FILE);
        Self::write_summary(report, &summary_path)?;
        written.push(summary_path);

        Ok(written)
    }

    fn write_summary(report: &PipelineReport, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "wrote summary");
        Ok(())
    }
}
