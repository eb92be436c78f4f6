//! CSV Data Loader Module
//! Loads the linkage file with an explicit schema and drops sentinel rows.

use super::schema::{censoc_schema, BIRTH_MONTH, BIRTH_MONTH_SENTINEL, COLUMNS};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unexpected header in {path}: expected [{expected}], found [{found}]")]
    HeaderMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("Column {column} has {nulls} empty or missing values in {path}")]
    MissingValues {
        path: PathBuf,
        column: String,
        nulls: usize,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Loads the mortality linkage CSV with declared column types.
pub struct MortalityLoader {
    df: Option<DataFrame>,
    raw_rows: usize,
}

impl Default for MortalityLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MortalityLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            raw_rows: 0,
        }
    }

    /// Load and clean a CSV file.
    ///
    /// A cell that does not parse as its declared type aborts the load, and
    /// so does an empty cell in any column.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<&DataFrame, LoaderError> {
        let path = file_path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }
        Self::validate_header(path)?;

        let raw = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_schema(Some(Arc::new(censoc_schema())))
            .with_ignore_errors(false)
            .finish()?
            .collect()?;
        Self::reject_missing_values(path, &raw)?;
        info!(path = %path.display(), rows = raw.height(), "loaded linkage file");

        self.set_dataframe(raw)?;
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Clean an already-parsed table and keep it as the loaded frame.
    pub fn set_dataframe(&mut self, raw: DataFrame) -> Result<(), LoaderError> {
        self.raw_rows = raw.height();
        let cleaned = Self::clean(raw)?;
        info!(
            kept = cleaned.height(),
            dropped = self.dropped_rows_for(&cleaned),
            "dropped rows with invalid birth month"
        );
        self.df = Some(cleaned);
        Ok(())
    }

    /// Drop every row whose birth month is the sentinel (or null, in frames
    /// not read from a file).
    pub fn clean(df: DataFrame) -> PolarsResult<DataFrame> {
        df.lazy()
            .filter(col(BIRTH_MONTH).neq(lit(BIRTH_MONTH_SENTINEL)))
            .collect()
    }

    /// The CSV reader turns empty cells into nulls even with errors enabled.
    fn reject_missing_values(path: &Path, df: &DataFrame) -> Result<(), LoaderError> {
        for name in COLUMNS {
            let nulls = df.column(name)?.null_count();
            if nulls > 0 {
                return Err(LoaderError::MissingValues {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                    nulls,
                });
            }
        }
        Ok(())
    }

    fn validate_header(path: &Path) -> Result<(), LoaderError> {
        let io_err = |source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let mut first_line = String::new();
        BufReader::new(file)
            .read_line(&mut first_line)
            .map_err(io_err)?;

        let found: Vec<String> = first_line
            .trim_start_matches('\u{feff}')
            .trim_end()
            .split(',')
            .map(|name| name.trim().trim_matches('"').to_string())
            .collect();
        debug!(?found, "header columns");

        if found.iter().map(String::as_str).eq(COLUMNS.iter().copied()) {
            Ok(())
        } else {
            Err(LoaderError::HeaderMismatch {
                path: path.to_path_buf(),
                expected: COLUMNS.join(","),
                found: found.join(","),
            })
        }
    }

    fn dropped_rows_for(&self, cleaned: &DataFrame) -> usize {
        self.raw_rows.saturating_sub(cleaned.height())
    }

    /// Rows in the file before cleaning.
    pub fn get_raw_row_count(&self) -> usize {
        self.raw_rows
    }

    /// Rows removed by the birth-month filter.
    pub fn get_dropped_row_count(&self) -> usize {
        self.df
            .as_ref()
            .map(|df| self.dropped_rows_for(df))
            .unwrap_or(0)
    }

    /// Get the number of rows in the cleaned DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Move the cleaned DataFrame out of the loader.
    pub fn take_dataframe(&mut self) -> Result<DataFrame, LoaderError> {
        self.df.take().ok_or(LoaderError::NoData)
    }
}
