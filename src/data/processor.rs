//! Data Processor Module
//! Date derivation, projection to the reduced table, and down-sampling.

use super::schema::{DEATH_AGE, DEATH_DATE, DEATH_MONTH, DEATH_YEAR};
use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::info;

/// Rows drawn by `DataProcessor::sample` when no size is given.
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid death month {month} for year {year}")]
    InvalidDeathMonth { year: i32, month: i32 },
}

/// Handles reshaping of the cleaned record table.
pub struct DataProcessor;

impl DataProcessor {
    /// First day of the given death year/month.
    ///
    /// The source carries no day of month; day 1 is a fixed label, so any
    /// statistic keyed on the date is a per-month statistic.
    pub fn derive_death_date(year: i32, month: i32) -> Result<NaiveDate, ProcessorError> {
        u32::try_from(month)
            .ok()
            .and_then(|m| NaiveDate::from_ymd_opt(year, m, 1))
            .ok_or(ProcessorError::InvalidDeathMonth { year, month })
    }

    /// Project the cleaned table to `[death_date, death_age]`.
    ///
    /// Rows with a null death year or month get a null date.
    pub fn reduce(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let years = df.column(DEATH_YEAR)?.i32()?;
        let months = df.column(DEATH_MONTH)?.i32()?;

        let mut dates: Vec<Option<NaiveDate>> = Vec::with_capacity(df.height());
        for (year, month) in years.into_iter().zip(months.into_iter()) {
            let date = match (year, month) {
                (Some(year), Some(month)) => Some(Self::derive_death_date(year, month)?),
                _ => None,
            };
            dates.push(date);
        }

        let death_date: Column =
            DateChunked::from_naive_date_options(DEATH_DATE.into(), dates)
                .into_series()
                .into();
        let death_age = df.column(DEATH_AGE)?.clone();

        let reduced = DataFrame::new(vec![death_date, death_age])?;
        info!(rows = reduced.height(), "reduced to death_date/death_age");
        Ok(reduced)
    }

    /// Uniform sample of `n` rows without replacement.
    ///
    /// Asking for more rows than the table holds returns every row, shuffled.
    /// Without a seed the sample differs between runs.
    pub fn sample(df: &DataFrame, n: usize, seed: Option<u64>) -> Result<DataFrame, ProcessorError> {
        let n = n.min(df.height());
        let sampled = df.sample_n_literal(n, false, true, seed)?;
        info!(requested = n, rows = sampled.height(), ?seed, "sampled rows");
        Ok(sampled)
    }

    /// Read the date column of a reduced/aggregated frame back as chrono dates.
    pub fn death_dates(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>, ProcessorError> {
        Ok(df.column(DEATH_DATE)?.date()?.as_date_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn derived_date_is_first_of_month() {
        for year in [1941, 1942, 1999, 2005] {
            for month in 1..=12 {
                let date = DataProcessor::derive_death_date(year, month).unwrap();
                assert_eq!(date.day(), 1);
                assert_eq!(date.year(), year);
                assert_eq!(date.month() as i32, month);
            }
        }
    }

    #[test]
    fn month_outside_calendar_is_rejected() {
        for month in [0, 13, -1] {
            assert!(matches!(
                DataProcessor::derive_death_date(1942, month),
                Err(ProcessorError::InvalidDeathMonth { .. })
            ));
        }
    }

    #[test]
    fn reduce_keeps_year_and_month_of_every_row() {
        let df = df!(
            "histid" => ["a", "b", "c"],
            DEATH_YEAR => [1942i32, 1942, 2003],
            DEATH_MONTH => [1i32, 7, 12],
            DEATH_AGE => [62i32, 60, 91]
        )
        .unwrap();

        let reduced = DataProcessor::reduce(&df).unwrap();
        assert_eq!(reduced.get_column_names_str(), vec![DEATH_DATE, DEATH_AGE]);
        assert_eq!(reduced.column(DEATH_DATE).unwrap().dtype(), &DataType::Date);

        let dates = DataProcessor::death_dates(&reduced).unwrap();
        let expected = [(1942, 1), (1942, 7), (2003, 12)];
        for (date, (year, month)) in dates.iter().zip(expected) {
            let date = date.unwrap();
            assert_eq!((date.year(), date.month(), date.day()), (year, month, 1));
        }
    }

    #[test]
    fn reduce_handles_pre_epoch_and_missing_dates() {
        let df = df!(
            DEATH_YEAR => [Some(1875i32), None],
            DEATH_MONTH => [6i32, 3],
            DEATH_AGE => [70i32, 71]
        )
        .unwrap();

        let reduced = DataProcessor::reduce(&df).unwrap();
        let dates = DataProcessor::death_dates(&reduced).unwrap();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(1875, 6, 1), None]);
    }

    #[test]
    fn reduce_fails_on_invalid_death_month() {
        let df = df!(
            DEATH_YEAR => [1942i32],
            DEATH_MONTH => [13i32],
            DEATH_AGE => [62i32]
        )
        .unwrap();
        assert!(DataProcessor::reduce(&df).is_err());
    }

    #[test]
    fn sample_draws_requested_rows_without_duplicates() {
        let ids: Vec<String> = (0..25_000).map(|i| format!("id{i}")).collect();
        let ages: Vec<i32> = (0..25_000).map(|i| 40 + i % 60).collect();
        let df = df!("histid" => ids, DEATH_AGE => ages).unwrap();

        let sampled = DataProcessor::sample(&df, DEFAULT_SAMPLE_SIZE, None).unwrap();
        assert_eq!(sampled.height(), DEFAULT_SAMPLE_SIZE);
        let unique = sampled
            .column("histid")
            .unwrap()
            .as_materialized_series()
            .n_unique()
            .unwrap();
        assert_eq!(unique, DEFAULT_SAMPLE_SIZE);
    }

    #[test]
    fn seeded_sample_is_reproducible() {
        let df = df!("histid" => (0..500).map(|i| format!("id{i}")).collect::<Vec<_>>()).unwrap();
        let a = DataProcessor::sample(&df, 50, Some(7)).unwrap();
        let b = DataProcessor::sample(&df, 50, Some(7)).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn oversized_sample_returns_whole_table() {
        let df = df!("histid" => ["a", "b", "c"]).unwrap();
        let sampled = DataProcessor::sample(&df, DEFAULT_SAMPLE_SIZE, None).unwrap();
        assert_eq!(sampled.height(), 3);
    }
}
