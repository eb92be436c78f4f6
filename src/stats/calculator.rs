//! Statistics Calculator Module
//! Descriptive queries over the cleaned table and chart aggregates over the
//! reduced table.

use crate::data::schema::{
    records_from_frame, BIRTH_YEAR, DEATH_AGE, DEATH_DATE, DEATH_MONTH,
};
use crate::data::{DataProcessor, MortalityRecord, ProcessorError, Season};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::cmp::Ordering;

/// Groups returned by the birth-year average queries.
pub const DEFAULT_TOP_BIRTH_YEARS: usize = 2;
/// Groups returned by the death-month count query.
pub const DEFAULT_TOP_DEATH_MONTHS: usize = 4;

const AVG_DEATH_AGE: &str = "avg_death_age";
const DEATHS: &str = "deaths";

/// Mean death age of one birth-year cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BirthYearAverage {
    pub birth_year: i32,
    pub avg_death_age: f64,
    pub records: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub death_month: i32,
    pub deaths: u64,
}

/// One bar of the age histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeCount {
    pub death_age: i32,
    pub deaths: u64,
}

/// One point of the date series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateAggregate {
    pub death_date: NaiveDate,
    pub total: u64,
    pub avg_age: f64,
    pub season: Season,
}

/// Descriptive statistics of death age.
#[derive(Debug, Clone, Serialize)]
pub struct AgeSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p05: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for AgeSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            p05: f64::NAN,
            p95: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Keep the first `n` items after sorting by `key`, plus every later item
/// whose key equals the key of the n-th item.
///
/// Float keys compare exactly.
pub fn top_n_with_ties<T, K, F>(mut items: Vec<T>, n: usize, descending: bool, key: F) -> Vec<T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    if n == 0 {
        return Vec::new();
    }

    items.sort_by(|a, b| {
        let ord = key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    if items.len() <= n {
        return items;
    }

    let boundary = key(&items[n - 1]);
    let keep = n + items[n..]
        .iter()
        .take_while(|item| key(item) == boundary)
        .count();
    items.truncate(keep);
    items
}

/// Handles the grouping queries of the pipeline.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Records with the highest death age first. Equal ages keep file order.
    pub fn oldest_records(df: &DataFrame, n: usize) -> PolarsResult<Vec<MortalityRecord>> {
        let sorted = df.sort(
            [DEATH_AGE],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )?;
        records_from_frame(&sorted.head(Some(n)))
    }

    /// Mean death age per birth year, ordered by birth year.
    pub fn average_age_by_birth_year(df: &DataFrame) -> PolarsResult<Vec<BirthYearAverage>> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col(BIRTH_YEAR)])
            .agg([
                col(DEATH_AGE).mean().alias(AVG_DEATH_AGE),
                len().cast(DataType::UInt64).alias(DEATHS),
            ])
            .sort([BIRTH_YEAR], SortMultipleOptions::default())
            .collect()?;

        let years = grouped.column(BIRTH_YEAR)?.i32()?;
        let means = grouped.column(AVG_DEATH_AGE)?.f64()?;
        let counts = grouped.column(DEATHS)?.u64()?;

        Ok(years
            .into_iter()
            .zip(means.into_iter())
            .zip(counts.into_iter())
            .filter_map(|((year, mean), count)| {
                Some(BirthYearAverage {
                    birth_year: year?,
                    avg_death_age: mean?,
                    records: count?,
                })
            })
            .collect())
    }

    /// Birth years with the highest mean death age (ties at the cut included).
    pub fn highest_average_age(df: &DataFrame, n: usize) -> PolarsResult<Vec<BirthYearAverage>> {
        let groups = Self::average_age_by_birth_year(df)?;
        Ok(top_n_with_ties(groups, n, true, |g| g.avg_death_age))
    }

    /// Birth years with the lowest mean death age (ties at the cut included).
    pub fn lowest_average_age(df: &DataFrame, n: usize) -> PolarsResult<Vec<BirthYearAverage>> {
        let groups = Self::average_age_by_birth_year(df)?;
        Ok(top_n_with_ties(groups, n, false, |g| g.avg_death_age))
    }

    /// Death count per calendar month of death, ordered by month.
    pub fn deaths_by_month(df: &DataFrame) -> PolarsResult<Vec<MonthCount>> {
        let grouped = Self::count_by(df, DEATH_MONTH)?;
        let months = grouped.column(DEATH_MONTH)?.i32()?;
        let counts = grouped.column(DEATHS)?.u64()?;

        Ok(months
            .into_iter()
            .zip(counts.into_iter())
            .filter_map(|(month, count)| {
                Some(MonthCount {
                    death_month: month?,
                    deaths: count?,
                })
            })
            .collect())
    }

    /// Months with the most deaths (ties at the cut included).
    pub fn top_death_months(df: &DataFrame, n: usize) -> PolarsResult<Vec<MonthCount>> {
        let months = Self::deaths_by_month(df)?;
        Ok(top_n_with_ties(months, n, true, |m| m.deaths))
    }

    /// Deaths per age over the reduced table, ordered by age.
    ///
    /// Ages with no deaths are absent.
    pub fn age_histogram(reduced: &DataFrame) -> PolarsResult<Vec<AgeCount>> {
        let grouped = Self::count_by(reduced, DEATH_AGE)?;
        let ages = grouped.column(DEATH_AGE)?.i32()?;
        let counts = grouped.column(DEATHS)?.u64()?;

        Ok(ages
            .into_iter()
            .zip(counts.into_iter())
            .filter_map(|(age, count)| {
                Some(AgeCount {
                    death_age: age?,
                    deaths: count?,
                })
            })
            .collect())
    }

    /// Deaths and mean age per death month, ordered by date, with season.
    pub fn date_series(reduced: &DataFrame) -> Result<Vec<DateAggregate>, ProcessorError> {
        let grouped = reduced
            .clone()
            .lazy()
            .filter(col(DEATH_DATE).is_not_null())
            .group_by([col(DEATH_DATE)])
            .agg([
                len().cast(DataType::UInt64).alias(DEATHS),
                col(DEATH_AGE).mean().alias(AVG_DEATH_AGE),
            ])
            .sort([DEATH_DATE], SortMultipleOptions::default())
            .collect()?;

        let dates = DataProcessor::death_dates(&grouped)?;
        let totals = grouped.column(DEATHS)?.u64()?;
        let means = grouped.column(AVG_DEATH_AGE)?.f64()?;

        Ok(dates
            .into_iter()
            .zip(totals.into_iter())
            .zip(means.into_iter())
            .filter_map(|((date, total), mean)| {
                let death_date = date?;
                Some(DateAggregate {
                    death_date,
                    total: total?,
                    avg_age: mean.unwrap_or(f64::NAN),
                    season: Season::for_date(death_date),
                })
            })
            .collect())
    }

    /// Descriptive statistics of the `death_age` column.
    pub fn death_age_summary(df: &DataFrame) -> PolarsResult<AgeSummary> {
        let ages: Vec<f64> = df
            .column(DEATH_AGE)?
            .i32()?
            .into_iter()
            .flatten()
            .map(f64::from)
            .collect();
        Ok(Self::compute_descriptive_stats(&ages))
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> AgeSummary {
        let n = values.len();
        if n == 0 {
            return AgeSummary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        AgeSummary {
            count: n,
            mean: values.iter().mean(),
            median: Self::percentile(&sorted, 50.0),
            std,
            p05: Self::percentile(&sorted, 5.0),
            p95: Self::percentile(&sorted, 95.0),
            min: sorted[0],
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    fn count_by(df: &DataFrame, key: &str) -> PolarsResult<DataFrame> {
        df.clone()
            .lazy()
            .group_by([col(key)])
            .agg([len().cast(DataType::UInt64).alias(DEATHS)])
            .sort([key], SortMultipleOptions::default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{BIRTH_MONTH, DEATH_YEAR, HISTID, WEIGHT};

    fn raw_frame() -> DataFrame {
        df!(
            HISTID => ["a", "b", "c", "d", "e", "f"],
            BIRTH_YEAR => [1880i32, 1880, 1881, 1882, 1883, 1883],
            BIRTH_MONTH => [3i32, 4, 5, 7, 2, 9],
            DEATH_YEAR => [1942i32, 1950, 1942, 1942, 1943, 1960],
            DEATH_MONTH => [1i32, 1, 1, 7, 1, 12],
            DEATH_AGE => [62i32, 70, 61, 60, 60, 77],
            WEIGHT => [1.0f64, 1.0, 1.0, 1.0, 1.0, 1.0]
        )
        .unwrap()
    }

    #[test]
    fn top_n_includes_every_tie_at_the_boundary() {
        let values = vec![("a", 3.5), ("b", 9.0), ("c", 3.5), ("d", 1.0), ("e", 3.5)];
        let top = top_n_with_ties(values, 2, true, |v| v.1);
        let names: Vec<&str> = top.iter().map(|v| v.0).collect();
        assert_eq!(names, vec!["b", "a", "c", "e"]);
    }

    #[test]
    fn top_n_handles_short_and_empty_inputs() {
        assert!(top_n_with_ties(vec![1, 2, 3], 0, true, |v| *v).is_empty());
        assert_eq!(top_n_with_ties(vec![2, 1], 5, false, |v| *v), vec![1, 2]);
        assert!(top_n_with_ties(Vec::<i32>::new(), 3, true, |v| *v).is_empty());
    }

    #[test]
    fn oldest_records_are_sorted_by_age() {
        let oldest = StatsCalculator::oldest_records(&raw_frame(), 2).unwrap();
        let ages: Vec<i32> = oldest.iter().map(|r| r.death_age).collect();
        assert_eq!(ages, vec![77, 70]);
        assert_eq!(oldest[0].histid, "f");
    }

    #[test]
    fn birth_year_averages() {
        let groups = StatsCalculator::average_age_by_birth_year(&raw_frame()).unwrap();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].birth_year, 1880);
        assert_eq!(groups[0].avg_death_age, 66.0);
        assert_eq!(groups[0].records, 2);

        let highest = StatsCalculator::highest_average_age(&raw_frame(), 2).unwrap();
        let years: Vec<i32> = highest.iter().map(|g| g.birth_year).collect();
        assert_eq!(years, vec![1883, 1880]);

        let lowest = StatsCalculator::lowest_average_age(&raw_frame(), 1).unwrap();
        assert_eq!(lowest[0].birth_year, 1882);
    }

    #[test]
    fn lowest_average_keeps_tied_cohorts() {
        let df = df!(
            BIRTH_YEAR => [1900i32, 1901, 1902, 1903],
            DEATH_AGE => [50i32, 50, 50, 90]
        )
        .unwrap();
        let lowest = StatsCalculator::lowest_average_age(&df, 2).unwrap();
        let years: Vec<i32> = lowest.iter().map(|g| g.birth_year).collect();
        assert_eq!(years, vec![1900, 1901, 1902]);
    }

    #[test]
    fn death_month_counts() {
        let months = StatsCalculator::deaths_by_month(&raw_frame()).unwrap();
        assert_eq!(
            months,
            vec![
                MonthCount { death_month: 1, deaths: 4 },
                MonthCount { death_month: 7, deaths: 1 },
                MonthCount { death_month: 12, deaths: 1 },
            ]
        );

        let top = StatsCalculator::top_death_months(&raw_frame(), 2).unwrap();
        let top_months: Vec<i32> = top.iter().map(|m| m.death_month).collect();
        assert_eq!(top_months, vec![1, 7, 12]);
    }

    #[test]
    fn histogram_counts_sum_to_row_count() {
        let reduced = DataProcessor::reduce(&raw_frame()).unwrap();
        let histogram = StatsCalculator::age_histogram(&reduced).unwrap();
        let total: u64 = histogram.iter().map(|a| a.deaths).sum();
        assert_eq!(total as usize, reduced.height());
        assert!(histogram.windows(2).all(|w| w[0].death_age < w[1].death_age));
    }

    #[test]
    fn date_series_labels_season_per_month() {
        let reduced = DataProcessor::reduce(&raw_frame()).unwrap();
        let series = StatsCalculator::date_series(&reduced).unwrap();

        let first = &series[0];
        assert_eq!(first.death_date, NaiveDate::from_ymd_opt(1942, 1, 1).unwrap());
        assert_eq!(first.total, 2);
        assert_eq!(first.avg_age, 61.5);
        assert_eq!(first.season, Season::Cold);

        let july = &series[1];
        assert_eq!(july.death_date, NaiveDate::from_ymd_opt(1942, 7, 1).unwrap());
        assert_eq!(july.season, Season::Warm);

        assert!(series.windows(2).all(|w| w[0].death_date < w[1].death_date));
        let total: u64 = series.iter().map(|d| d.total).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn descriptive_stats_of_death_age() {
        let summary = StatsCalculator::death_age_summary(&raw_frame()).unwrap();
        assert_eq!(summary.count, 6);
        assert!((summary.mean - 65.0).abs() < 1e-9);
        assert_eq!(summary.median, 61.5);
        assert_eq!(summary.min, 60.0);
        assert_eq!(summary.max, 77.0);
        assert!(summary.std > 0.0);
    }

    #[test]
    fn empty_values_give_nan_summary() {
        let summary = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_nan());
    }
}
