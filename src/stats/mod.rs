//! Stats module - grouping queries and aggregates

mod calculator;

pub use calculator::{
    AgeCount, AgeSummary, BirthYearAverage, DateAggregate, MonthCount,
    StatsCalculator, DEFAULT_TOP_BIRTH_YEARS, DEFAULT_TOP_DEATH_MONTHS,
};
