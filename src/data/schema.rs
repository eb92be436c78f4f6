//! Record Schema Module
//! Column names, declared dtypes and the typed raw record.

use polars::prelude::*;
use serde::Serialize;

pub const HISTID: &str = "histid";
pub const BIRTH_YEAR: &str = "byear";
pub const BIRTH_MONTH: &str = "bmonth";
pub const DEATH_YEAR: &str = "dyear";
pub const DEATH_MONTH: &str = "dmonth";
pub const DEATH_AGE: &str = "death_age";
pub const WEIGHT: &str = "weight";

/// Derived columns of the reduced table
pub const DEATH_DATE: &str = "death_date";

/// Header order of the linkage file.
pub const COLUMNS: [&str; 7] = [
    HISTID,
    BIRTH_YEAR,
    BIRTH_MONTH,
    DEATH_YEAR,
    DEATH_MONTH,
    DEATH_AGE,
    WEIGHT,
];

/// Birth month value marking missing source data.
pub const BIRTH_MONTH_SENTINEL: i32 = 0;

/// Explicit per-column dtypes. Cells that do not parse as the declared
/// type fail the load instead of being coerced.
pub fn censoc_schema() -> Schema {
    let mut schema = Schema::with_capacity(COLUMNS.len());
    schema.with_column(HISTID.into(), DataType::String);
    for name in [BIRTH_YEAR, BIRTH_MONTH, DEATH_YEAR, DEATH_MONTH, DEATH_AGE] {
        schema.with_column(name.into(), DataType::Int32);
    }
    schema.with_column(WEIGHT.into(), DataType::Float64);
    schema
}

/// One row of the raw linkage table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MortalityRecord {
    pub histid: String,
    pub birth_year: i32,
    pub birth_month: i32,
    pub death_year: i32,
    pub death_month: i32,
    pub death_age: i32,
    pub weight: f64,
}

/// Extract typed records from a raw-schema DataFrame.
///
/// Rows holding a null in any column are skipped.
pub fn records_from_frame(df: &DataFrame) -> PolarsResult<Vec<MortalityRecord>> {
    let histid = df.column(HISTID)?.str()?;
    let byear = df.column(BIRTH_YEAR)?.i32()?;
    let bmonth = df.column(BIRTH_MONTH)?.i32()?;
    let dyear = df.column(DEATH_YEAR)?.i32()?;
    let dmonth = df.column(DEATH_MONTH)?.i32()?;
    let age = df.column(DEATH_AGE)?.i32()?;
    let weight = df.column(WEIGHT)?.f64()?;

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let (
            Some(histid),
            Some(birth_year),
            Some(birth_month),
            Some(death_year),
            Some(death_month),
            Some(death_age),
            Some(weight),
        ) = (
            histid.get(idx),
            byear.get(idx),
            bmonth.get(idx),
            dyear.get(idx),
            dmonth.get(idx),
            age.get(idx),
            weight.get(idx),
        )
        else {
            continue;
        };

        records.push(MortalityRecord {
            histid: histid.to_string(),
            birth_year,
            birth_month,
            death_year,
            death_month,
            death_age,
            weight,
        });
    }

    Ok(records)
}
