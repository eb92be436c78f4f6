//! Season classification of a death month.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    /// October through March
    Cold,
    /// April through September
    Warm,
}

impl Season {
    /// Classify a calendar month (1-12). Returns `None` outside that range.
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            10..=12 | 1..=3 => Some(Season::Cold),
            4..=9 => Some(Season::Warm),
            _ => None,
        }
    }

    pub fn for_date(date: NaiveDate) -> Season {
        // chrono months are always 1-12
        Self::from_month(date.month()).unwrap_or(Season::Cold)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Cold => "Cold",
            Season::Warm => "Warm",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
