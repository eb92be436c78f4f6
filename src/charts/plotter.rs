//! Chart Plotter Module
//! Colors, axis bounds and animation frame layout shared by the renderers.

use crate::data::Season;
use crate::stats::AgeCount;
use chrono::NaiveDate;
use plotters::style::RGBColor;
use std::path::PathBuf;
use thiserror::Error;

/// Histogram bar color
pub const BAR_COLOR: RGBColor = RGBColor(91, 155, 213);
/// Cold season points (blue)
pub const COLD_COLOR: RGBColor = RGBColor(52, 152, 219);
/// Warm season points (red)
pub const WARM_COLOR: RGBColor = RGBColor(231, 76, 60);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Nothing to plot for {0}")]
    EmptyData(&'static str),
    #[error("Failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },
}

/// Layout helpers for the static and animated charts.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn season_color(season: Season) -> RGBColor {
        match season {
            Season::Cold => COLD_COLOR,
            Season::Warm => WARM_COLOR,
        }
    }

    /// Upper bound of a count axis: 10% headroom, never zero.
    pub fn count_axis_max(max_count: u64) -> u64 {
        (max_count + max_count / 10).max(max_count + 1)
    }

    /// Smallest and largest age present in the histogram.
    pub fn age_bounds(histogram: &[AgeCount]) -> Option<(i32, i32)> {
        let min = histogram.iter().map(|a| a.death_age).min()?;
        let max = histogram.iter().map(|a| a.death_age).max()?;
        Some((min, max))
    }

    /// Axis label for a month-granular date.
    pub fn month_label(date: NaiveDate) -> String {
        date.format("%Y-%m").to_string()
    }

    /// Number of points visible in each animation frame.
    ///
    /// Counts are strictly increasing and the last frame shows every point.
    /// At most `max_frames` frames are produced.
    pub fn reveal_frames(n_points: usize, max_frames: usize) -> Vec<usize> {
        if n_points == 0 {
            return Vec::new();
        }
        let frames = n_points.min(max_frames.max(1));
        (1..=frames)
            .map(|k| (k * n_points).div_ceil(frames))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_frame_per_point_when_series_is_short() {
        assert_eq!(ChartPlotter::reveal_frames(4, 100), vec![1, 2, 3, 4]);
    }

    #[test]
    fn long_series_is_revealed_in_bounded_steps() {
        let frames = ChartPlotter::reveal_frames(733, 100);
        assert_eq!(frames.len(), 100);
        assert_eq!(*frames.last().unwrap(), 733);
        assert!(frames.windows(2).all(|w| w[0] < w[1]));
        assert!(frames[0] >= 1);
    }

    #[test]
    fn empty_series_has_no_frames() {
        assert!(ChartPlotter::reveal_frames(0, 10).is_empty());
        assert_eq!(ChartPlotter::reveal_frames(3, 0), vec![3]);
    }

    #[test]
    fn count_axis_leaves_headroom() {
        assert_eq!(ChartPlotter::count_axis_max(0), 1);
        assert_eq!(ChartPlotter::count_axis_max(5), 6);
        assert_eq!(ChartPlotter::count_axis_max(200), 220);
    }

    #[test]
    fn season_colors_differ() {
        assert_ne!(
            ChartPlotter::season_color(Season::Cold),
            ChartPlotter::season_color(Season::Warm)
        );
    }

    #[test]
    fn age_bounds_and_labels() {
        let histogram = vec![
            AgeCount { death_age: 60, deaths: 2 },
            AgeCount { death_age: 62, deaths: 1 },
        ];
        assert_eq!(ChartPlotter::age_bounds(&histogram), Some((60, 62)));
        assert_eq!(ChartPlotter::age_bounds(&[]), None);

        let date = NaiveDate::from_ymd_opt(1942, 7, 1).unwrap();
        assert_eq!(ChartPlotter::month_label(date), "1942-07");
    }
}
