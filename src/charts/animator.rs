//! Animated Series Renderer
//! Writes the per-month death series as a GIF that reveals points over time.

use crate::charts::plotter::{ChartError, ChartPlotter};
use crate::config::ChartConfig;
use crate::data::Season;
use crate::stats::DateAggregate;
use plotters::prelude::*;
use std::path::Path;
use tracing::{debug, info};

pub struct SeriesAnimator;

impl SeriesAnimator {
    /// Render the date series, one frame per reveal step.
    ///
    /// Returns the number of frames written.
    pub fn render_date_series(
        series: &[DateAggregate],
        path: &Path,
        config: &ChartConfig,
    ) -> Result<usize, ChartError> {
        let frames = ChartPlotter::reveal_frames(series.len(), config.max_frames);
        if frames.is_empty() {
            return Err(ChartError::EmptyData("date series"));
        }

        Self::draw_frames(series, &frames, path, config).map_err(|e| ChartError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), points = series.len(), frames = frames.len(), "wrote date series animation");
        Ok(frames.len())
    }

    fn draw_frames(
        series: &[DateAggregate],
        frames: &[usize],
        path: &Path,
        config: &ChartConfig,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::gif(path, (config.width, config.height), config.frame_delay_ms)?
            .into_drawing_area();

        let labels: Vec<String> = series
            .iter()
            .map(|d| ChartPlotter::month_label(d.death_date))
            .collect();
        let max_total = series.iter().map(|d| d.total).max().unwrap_or(0);
        let y_max = ChartPlotter::count_axis_max(max_total);
        let x_max = series.len() as i32;

        for &visible in frames {
            root.fill(&WHITE)?;
            let shown = &series[..visible];

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    format!("Deaths per Month (through {})", labels[visible - 1]),
                    ("sans-serif", 24),
                )
                .margin(12)
                .x_label_area_size(45)
                .y_label_area_size(70)
                .build_cartesian_2d(0i32..x_max, 0u64..y_max)?;

            chart
                .configure_mesh()
                .x_labels(8)
                .x_label_formatter(&|idx: &i32| {
                    labels.get(*idx as usize).cloned().unwrap_or_default()
                })
                .x_desc("Month of death")
                .y_desc("Deaths")
                .draw()?;

            chart.draw_series(LineSeries::new(
                shown.iter().enumerate().map(|(i, d)| (i as i32, d.total)),
                BLACK.mix(0.3).stroke_width(1),
            ))?;

            for season in [Season::Cold, Season::Warm] {
                let color = ChartPlotter::season_color(season);
                chart
                    .draw_series(
                        shown
                            .iter()
                            .enumerate()
                            .filter(|(_, d)| d.season == season)
                            .map(|(i, d)| Circle::new((i as i32, d.total), 3, color.filled())),
                    )?
                    .label(season.as_str())
                    .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;

            root.present()?;
            debug!(visible, "frame written");
        }

        Ok(())
    }
}
