//! Static Chart Renderer
//! Writes the age-at-death histogram as a PNG bar chart.

use crate::charts::plotter::{ChartError, ChartPlotter, BAR_COLOR};
use crate::config::ChartConfig;
use crate::stats::AgeCount;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one bar per age (x = age, y = deaths).
    pub fn render_age_histogram(
        histogram: &[AgeCount],
        path: &Path,
        config: &ChartConfig,
    ) -> Result<(), ChartError> {
        let (min_age, max_age) =
            ChartPlotter::age_bounds(histogram).ok_or(ChartError::EmptyData("age histogram"))?;

        Self::draw_age_histogram(histogram, path, config, min_age, max_age).map_err(|e| {
            ChartError::Render {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        info!(path = %path.display(), bars = histogram.len(), "wrote age histogram");
        Ok(())
    }

    fn draw_age_histogram(
        histogram: &[AgeCount],
        path: &Path,
        config: &ChartConfig,
        min_age: i32,
        max_age: i32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_deaths = histogram.iter().map(|a| a.deaths).max().unwrap_or(0);
        let y_max = ChartPlotter::count_axis_max(max_deaths);

        let mut chart = ChartBuilder::on(&root)
            .caption("Deaths by Age at Death", ("sans-serif", 28))
            .margin(12)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d((min_age..max_age + 1).into_segmented(), 0u64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(BLACK.mix(0.15))
            .x_desc("Age at death")
            .y_desc("Deaths")
            .axis_desc_style(("sans-serif", 16))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(1)
                .data(histogram.iter().map(|a| (a.death_age, a.deaths))),
        )?;

        root.present()?;
        Ok(())
    }
}
