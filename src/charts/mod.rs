//! Charts module - Chart rendering

mod animator;
mod plotter;
mod renderer;

pub use animator::SeriesAnimator;
pub use plotter::ChartError;
pub use renderer::StaticChartRenderer;
