//! Charts module - bar chart rendering

mod renderer;

pub use renderer::{BarChartRenderer, ChartError, ChartImage, CHART_TITLE};
