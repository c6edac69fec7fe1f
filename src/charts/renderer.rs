//! Bar Chart Renderer Module
//! Draws the per-column mean bar chart into an in-memory PNG.

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

/// Fixed chart title.
pub const CHART_TITLE: &str = "Average Values per Numeric Column";

/// Fixed canvas size, 10:5 aspect ratio.
pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 500;

const BAR_COLOR: RGBColor = RGBColor(91, 155, 213);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Invalid chart buffer")]
    Buffer,
}

/// A rendered chart plus its pixel dimensions.
///
/// The dimensions travel with the bytes because the workbook drawing anchor
/// needs them to place the image at native size.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Renders the per-column mean bar chart.
///
/// The drawing context lives entirely on the request stack; nothing is shared
/// between renders.
pub struct BarChartRenderer;

impl BarChartRenderer {
    /// Draw one vertical bar per mean entry, in entry order.
    ///
    /// An empty mean list still yields a valid PNG: title and axes on a blank
    /// canvas.
    pub fn render_means(means: &[(String, f64)]) -> Result<ChartImage, ChartError> {
        let mut buf = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];

        {
            let root = BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT))
                .into_drawing_area();
            root.fill(&WHITE).map_err(|e| ChartError::Draw(e.to_string()))?;

            let (y_min, y_max) = Self::y_range(means);
            let n = means.len().max(1) as u32;
            let labels: Vec<&str> = means.iter().map(|(name, _)| name.as_str()).collect();

            let mut chart = ChartBuilder::on(&root)
                .caption(CHART_TITLE, ("sans-serif", 28))
                .margin(12)
                .x_label_area_size(48)
                .y_label_area_size(64)
                .build_cartesian_2d((0u32..n).into_segmented(), y_min..y_max)
                .map_err(|e| ChartError::Draw(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(means.len().max(1))
                .x_label_formatter(&|seg| {
                    let idx = match seg {
                        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i as usize,
                        SegmentValue::Last => return String::new(),
                    };
                    labels.get(idx).map(|s| s.to_string()).unwrap_or_default()
                })
                .draw()
                .map_err(|e| ChartError::Draw(e.to_string()))?;

            chart
                .draw_series(means.iter().enumerate().map(|(i, (_, mean))| {
                    let left = SegmentValue::Exact(i as u32);
                    let right = SegmentValue::Exact(i as u32 + 1);
                    let mut bar = Rectangle::new([(left, 0.0), (right, *mean)], BAR_COLOR.filled());
                    bar.set_margin(0, 0, 10, 10);
                    bar
                }))
                .map_err(|e| ChartError::Draw(e.to_string()))?;

            root.present().map_err(|e| ChartError::Draw(e.to_string()))?;
        }

        let img =
            RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buf).ok_or(ChartError::Buffer)?;
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(ChartImage {
            png,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
        })
    }

    /// Y axis always spans zero so bar heights stay comparable; negative
    /// means extend the range downward.
    fn y_range(means: &[(String, f64)]) -> (f64, f64) {
        let mut min = 0.0f64;
        let mut max = 0.0f64;
        for (_, mean) in means {
            if mean.is_finite() {
                min = min.min(*mean);
                max = max.max(*mean);
            }
        }
        if min == max {
            max = min + 1.0;
        }
        let pad = (max - min) * 0.05;
        (if min < 0.0 { min - pad } else { min }, max + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_decodable_png() {
        let means = vec![("score".to_string(), 20.0)];
        let chart = BarChartRenderer::render_means(&means).unwrap();

        let decoded = image::load_from_memory(&chart.png).unwrap();
        assert_eq!(decoded.width(), CHART_WIDTH);
        assert_eq!(decoded.height(), CHART_HEIGHT);
    }

    #[test]
    fn empty_means_still_produce_a_valid_image() {
        let chart = BarChartRenderer::render_means(&[]).unwrap();
        assert_eq!(&chart.png[..8], b"\x89PNG\r\n\x1a\n");
        assert!(image::load_from_memory(&chart.png).is_ok());
    }

    #[test]
    fn negative_means_are_drawable() {
        let means = vec![
            ("loss".to_string(), -4.5),
            ("gain".to_string(), 7.25),
        ];
        assert!(BarChartRenderer::render_means(&means).is_ok());
    }

    #[test]
    fn y_range_always_spans_zero() {
        let (lo, hi) = BarChartRenderer::y_range(&[("a".to_string(), 5.0)]);
        assert!(lo <= 0.0 && hi >= 5.0);

        let (lo, hi) = BarChartRenderer::y_range(&[("a".to_string(), -3.0)]);
        assert!(lo <= -3.0 && hi >= 0.0);
    }
}
