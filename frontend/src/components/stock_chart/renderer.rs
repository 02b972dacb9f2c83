//! # Price Chart Renderer
//!
//! Draws a filtered set of data points with plotters' SVG backend. The
//! result is the SVG markup for the chart container together with a hit map
//! of marker positions, which the component uses to find the marker under
//! the pointer.

use std::ops::Range;

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint};
use plotters::coord::Shift;
use plotters::prelude::*;
use shared::curve;
use shared::scale::{axis_to_date, date_to_axis};
use shared::{ChartConfig, ChartDomain, DataPoint};
use thiserror::Error;

pub const OPEN_COLOR: RGBColor = RGBColor(102, 126, 234);
pub const CLOSE_COLOR: RGBColor = RGBColor(196, 113, 237);
const AXIS_COLOR: RGBColor = RGBColor(68, 68, 68);
const LINE_WIDTH: u32 = 2;
const LABEL_FONT_SIZE: u32 = 10;
/// Gap between the x axis and the top of a day label
const DAY_LABEL_OFFSET: i32 = 8;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no data points match the current selection")]
    EmptySelection,
    #[error("failed to draw chart: {0}")]
    Drawing(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Drawing(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Open,
    Close,
}

impl Series {
    pub fn label(&self) -> &'static str {
        match self {
            Series::Open => "Open",
            Series::Close => "Close",
        }
    }

    pub fn color(&self) -> RGBColor {
        match self {
            Series::Open => OPEN_COLOR,
            Series::Close => CLOSE_COLOR,
        }
    }

    fn value(&self, point: &DataPoint) -> f64 {
        match self {
            Series::Open => point.open,
            Series::Close => point.close,
        }
    }
}

/// A drawn point marker, in pixels relative to the chart's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub series: Series,
    /// Index into the filtered set the chart was drawn from
    pub point_index: usize,
    pub x: i32,
    pub y: i32,
}

/// Marker positions in paint order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitMap {
    markers: Vec<Marker>,
    radius: i32,
}

impl HitMap {
    pub fn new(markers: Vec<Marker>, radius: i32) -> Self {
        Self { markers, radius }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Topmost marker covering the pixel at (`x`, `y`).
    ///
    /// Markers painted later sit on top, so the search runs back to front.
    pub fn hit(&self, x: f64, y: f64) -> Option<&Marker> {
        let radius = self.radius as f64;
        self.markers.iter().rev().find(|marker| {
            let dx = x - marker.x as f64;
            let dy = y - marker.y as f64;
            dx * dx + dy * dy <= radius * radius
        })
    }
}

#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub svg: String,
    pub hit_map: HitMap,
}

/// A day tick label, anchored at its pixel position below the x axis
#[derive(Debug, Clone, PartialEq)]
pub struct DayLabel {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

/// What [`draw_chart`] leaves behind besides the pixels it drew
#[derive(Debug, Clone)]
pub struct DrawnChart {
    pub hit_map: HitMap,
    pub day_labels: Vec<DayLabel>,
}

/// Continuous `f64` axis with its tick positions fixed up front.
///
/// The x axis ticks every calendar day and the y axis uses the nice price
/// ticks, so plotters must not pick its own key points.
#[derive(Debug, Clone)]
struct TickedAxis {
    range: Range<f64>,
    ticks: Vec<f64>,
}

impl TickedAxis {
    fn new(start: f64, end: f64, ticks: Vec<f64>) -> Self {
        Self {
            range: start..end,
            ticks,
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = self.range.end - self.range.start;
        let pixels = limit.1 - limit.0;
        if span == 0.0 || pixels == 0 {
            return limit.0 + pixels / 2;
        }
        let offset = pixels as f64 * (value - self.range.start) / span;
        // The y axis maps bottom-up, so its pixel span is negative
        if pixels > 0 {
            limit.0 + (offset + 1e-3).floor() as i32
        } else {
            limit.0 + (offset - 1e-3).ceil() as i32
        }
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        // Light points only feed the grid, which is disabled
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.range.clone()
    }
}

/// Render `points` into a standalone SVG document
pub fn render_svg(points: &[DataPoint], config: &ChartConfig) -> Result<RenderedChart, ChartError> {
    let domain = ChartDomain::from_points(points, config.y_tick_count).ok_or(ChartError::EmptySelection)?;

    let mut svg = String::new();
    let drawn = {
        let root = SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        let drawn = draw_chart(&root, points, &domain, config)?;
        root.present()?;
        drawn
    };

    // plotters only turns text by quarter turns, so the 45 degree day labels
    // are written straight into the document. They sit below the plot area,
    // so painting them last covers nothing.
    let labels = day_labels_svg(&drawn.day_labels);
    match svg.rfind("</svg>") {
        Some(end) => svg.insert_str(end, &labels),
        None => svg.push_str(&labels),
    }

    Ok(RenderedChart {
        svg,
        hit_map: drawn.hit_map,
    })
}

fn day_labels_svg(labels: &[DayLabel]) -> String {
    labels
        .iter()
        .map(|label| {
            format!(
                "<text x=\"{x}\" y=\"{y}\" transform=\"rotate(45 {x} {y})\" font-family=\"sans-serif\" font-size=\"{size}\" fill=\"rgb({r},{g},{b})\" dominant-baseline=\"hanging\">{text}</text>\n",
                x = label.x,
                y = label.y,
                size = LABEL_FONT_SIZE,
                r = AXIS_COLOR.0,
                g = AXIS_COLOR.1,
                b = AXIS_COLOR.2,
                text = label.text,
            )
        })
        .collect()
}

/// Draw axes, lines and markers onto any plotters drawing area.
///
/// Paint order: axes, open line, close line, open markers, close markers.
/// Day labels are returned rather than drawn; see [`render_svg`].
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[DataPoint],
    domain: &ChartDomain,
    config: &ChartConfig,
) -> Result<DrawnChart, ChartError> {
    root.fill(&WHITE)?;

    let (x_start, x_end) = domain.x_range();
    let x_ticks = domain.day_ticks();
    let x_tick_count = x_ticks.len();
    let y_ticks = domain.y_ticks(config.y_tick_count);
    let y_tick_count = y_ticks.len();
    let y_precision = domain.y_precision(config.y_tick_count);

    let mut chart = ChartBuilder::on(root)
        .margin_top(config.margin_top)
        .margin_right(config.margin_right)
        .x_label_area_size(config.margin_bottom)
        .y_label_area_size(config.margin_left)
        .build_cartesian_2d(
            TickedAxis::new(x_start, x_end, x_ticks.clone()),
            TickedAxis::new(domain.y_min, domain.y_max, y_ticks),
        )?;

    // Axes with tick marks only; day labels are placed separately
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(x_tick_count)
        .y_labels(y_tick_count)
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|v| format!("{:.*}", y_precision, v))
        .y_label_style(("sans-serif", LABEL_FONT_SIZE).into_font())
        .axis_style(&AXIS_COLOR)
        .draw()?;

    let day_labels = x_ticks
        .iter()
        .filter_map(|&tick| {
            let date = axis_to_date(tick)?;
            let (x, y) = chart.backend_coord(&(tick, domain.y_min));
            Some(DayLabel {
                x,
                y: y + DAY_LABEL_OFFSET,
                text: date.format("%b %d").to_string(),
            })
        })
        .collect();

    let series = [Series::Open, Series::Close];
    let paths: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| points.iter().map(|p| (date_to_axis(p.date), s.value(p))).collect())
        .collect();

    // Both lines go down before any marker so markers stay on top
    for (s, path) in series.iter().zip(&paths) {
        chart.draw_series(LineSeries::new(
            curve::cardinal(path),
            s.color().stroke_width(LINE_WIDTH),
        ))?;
    }

    let radius = config.marker_radius as i32;
    let mut markers = Vec::with_capacity(points.len() * series.len());
    for (s, path) in series.iter().zip(&paths) {
        chart.draw_series(
            path.iter()
                .map(|&coord| Circle::new(coord, radius, s.color().filled())),
        )?;
        // Recorded in the same order they were painted; HitMap relies on it
        markers.extend(path.iter().enumerate().map(|(point_index, coord)| {
            let (x, y) = chart.backend_coord(coord);
            Marker {
                series: *s,
                point_index,
                x,
                y,
            }
        }));
    }

    Ok(DrawnChart {
        hit_map: HitMap::new(markers, radius),
        day_labels,
    })
}


// Integration tests that require wasm-bindgen-test
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use chrono::NaiveDate;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_svg_mounts_into_container() {
        let document = gloo::utils::document();
        let container = document.create_element("div").unwrap();
        let points = vec![
            DataPoint::new("Apple", NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(), 100.0, 105.0),
            DataPoint::new("Apple", NaiveDate::from_ymd_opt(2023, 11, 2).unwrap(), 105.0, 103.0),
        ];

        let rendered = render_svg(&points, &ChartConfig::default()).unwrap();
        container.set_inner_html(&rendered.svg);
        assert_eq!(container.get_elements_by_tag_name("circle").length(), 4);

        container.set_inner_html("");
        assert_eq!(container.child_element_count(), 0);
    }
}
