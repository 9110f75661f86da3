use std::f64::consts::TAU;

use tracing::trace;

use crate::core::{BarSeries, DataSeries, Point, Projection, Rect, SeriesSet, band_fill_path};
use crate::error::ChartResult;
use crate::price_style::PlotShape;
use crate::render::{
    Color, LinePrimitive, PolygonPrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign,
    TextPrimitive,
};

use super::Chart;
use super::config::ChartColors;
use super::objects::{ChartPanelObject, MarkerShape, ObjectGeometry, PanelObjectKind};
use super::panel::ChartPanel;

const GRID_LINE_WIDTH: f64 = 1.0;
const SERIES_LINE_WIDTH: f64 = 1.5;
const BODY_WIDTH_RATIO: f64 = 0.6;
const VALUE_LABEL_OFFSET: f64 = 4.0;
const DOT_SEGMENTS: usize = 16;
const SELECTION_HANDLE: f64 = 6.0;

impl<R: Renderer> Chart<R> {
    /// Materializes the primitives of one draw pass from the current layout.
    pub fn build_render_frame(&self) -> ChartResult<RenderFrame> {
        let viewport = self.config.viewport;
        let colors = self.config.colors;
        let metrics = self.config.text_metrics;
        let mut frame = RenderFrame::new(viewport);
        frame.push_rect(RectPrimitive::filled(viewport.bounds(), colors.background));

        let plot = self.plot_frame();
        let date_axis = self.date_axis_frame();
        for tick in self.date_calibrator.major_ticks() {
            frame.push_line(LinePrimitive::new(
                Point::new(tick.x, plot.top),
                Point::new(tick.x, plot.bottom()),
                GRID_LINE_WIDTH,
                colors.grid,
            ));
            frame.push_text(TextPrimitive::new(
                tick.text.clone(),
                Point::new(tick.text_x, date_axis.top + metrics.font_size),
                metrics.font_size,
                colors.axis_text,
                tick.text_align,
            ));
        }
        frame.push_line(LinePrimitive::new(
            Point::new(plot.left, plot.bottom()),
            Point::new(plot.right(), plot.bottom()),
            GRID_LINE_WIDTH,
            colors.axis_text,
        ));
        frame.push_line(LinePrimitive::new(
            Point::new(plot.right(), plot.top),
            Point::new(plot.right(), plot.bottom()),
            GRID_LINE_WIDTH,
            colors.axis_text,
        ));

        let window = self.visible_data_window();
        for (index, panel) in self.panels.iter().enumerate() {
            self.append_panel_grid(&mut frame, panel, index + 1 < self.panels.len());
            let Some(projection) = self.projection(index) else {
                continue;
            };
            if let Some((start, count)) = window {
                append_bands(&mut frame, panel, &self.series, &projection, start, count, colors);
                if panel.shows_price() {
                    self.append_price(&mut frame, panel, &projection, start, count);
                }
                for name in panel.plots() {
                    if let Some(series) = self.series.get(name) {
                        append_series_line(&mut frame, series, &projection, start, count, colors.line);
                    }
                }
            }
            append_objects(&mut frame, panel, &projection, colors);
        }

        frame.validate()?;
        trace!(primitives = frame.primitive_count(), "render frame built");
        Ok(frame)
    }

    /// Lays the chart out, then draws it through the renderer.
    pub fn render(&mut self) -> ChartResult<()> {
        self.layout()?;
        let frame = self.build_render_frame()?;
        self.renderer.render(&frame)
    }

    fn append_panel_grid(&self, frame: &mut RenderFrame, panel: &ChartPanel, separator: bool) {
        let colors = self.config.colors;
        let metrics = self.config.text_metrics;
        let content = panel.content_frame();
        for tick in panel.value_calibrator().major_ticks() {
            frame.push_line(LinePrimitive::new(
                Point::new(content.left, tick.y),
                Point::new(content.right(), tick.y),
                GRID_LINE_WIDTH,
                colors.grid,
            ));
            frame.push_text(TextPrimitive::new(
                tick.text.clone(),
                Point::new(content.right() + VALUE_LABEL_OFFSET, tick.y + metrics.font_size / 3.0),
                metrics.font_size,
                colors.axis_text,
                TextHAlign::Left,
            ));
        }
        if separator {
            let frame_rect = panel.frame();
            frame.push_line(LinePrimitive::new(
                Point::new(frame_rect.left, frame_rect.bottom()),
                Point::new(frame_rect.right(), frame_rect.bottom()),
                GRID_LINE_WIDTH,
                colors.axis_text,
            ));
        }
    }

    fn append_price(
        &self,
        frame: &mut RenderFrame,
        panel: &ChartPanel,
        projection: &Projection<'_>,
        start: usize,
        count: usize,
    ) {
        let colors = self.config.colors;
        let bars = self.plotted_bars();
        let style = self.converter.style();
        match style.plot_shape() {
            PlotShape::Line { filled } => {
                let points = append_series_line(frame, bars.close(), projection, start, count, colors.line);
                if filled && points.len() > 1 {
                    let bottom = panel.content_frame().bottom();
                    let mut outline = points;
                    if let (Some(first), Some(last)) = (outline.first().copied(), outline.last().copied()) {
                        outline.push(Point::new(last.x, bottom));
                        outline.push(Point::new(first.x, bottom));
                    }
                    frame.push_polygon(PolygonPrimitive::new(outline, colors.line.with_alpha(0.2)));
                }
            }
            shape => append_bars(frame, bars, projection, start, count, shape, colors),
        }

        let value_lines = style.value_lines();
        if !value_lines.show_value_lines {
            return;
        }
        let Some(index) = bars.len().checked_sub(1) else {
            return;
        };
        let Some(bar) = bars.bar(index) else {
            return;
        };
        let content = panel.content_frame();
        let y = projection.y.y_by_value(bar.close);
        let left = if value_lines.extend_value_lines {
            content.left
        } else {
            projection.x.x_by_record_centered(index as f64).clamp(content.left, content.right())
        };
        frame.push_line(LinePrimitive::new(
            Point::new(left, y),
            Point::new(content.right(), y),
            GRID_LINE_WIDTH,
            colors.value_line,
        ));
        frame.push_text(TextPrimitive::new(
            panel.value_calibrator().format_value(bar.close),
            Point::new(
                content.right() + VALUE_LABEL_OFFSET,
                y + self.config.text_metrics.font_size / 3.0,
            ),
            self.config.text_metrics.font_size,
            colors.value_line,
            TextHAlign::Left,
        ));
    }
}

fn bar_color(bullish: bool, colors: ChartColors) -> Color {
    if bullish { colors.up_bar } else { colors.down_bar }
}

fn append_bars(
    frame: &mut RenderFrame,
    bars: &BarSeries,
    projection: &Projection<'_>,
    start: usize,
    count: usize,
    shape: PlotShape,
    colors: ChartColors,
) {
    let body_width = (projection.x.column_width() * BODY_WIDTH_RATIO).max(1.0);
    let y = |value: f64| projection.y.y_by_value(value);
    let mut previous: Option<(f64, f64)> = None;
    for index in start..start + count {
        let Some(bar) = bars.bar(index) else {
            continue;
        };
        let x = projection.x.x_by_record_centered(index as f64);
        let color = bar_color(bar.is_bullish(), colors);
        let body_top = y(bar.open.max(bar.close));
        let body = Rect::new(
            x - body_width / 2.0,
            body_top,
            body_width,
            (y(bar.open.min(bar.close)) - body_top).max(1.0),
        );
        match shape {
            PlotShape::Candle { hollow } => {
                frame.push_line(LinePrimitive::new(
                    Point::new(x, y(bar.high)),
                    Point::new(x, y(bar.low)),
                    1.0,
                    color,
                ));
                if hollow && bar.is_bullish() {
                    frame.push_rect(RectPrimitive::outlined(body, color, 1.0));
                } else {
                    frame.push_rect(RectPrimitive::filled(body, color));
                }
            }
            PlotShape::Ohlc { open_tick, close_tick } => {
                frame.push_line(LinePrimitive::new(
                    Point::new(x, y(bar.high)),
                    Point::new(x, y(bar.low)),
                    1.0,
                    color,
                ));
                let half = body_width / 2.0;
                if open_tick {
                    frame.push_line(LinePrimitive::new(
                        Point::new(x - half, y(bar.open)),
                        Point::new(x, y(bar.open)),
                        1.0,
                        color,
                    ));
                }
                if close_tick {
                    frame.push_line(LinePrimitive::new(
                        Point::new(x, y(bar.close)),
                        Point::new(x + half, y(bar.close)),
                        1.0,
                        color,
                    ));
                }
            }
            PlotShape::Box => frame.push_rect(RectPrimitive::filled(body, color)),
            PlotShape::Kagi => {
                if let Some((previous_x, previous_close)) = previous {
                    frame.push_line(LinePrimitive::new(
                        Point::new(previous_x, y(previous_close)),
                        Point::new(x, y(previous_close)),
                        SERIES_LINE_WIDTH,
                        colors.line,
                    ));
                }
                frame.push_line(LinePrimitive::new(
                    Point::new(x, y(bar.open)),
                    Point::new(x, y(bar.close)),
                    SERIES_LINE_WIDTH,
                    color,
                ));
            }
            PlotShape::Line { .. } => {}
        }
        previous = Some((x, bar.close));
    }
}

/// Draws a polyline through the non-null values and returns its points.
/// Nulls break the line.
fn append_series_line(
    frame: &mut RenderFrame,
    series: &DataSeries<f64>,
    projection: &Projection<'_>,
    start: usize,
    count: usize,
    color: Color,
) -> Vec<Point> {
    let mut points = Vec::new();
    let mut previous: Option<Point> = None;
    for index in start..(start + count).min(series.len()) {
        let Some(value) = series.value(index) else {
            previous = None;
            continue;
        };
        let point = Point::new(
            projection.x.x_by_record_centered(index as f64),
            projection.y.y_by_value(value),
        );
        if let Some(from) = previous {
            frame.push_line(LinePrimitive::new(from, point, SERIES_LINE_WIDTH, color));
        }
        points.push(point);
        previous = Some(point);
    }
    points
}

fn append_bands(
    frame: &mut RenderFrame,
    panel: &ChartPanel,
    series: &SeriesSet,
    projection: &Projection<'_>,
    start: usize,
    count: usize,
    colors: ChartColors,
) {
    for band in panel.bands() {
        let (Some(upper), Some(lower)) = (series.get(&band.upper), series.get(&band.lower)) else {
            continue;
        };
        let path = band_fill_path(upper, lower, projection, start, start + count - 1);
        if path.len() >= 3 {
            frame.push_polygon(PolygonPrimitive::new(path, colors.band_fill));
        }
    }
}

fn append_objects(
    frame: &mut RenderFrame,
    panel: &ChartPanel,
    projection: &Projection<'_>,
    colors: ChartColors,
) {
    let mut objects: Vec<&ChartPanelObject> =
        panel.objects().iter().filter(|object| object.is_visible()).collect();
    objects.sort_by_key(|object| object.z_index());
    let content = panel.content_frame();
    for object in objects {
        let Some(geometry) = object.geometry(projection, content) else {
            continue;
        };
        match (geometry, object.kind()) {
            (ObjectGeometry::Column(rect), _) => {
                frame.push_rect(RectPrimitive::filled(rect, colors.highlighted_column));
            }
            (ObjectGeometry::Lines { left, right, ask_y, bid_y }, _) => {
                for (y, color) in [(ask_y, colors.ask_line), (bid_y, colors.bid_line)] {
                    if let Some(y) = y {
                        frame.push_line(LinePrimitive::new(
                            Point::new(left, y),
                            Point::new(right, y),
                            1.0,
                            color,
                        ));
                    }
                }
            }
            (ObjectGeometry::Bounds(rect), PanelObjectKind::GeometricMarker(options)) => {
                append_marker(frame, rect, options.shape, colors.marker);
            }
            (ObjectGeometry::Bounds(rect), _) => {
                frame.push_rect(RectPrimitive::filled(rect, colors.marker));
            }
        }
        if object.is_selected() {
            append_selection(frame, geometry, colors.selection);
        }
    }
}

fn append_marker(frame: &mut RenderFrame, rect: Rect, shape: MarkerShape, color: Color) {
    let Rect { left, top, width, height } = rect;
    let center = rect.center();
    let (right, bottom) = (rect.right(), rect.bottom());
    let points = match shape {
        MarkerShape::Square => {
            frame.push_rect(RectPrimitive::filled(rect, color));
            return;
        }
        MarkerShape::Dot => (0..DOT_SEGMENTS)
            .map(|step| {
                let angle = TAU * step as f64 / DOT_SEGMENTS as f64;
                Point::new(
                    center.x + width / 2.0 * angle.cos(),
                    center.y + height / 2.0 * angle.sin(),
                )
            })
            .collect(),
        MarkerShape::Diamond => vec![
            Point::new(center.x, top),
            Point::new(right, center.y),
            Point::new(center.x, bottom),
            Point::new(left, center.y),
        ],
        MarkerShape::ArrowUp => vec![
            Point::new(center.x, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ],
        MarkerShape::ArrowDown => vec![
            Point::new(left, top),
            Point::new(right, top),
            Point::new(center.x, bottom),
        ],
        MarkerShape::ArrowLeft => vec![
            Point::new(left, center.y),
            Point::new(right, top),
            Point::new(right, bottom),
        ],
        MarkerShape::ArrowRight => vec![
            Point::new(left, top),
            Point::new(right, center.y),
            Point::new(left, bottom),
        ],
    };
    frame.push_polygon(PolygonPrimitive::new(points, color));
}

fn append_selection(frame: &mut RenderFrame, geometry: ObjectGeometry, color: Color) {
    match geometry {
        ObjectGeometry::Column(rect) | ObjectGeometry::Bounds(rect) => {
            frame.push_rect(RectPrimitive::outlined(rect, color, 1.0));
        }
        ObjectGeometry::Lines { left, right, ask_y, bid_y } => {
            for y in [ask_y, bid_y].into_iter().flatten() {
                for x in [left, right - SELECTION_HANDLE] {
                    frame.push_rect(RectPrimitive::filled(
                        Rect::new(x, y - SELECTION_HANDLE / 2.0, SELECTION_HANDLE, SELECTION_HANDLE),
                        color,
                    ));
                }
            }
        }
    }
}
