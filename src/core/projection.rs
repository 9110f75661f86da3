//! Bidirectional mapping between data space and pixels.
//!
//! A projection is a read-only snapshot built from the current scales for one
//! layout or render pass. Nothing here rounds: pixel snapping is a render-time
//! concern, so every forward mapping has an exact inverse.

use crate::core::data_series::DataSeries;
use crate::core::date_scale::DateScale;
use crate::core::primitives::{MIN_VALUE_SPAN, non_degenerate_span};
use crate::core::types::{Point, Rect};
use crate::core::value_scale::{ScaleKind, ValueScale};

/// Horizontal mapping: record index and date to x.
#[derive(Debug, Clone, Copy)]
pub struct DateProjection<'a> {
    frame: Rect,
    first_visible: f64,
    column_width: f64,
    dates: &'a DataSeries<i64>,
    time_interval: f64,
}

impl<'a> DateProjection<'a> {
    /// `None` while the date scale has no visible range.
    #[must_use]
    pub fn new(scale: &DateScale, dates: &'a DataSeries<i64>, time_interval: f64) -> Option<Self> {
        let range = scale.visible_range()?;
        Some(Self::from_parts(
            scale.frame(),
            range.first,
            scale.column_width(),
            dates,
            time_interval,
        ))
    }

    #[must_use]
    pub fn from_parts(
        frame: Rect,
        first_visible: f64,
        column_width: f64,
        dates: &'a DataSeries<i64>,
        time_interval: f64,
    ) -> Self {
        Self {
            frame,
            first_visible,
            column_width: column_width.max(MIN_VALUE_SPAN),
            dates,
            time_interval: if time_interval.is_finite() && time_interval > 0.0 {
                time_interval
            } else {
                1.0
            },
        }
    }

    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    #[must_use]
    pub fn column_width(&self) -> f64 {
        self.column_width
    }

    #[must_use]
    pub fn first_visible(&self) -> f64 {
        self.first_visible
    }

    #[must_use]
    pub fn dates(&self) -> &'a DataSeries<i64> {
        self.dates
    }

    #[must_use]
    pub fn time_interval(&self) -> f64 {
        self.time_interval
    }

    fn first_column_offset(&self) -> f64 {
        self.first_visible.fract() * self.column_width
    }

    /// Column relative to the first (integral) visible record.
    #[must_use]
    pub fn column_by_record(&self, record: f64, integral: bool) -> f64 {
        let column = record - self.first_visible.trunc();
        if integral { column.trunc() } else { column }
    }

    #[must_use]
    pub fn record_by_column(&self, column: f64, integral: bool) -> f64 {
        let record = column + self.first_visible.trunc();
        if integral { record.trunc() } else { record }
    }

    /// Left edge of `column`, or its center when `centered`.
    #[must_use]
    pub fn x_by_column(&self, column: f64, centered: bool) -> f64 {
        let x = self.frame.left - self.first_column_offset() + column * self.column_width;
        if centered { x + self.column_width / 2.0 } else { x }
    }

    #[must_use]
    pub fn column_by_x(&self, x: f64, integral: bool) -> f64 {
        let column = (x - self.frame.left + self.first_column_offset()) / self.column_width;
        if integral { column.floor() } else { column }
    }

    /// `frame.left + (record - first_visible) * column_width`.
    #[must_use]
    pub fn x_by_record(&self, record: f64) -> f64 {
        self.frame.left + (record - self.first_visible) * self.column_width
    }

    /// Center of the column holding `record`.
    #[must_use]
    pub fn x_by_record_centered(&self, record: f64) -> f64 {
        self.x_by_record(record.trunc()) + self.column_width / 2.0
    }

    #[must_use]
    pub fn record_by_x(&self, x: f64) -> f64 {
        self.first_visible + (x - self.frame.left) / self.column_width
    }

    /// Integral record whose column contains `x`.
    #[must_use]
    pub fn record_index_by_x(&self, x: f64) -> i64 {
        self.record_by_x(x).floor() as i64
    }

    /// Date of `record`, extrapolated by the time interval outside the data.
    ///
    /// An empty date column maps everything to the epoch.
    #[must_use]
    pub fn date_by_record(&self, record: i64) -> i64 {
        let len = self.dates.len() as i64;
        let (Some(first), Some(last)) = (self.dates.first_value(), self.dates.last_value()) else {
            return 0;
        };
        if record < 0 {
            first + (record as f64 * self.time_interval) as i64
        } else if record >= len {
            last + ((record - len + 1) as f64 * self.time_interval) as i64
        } else {
            self.dates.value(record as usize).unwrap_or(first)
        }
    }

    /// Record at or before `date`; `-1` on an empty date column.
    #[must_use]
    pub fn record_by_date(&self, date: i64) -> i64 {
        let (Some(first), Some(last)) = (self.dates.first_value(), self.dates.last_value()) else {
            return -1;
        };
        if date < first {
            return ((date - first) as f64 / self.time_interval).floor() as i64;
        }
        if date > last {
            let len = self.dates.len() as i64;
            return len - 1 + ((date - last) as f64 / self.time_interval).floor() as i64;
        }
        self.dates.floor_index(date) as i64
    }

    /// Fractional record of `date`, interpolated between neighbour records.
    #[must_use]
    pub fn record_by_date_fractional(&self, date: i64) -> f64 {
        let record = self.record_by_date(date);
        let record_date = self.date_by_record(record);
        let next_date = self.date_by_record(record + 1);
        let time_diff = (next_date - record_date) as f64;
        if time_diff == 0.0 {
            record as f64
        } else {
            record as f64 + (date - record_date) as f64 / time_diff
        }
    }

    #[must_use]
    pub fn x_by_date(&self, date: i64) -> f64 {
        self.x_by_record(self.record_by_date_fractional(date))
    }

    /// Date at `x`, interpolated between the dates of neighbour records.
    #[must_use]
    pub fn date_by_x(&self, x: f64) -> i64 {
        let record = self.record_by_x(x);
        let base = record.floor();
        let ratio = record - base;
        let base_date = self.date_by_record(base as i64);
        if ratio == 0.0 {
            return base_date;
        }
        let next_date = self.date_by_record(base as i64 + 1);
        base_date + ((next_date - base_date) as f64 * ratio).round() as i64
    }
}

/// Vertical mapping: value to y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueProjection {
    frame: Rect,
    min: f64,
    max: f64,
    kind: ScaleKind,
}

impl ValueProjection {
    #[must_use]
    pub fn new(scale: &ValueScale) -> Self {
        Self::from_parts(scale.frame(), scale.min_visible(), scale.max_visible(), scale.kind())
    }

    #[must_use]
    pub fn from_parts(frame: Rect, min: f64, max: f64, kind: ScaleKind) -> Self {
        Self {
            frame,
            min,
            max,
            kind,
        }
    }

    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    fn height(&self) -> f64 {
        self.frame.height.max(MIN_VALUE_SPAN)
    }

    /// Linear: `frame.bottom - (value - min) * height / (max - min)`.
    #[must_use]
    pub fn y_by_value(&self, value: f64) -> f64 {
        let (min, span, mapped) = match self.kind {
            ScaleKind::Linear => (self.min, non_degenerate_span(self.min, self.max), value),
            ScaleKind::Logarithmic => {
                let log_min = signed_log(self.min);
                let log_max = signed_log(self.max);
                (log_min, non_degenerate_span(log_min, log_max), signed_log(value))
            }
        };
        self.frame.bottom() - (mapped - min) * self.height() / span
    }

    #[must_use]
    pub fn value_by_y(&self, y: f64) -> f64 {
        let offset = (self.frame.bottom() - y) / self.height();
        match self.kind {
            ScaleKind::Linear => self.min + offset * non_degenerate_span(self.min, self.max),
            ScaleKind::Logarithmic => {
                let log_min = signed_log(self.min);
                let log_max = signed_log(self.max);
                signed_exp(log_min + offset * non_degenerate_span(log_min, log_max))
            }
        }
    }
}

fn signed_log(value: f64) -> f64 {
    if value < 0.0 {
        -(value.abs() + 1.0).ln()
    } else {
        (value + 1.0).ln()
    }
}

fn signed_exp(log: f64) -> f64 {
    if log < 0.0 {
        -((-log).exp() - 1.0)
    } else {
        log.exp() - 1.0
    }
}

/// Both axes of one panel.
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    pub x: DateProjection<'a>,
    pub y: ValueProjection,
}

impl<'a> Projection<'a> {
    #[must_use]
    pub fn new(x: DateProjection<'a>, y: ValueProjection) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn point_by_record(&self, record: f64, value: f64) -> Point {
        Point::new(self.x.x_by_record(record), self.y.y_by_value(value))
    }

    #[must_use]
    pub fn point_by_date(&self, date: i64, value: f64) -> Point {
        Point::new(self.x.x_by_date(date), self.y.y_by_value(value))
    }
}
