use serde::{Deserialize, Serialize};

use crate::core::projection::Projection;
use crate::core::types::Point;

/// Anchor of a drawing, expressed in data space, pixel space or both.
///
/// Domain coordinates win over pixels when resolving: `record` before `date`
/// before `x`, and `value` before `y`. A point anchored in data space keeps its
/// place in the data while the chart scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ChartPoint {
    #[must_use]
    pub fn from_record(record: f64, value: f64) -> Self {
        Self {
            record: Some(record),
            value: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_date(date: i64, value: f64) -> Self {
        Self {
            date: Some(date),
            value: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_pixels(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Self::default()
        }
    }

    /// Captures `point` in data space (date and value).
    #[must_use]
    pub fn from_point(point: Point, projection: &Projection<'_>) -> Self {
        Self::from_date(projection.x.date_by_x(point.x), projection.y.value_by_y(point.y))
    }

    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        (self.record.is_some() || self.date.is_some() || self.x.is_some())
            && (self.value.is_some() || self.y.is_some())
    }

    /// Resolves the horizontal coordinate; `None` when nothing is set.
    #[must_use]
    pub fn resolve_x(&self, projection: &Projection<'_>) -> Option<f64> {
        if let Some(record) = self.record {
            return Some(projection.x.x_by_record(record));
        }
        if let Some(date) = self.date {
            return Some(projection.x.x_by_date(date));
        }
        self.x
    }

    #[must_use]
    pub fn resolve_y(&self, projection: &Projection<'_>) -> Option<f64> {
        if let Some(value) = self.value {
            return Some(projection.y.y_by_value(value));
        }
        self.y
    }

    #[must_use]
    pub fn to_point(&self, projection: &Projection<'_>) -> Option<Point> {
        Some(Point::new(self.resolve_x(projection)?, self.resolve_y(projection)?))
    }

    /// Moves the anchor by a pixel offset while keeping its coordinate space.
    pub fn translate(&mut self, dx: f64, dy: f64, projection: &Projection<'_>) {
        if let Some(x) = self.resolve_x(projection) {
            let moved = x + dx;
            if self.record.is_some() {
                self.record = Some(projection.x.record_by_x(moved));
            } else if self.date.is_some() {
                self.date = Some(projection.x.date_by_x(moved));
            } else {
                self.x = Some(moved);
            }
        }
        if let Some(y) = self.resolve_y(projection) {
            let moved = y + dy;
            if self.value.is_some() {
                self.value = Some(projection.y.value_by_y(moved));
            } else {
                self.y = Some(moved);
            }
        }
    }
}
