//! Hit-testing helpers shared by drawings, handles and gestures.
//!
//! All "near" predicates tolerate a pixel deviation that depends on the
//! input device: fingers need a wider tolerance than a mouse cursor.

use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Rect};

pub const REGULAR_DEVIATION: f64 = 5.0;
pub const REGULAR_DEVIATION_MOBILE: f64 = 20.0;
pub const MAGNET_DEVIATION: f64 = 15.0;
pub const MAGNET_DEVIATION_MOBILE: f64 = 40.0;

/// Pixel tolerance used by proximity checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub deviation: f64,
}

impl Default for Proximity {
    fn default() -> Self {
        Self::regular(false)
    }
}

impl Proximity {
    #[must_use]
    pub const fn new(deviation: f64) -> Self {
        Self { deviation }
    }

    #[must_use]
    pub const fn regular(is_mobile: bool) -> Self {
        Self::new(if is_mobile {
            REGULAR_DEVIATION_MOBILE
        } else {
            REGULAR_DEVIATION
        })
    }

    #[must_use]
    pub const fn magnet(is_mobile: bool) -> Self {
        Self::new(if is_mobile {
            MAGNET_DEVIATION_MOBILE
        } else {
            MAGNET_DEVIATION
        })
    }

    #[must_use]
    pub fn is_value_near_value(self, value1: f64, value2: f64) -> bool {
        (value1 - value2).abs() <= self.deviation
    }

    #[must_use]
    pub fn is_value_between_or_near_values(self, value: f64, value1: f64, value2: f64) -> bool {
        value >= value1.min(value2) - self.deviation && value <= value1.max(value2) + self.deviation
    }

    #[must_use]
    pub fn is_point_near_point(self, point: Point, check: Point) -> bool {
        self.is_value_near_value(point.x, check.x) && self.is_value_near_value(point.y, check.y)
    }

    #[must_use]
    pub fn is_point_near_any_point(self, point: Point, checks: &[Point]) -> bool {
        checks
            .iter()
            .any(|check| self.is_point_near_point(point, *check))
    }

    #[must_use]
    pub fn is_point_inside_or_near_rect(self, point: Point, rect: Rect) -> bool {
        self.is_value_between_or_near_values(point.x, rect.left, rect.right())
            && self.is_value_between_or_near_values(point.y, rect.top, rect.bottom())
    }

    #[must_use]
    pub fn is_point_inside_or_near_rect_points(self, point: Point, corner1: Point, corner2: Point) -> bool {
        self.is_value_between_or_near_values(point.x, corner1.x, corner2.x)
            && self.is_value_between_or_near_values(point.y, corner1.y, corner2.y)
    }

    /// Returns `true` when `point` is near one of the four rectangle edges.
    #[must_use]
    pub fn is_point_near_rect_points(self, point: Point, corner1: Point, corner2: Point) -> bool {
        let left = corner1.x.min(corner2.x);
        let right = corner1.x.max(corner2.x);
        let top = corner1.y.min(corner2.y);
        let bottom = corner1.y.max(corner2.y);

        self.is_point_near_line(point, Point::new(left, bottom), Point::new(left, top))
            || self.is_point_near_line(point, Point::new(left, top), Point::new(right, top))
            || self.is_point_near_line(point, Point::new(right, top), Point::new(right, bottom))
            || self.is_point_near_line(point, Point::new(right, bottom), Point::new(left, bottom))
    }

    #[must_use]
    pub fn is_point_near_line(self, point: Point, line1: Point, line2: Point) -> bool {
        if !self.is_point_inside_or_near_rect_points(point, line1, line2) {
            return false;
        }
        if (line1.x - line2.x).abs() <= self.deviation {
            return true;
        }

        let k = (line1.y - line2.y) / (line1.x - line2.x);
        let angle = k.atan().to_degrees().abs();
        let is_orthogonal = (angle - 90.0).abs() <= 10.0 || (angle - 270.0).abs() <= 10.0;
        if is_orthogonal {
            let x = (point.y - (line1.y - line1.x * k)) / k;
            self.is_value_near_value(x, point.x)
        } else {
            let y = line1.y + k * (point.x - line1.x);
            self.is_value_near_value(y, point.y)
        }
    }

    #[must_use]
    pub fn is_point_near_polyline(self, point: Point, points: &[Point]) -> bool {
        points
            .windows(2)
            .any(|pair| self.is_point_near_line(point, pair[0], pair[1]))
    }

    /// Same as [`Self::is_point_near_polyline`] plus the closing edge.
    #[must_use]
    pub fn is_point_near_polygon(self, point: Point, points: &[Point]) -> bool {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return false;
        };
        if points.len() < 2 {
            return false;
        }
        self.is_point_near_polyline(point, points) || self.is_point_near_line(point, *last, *first)
    }

    #[must_use]
    pub fn is_point_near_circle(self, point: Point, center: Point, radius: f64) -> bool {
        self.is_value_near_value(length(center, point), radius)
    }

    #[must_use]
    pub fn is_point_inside_or_near_circle(self, point: Point, center: Point, radius: f64) -> bool {
        self.is_value_between_or_near_values(length(center, point), 0.0, radius)
    }
}

/// Euclidean distance rounded to whole pixels.
#[must_use]
pub fn length(point1: Point, point2: Point) -> f64 {
    point1.distance_to(point2).round()
}

#[must_use]
pub fn x_projection_length(point1: Point, point2: Point) -> f64 {
    (point1.x - point2.x).abs()
}

#[must_use]
pub fn y_projection_length(point1: Point, point2: Point) -> f64 {
    (point1.y - point2.y).abs()
}

/// Ellipse outline test; `radius_point` gives both radii relative to `center`.
#[must_use]
pub fn is_point_near_ellipse(point: Point, center: Point, radius_point: Point) -> bool {
    is_point_near_ellipse_with_radii(
        point,
        center,
        (radius_point.x - center.x).abs(),
        (radius_point.y - center.y).abs(),
    )
}

#[must_use]
pub fn is_point_near_ellipse_with_radii(
    point: Point,
    center: Point,
    horizontal_radius: f64,
    vertical_radius: f64,
) -> bool {
    let x = point.x - center.x;
    let y = point.y - center.y;
    let value = (x * x) / (horizontal_radius * horizontal_radius)
        + (y * y) / (vertical_radius * vertical_radius);
    0.8 < value && value < 1.3
}

/// Least-squares line over `(index, value)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub slope: f64,
    /// Fitted value at index 0.
    pub first_value: f64,
}

impl Regression {
    #[must_use]
    pub fn value_at(self, index: f64) -> f64 {
        self.first_value + self.slope * index
    }
}

/// Returns `None` for fewer than two samples.
#[must_use]
pub fn linear_regression(values: &[f64]) -> Option<Regression> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, value) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += value;
        sum_xy += x * value;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let first_value = (sum_y - slope * sum_x) / n;
    Some(Regression { slope, first_value })
}
