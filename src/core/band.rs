use smallvec::SmallVec;

use crate::core::data_series::DataSeries;
use crate::core::projection::Projection;
use crate::core::types::Point;

/// Closed outline of the area between two nullable series over the records
/// `start..=end`, e.g. an Ichimoku cloud or a channel fill.
///
/// Records where a series has no value are skipped. When the range boundary
/// itself is null, the outline is closed through the nearest non-null value
/// inside the data instead. Returns an empty path when either series has no
/// value to draw.
#[must_use]
pub fn band_fill_path(
    upper: &DataSeries<f64>,
    lower: &DataSeries<f64>,
    projection: &Projection<'_>,
    start: usize,
    end: usize,
) -> Vec<Point> {
    let len = upper.len().min(lower.len());
    if len == 0 || start >= len {
        return Vec::new();
    }
    let end = end.min(len - 1);
    if start > end {
        return Vec::new();
    }

    let mut path: Vec<Point> = (start..=end)
        .filter_map(|i| upper.value(i).map(|v| projection.point_by_record(i as f64, v)))
        .collect();
    if path.is_empty() {
        return path;
    }

    let lower_points: SmallVec<[Point; 64]> = (start..=end)
        .rev()
        .filter_map(|i| lower.value(i).map(|v| projection.point_by_record(i as f64, v)))
        .collect();
    if lower_points.is_empty() {
        // Close against the nearest lower value outside the visible range.
        let right = lower.left_nearest_value_index(end);
        let left = lower.right_nearest_value_index(start);
        match (lower.value(right), lower.value(left)) {
            (Some(right_value), Some(left_value)) => {
                path.push(projection.point_by_record(end as f64, right_value));
                path.push(projection.point_by_record(start as f64, left_value));
            }
            _ => return Vec::new(),
        }
    } else {
        path.extend(lower_points);
    }

    let first_upper = upper.right_nearest_value_index(start);
    if let Some(value) = upper.value(first_upper) {
        path.push(projection.point_by_record(first_upper as f64, value));
    }
    path
}

/// First non-null value, used as the "first value" fallback when a derived
/// series starts with a warm-up gap.
#[must_use]
pub fn first_non_null_value(series: &DataSeries<f64>) -> Option<f64> {
    series.first_value_index().and_then(|index| series.value(index))
}
