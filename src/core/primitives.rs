use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

/// Smallest value span a scale may collapse to before projection divides by it.
pub const MIN_VALUE_SPAN: f64 = 1e-9;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Out-of-range timestamps fall back to the Unix epoch.
#[must_use]
pub fn unix_millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Rounds to `decimals` fractional digits.
#[must_use]
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Substitutes a minimum span when `min == max` or the span is not finite.
#[must_use]
pub fn non_degenerate_span(min: f64, max: f64) -> f64 {
    let span = max - min;
    if !span.is_finite() || span.abs() < MIN_VALUE_SPAN {
        MIN_VALUE_SPAN
    } else {
        span
    }
}
