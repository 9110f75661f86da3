//! Label formatting for date and value scales.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{round_to_decimals, unix_millis_to_datetime};
use crate::core::time_frame::TimeSpan;
use crate::error::{ChartError, ChartResult};

/// Named date layouts used by the automatic date labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateTimeFormatName {
    #[serde(rename = "year-month")]
    YearMonth,
    #[serde(rename = "month-day")]
    MonthDay,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "short_date_time")]
    ShortDateTime,
    #[serde(rename = "long_date_time")]
    LongDateTime,
    #[serde(rename = "short_time")]
    ShortTime,
    #[serde(rename = "long_time")]
    LongTime,
}

impl DateTimeFormatName {
    #[must_use]
    pub fn chrono_pattern(self) -> &'static str {
        match self {
            Self::YearMonth => "%b %Y",
            Self::MonthDay => "%b %d",
            Self::Date => "%b %d, %Y",
            Self::ShortDateTime => "%b %d, %Y %H:%M",
            Self::LongDateTime => "%b %d, %Y %H:%M:%S",
            Self::ShortTime => "%H:%M",
            Self::LongTime => "%H:%M:%S",
        }
    }

    #[must_use]
    pub fn format(self, date_ms: i64) -> String {
        unix_millis_to_datetime(date_ms)
            .format(self.chrono_pattern())
            .to_string()
    }
}

/// Resolution of the time axis, picked from the chart time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateGranularity {
    Millisecond,
    Second,
    Minute,
    Day,
    Month,
    Year,
}

impl DateGranularity {
    #[must_use]
    pub fn from_time_interval(time_interval: f64) -> Self {
        if time_interval >= TimeSpan::MILLISECONDS_IN_YEAR as f64 {
            Self::Year
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_MONTH as f64 {
            Self::Month
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_DAY as f64 {
            Self::Day
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_MINUTE as f64 {
            Self::Minute
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_SECOND as f64 {
            Self::Second
        } else {
            Self::Millisecond
        }
    }

    /// Default pattern for evenly spaced labels, in moment-style tokens.
    #[must_use]
    pub fn fixed_label_pattern(self) -> &'static str {
        match self {
            Self::Year => "YYYY",
            Self::Month => "YYYY MMM",
            Self::Day => "YYYY-MM-DD",
            Self::Minute => "YYYY-MM-DD HH:mm",
            Self::Second => "YYYY-MM-DD HH:mm:ss",
            Self::Millisecond => "YYYY-MM-DD HH:mm:ss.SSS",
        }
    }
}

/// Formats a date according to the chart time interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeIntervalDateFormat {
    time_interval: f64,
}

impl TimeIntervalDateFormat {
    pub fn new(time_interval: f64) -> ChartResult<Self> {
        if !time_interval.is_finite() || time_interval <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "time interval must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self { time_interval })
    }

    #[must_use]
    pub fn time_interval(self) -> f64 {
        self.time_interval
    }

    #[must_use]
    pub fn granularity(self) -> DateGranularity {
        DateGranularity::from_time_interval(self.time_interval)
    }

    #[must_use]
    pub fn format(self, date_ms: i64) -> String {
        match self.granularity() {
            DateGranularity::Year => unix_millis_to_datetime(date_ms).year().to_string(),
            DateGranularity::Month => DateTimeFormatName::YearMonth.format(date_ms),
            DateGranularity::Day => DateTimeFormatName::Date.format(date_ms),
            DateGranularity::Minute | DateGranularity::Second => {
                DateTimeFormatName::ShortDateTime.format(date_ms)
            }
            DateGranularity::Millisecond => DateTimeFormatName::LongDateTime.format(date_ms),
        }
    }

    /// Label text for `date_ms` following a label at `prev_ms`.
    ///
    /// Only components that changed since the previous label are shown, and a
    /// change of a coarser component selects a richer layout. `None` when
    /// nothing visible changed or the date does not move forward. Without a
    /// previous label every component counts as changed.
    #[must_use]
    pub fn label_since(self, date_ms: i64, prev_ms: Option<i64>) -> Option<String> {
        let date = unix_millis_to_datetime(date_ms);
        let (year_changed, month_changed, day_changed, time_changed, second_changed, millis_changed) =
            match prev_ms {
                Some(prev_ms) if date_ms <= prev_ms => return None,
                Some(prev_ms) => {
                    let prev = unix_millis_to_datetime(prev_ms);
                    (
                        date.year() != prev.year(),
                        date.month() != prev.month(),
                        date.month() != prev.month() || date.day() != prev.day(),
                        date.hour() != prev.hour() || date.minute() != prev.minute(),
                        date.second() != prev.second(),
                        date.timestamp_subsec_millis() != prev.timestamp_subsec_millis(),
                    )
                }
                None => (true, true, true, true, true, true),
            };

        let name = match self.granularity() {
            DateGranularity::Year => {
                return year_changed.then(|| date.year().to_string());
            }
            DateGranularity::Month => {
                if !year_changed && !month_changed {
                    return None;
                }
                DateTimeFormatName::YearMonth
            }
            DateGranularity::Day => {
                if year_changed {
                    DateTimeFormatName::Date
                } else if day_changed {
                    DateTimeFormatName::MonthDay
                } else {
                    return None;
                }
            }
            DateGranularity::Minute => {
                if year_changed || day_changed {
                    DateTimeFormatName::ShortDateTime
                } else if time_changed {
                    DateTimeFormatName::ShortTime
                } else {
                    return None;
                }
            }
            DateGranularity::Second => {
                if year_changed || day_changed {
                    DateTimeFormatName::ShortDateTime
                } else if time_changed || second_changed {
                    DateTimeFormatName::LongTime
                } else {
                    return None;
                }
            }
            DateGranularity::Millisecond => {
                if year_changed || day_changed {
                    DateTimeFormatName::LongDateTime
                } else if time_changed || second_changed || millis_changed {
                    DateTimeFormatName::LongTime
                } else {
                    return None;
                }
            }
        };
        Some(name.format(date_ms))
    }
}

/// Date format driven by a moment-style pattern such as `"YYYY-MM-DD HH:mm"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CustomDateFormat {
    pattern: String,
    chrono_pattern: String,
}

impl From<String> for CustomDateFormat {
    fn from(pattern: String) -> Self {
        Self::new(pattern)
    }
}

impl From<CustomDateFormat> for String {
    fn from(format: CustomDateFormat) -> Self {
        format.pattern
    }
}

impl CustomDateFormat {
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let chrono_pattern = moment_to_chrono(&pattern);
        Self {
            pattern,
            chrono_pattern,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn format(&self, date_ms: i64) -> String {
        unix_millis_to_datetime(date_ms)
            .format(&self.chrono_pattern)
            .to_string()
    }
}

const MOMENT_TOKENS: [(&str, &str); 20] = [
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("SSS", "%3f"),
    ("A", "%p"),
    ("a", "%P"),
];

/// Translates moment-style tokens into a chrono strftime pattern.
///
/// Unknown characters are kept literally; `%` is escaped.
#[must_use]
pub fn moment_to_chrono(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;
    'outer: while let Some(ch) = rest.chars().next() {
        for (token, replacement) in MOMENT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'outer;
            }
        }
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Value label layout: `value / divider` with fixed decimals, then `suffix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberFormat {
    pub decimals: u8,
    pub divider: f64,
    pub suffix: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            divider: 1.0,
            suffix: String::new(),
        }
    }
}

impl NumberFormat {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.divider.is_finite() || self.divider == 0.0 {
            return Err(ChartError::InvalidConfig(
                "number format divider must be finite and non-zero".to_owned(),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn format(&self, value: f64) -> String {
        let scaled = round_to_decimals(value / self.divider, i32::from(self.decimals));
        // No "-0.00".
        let scaled = if scaled == 0.0 { 0.0 } else { scaled };
        format!("{scaled:.prec$}{}", self.suffix, prec = usize::from(self.decimals))
    }
}
