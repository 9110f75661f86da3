use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Millisecond lengths used as granularity breakpoints.
pub struct TimeSpan;

impl TimeSpan {
    pub const MILLISECONDS_IN_YEAR: i64 = 31_556_926_000;
    pub const MILLISECONDS_IN_MONTH: i64 = 2_629_743_830;
    pub const MILLISECONDS_IN_WEEK: i64 = 604_800_000;
    pub const MILLISECONDS_IN_DAY: i64 = 86_400_000;
    pub const MILLISECONDS_IN_HOUR: i64 = 3_600_000;
    pub const MILLISECONDS_IN_MINUTE: i64 = 60_000;
    pub const MILLISECONDS_IN_SECOND: i64 = 1_000;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Periodicity {
    #[serde(rename = "t")]
    Tick,
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "")]
    Minute,
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "w")]
    Week,
    #[serde(rename = "m")]
    Month,
    #[serde(rename = "y")]
    Year,
}

impl Periodicity {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Second => "sec",
            Self::Minute => "min",
            Self::Hour => "hr",
            Self::Day => "day",
            Self::Week => "wk",
            Self::Month => "mo",
            Self::Year => "yr",
        }
    }

    /// Length of one unit; ticks count as one millisecond.
    #[must_use]
    pub fn unit_millis(self) -> i64 {
        match self {
            Self::Tick => 1,
            Self::Second => TimeSpan::MILLISECONDS_IN_SECOND,
            Self::Minute => TimeSpan::MILLISECONDS_IN_MINUTE,
            Self::Hour => TimeSpan::MILLISECONDS_IN_HOUR,
            Self::Day => TimeSpan::MILLISECONDS_IN_DAY,
            Self::Week => TimeSpan::MILLISECONDS_IN_WEEK,
            Self::Month => TimeSpan::MILLISECONDS_IN_MONTH,
            Self::Year => TimeSpan::MILLISECONDS_IN_YEAR,
        }
    }
}

/// Bar periodicity, e.g. "5 minute".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub periodicity: Periodicity,
    pub interval: f64,
}

impl Default for TimeFrame {
    fn default() -> Self {
        Self {
            periodicity: Periodicity::Minute,
            interval: 1.0,
        }
    }
}

impl TimeFrame {
    pub fn new(periodicity: Periodicity, interval: f64) -> ChartResult<Self> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "time frame interval must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            periodicity,
            interval,
        })
    }

    /// Bar duration in milliseconds.
    #[must_use]
    pub fn to_time_interval(self) -> f64 {
        self.interval * self.periodicity.unit_millis() as f64
    }

    /// Picks the coarsest periodicity not longer than `time_interval`.
    ///
    /// Weeks are only chosen for exact multiples. Sub-second intervals fail.
    pub fn from_time_interval(time_interval: i64) -> ChartResult<Self> {
        let ratio = |unit: i64| time_interval as f64 / unit as f64;

        let frame = if time_interval >= TimeSpan::MILLISECONDS_IN_YEAR {
            (Periodicity::Year, ratio(TimeSpan::MILLISECONDS_IN_YEAR))
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_MONTH {
            (Periodicity::Month, ratio(TimeSpan::MILLISECONDS_IN_MONTH))
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_WEEK
            && time_interval % TimeSpan::MILLISECONDS_IN_WEEK == 0
        {
            (Periodicity::Week, ratio(TimeSpan::MILLISECONDS_IN_WEEK))
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_DAY {
            (Periodicity::Day, ratio(TimeSpan::MILLISECONDS_IN_DAY))
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_HOUR {
            (Periodicity::Hour, ratio(TimeSpan::MILLISECONDS_IN_HOUR))
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_MINUTE {
            (Periodicity::Minute, ratio(TimeSpan::MILLISECONDS_IN_MINUTE))
        } else if time_interval >= TimeSpan::MILLISECONDS_IN_SECOND {
            (Periodicity::Second, ratio(TimeSpan::MILLISECONDS_IN_SECOND))
        } else {
            return Err(ChartError::InvalidConfig(format!(
                "unsupported time interval: {time_interval}"
            )));
        };

        Self::new(frame.0, frame.1)
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interval, self.periodicity.name())
    }
}
