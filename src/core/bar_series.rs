use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::data_series::DataSeries;
use crate::core::dictionary::Dictionary;
use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64};
use crate::error::{ChartError, ChartResult};

pub const DATE_SUFFIX: &str = ".date";
pub const OPEN_SUFFIX: &str = ".open";
pub const HIGH_SUFFIX: &str = ".high";
pub const LOW_SUFFIX: &str = ".low";
pub const CLOSE_SUFFIX: &str = ".close";
pub const VOLUME_SUFFIX: &str = ".volume";

/// One OHLCV record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix epoch milliseconds.
    pub date: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Builds a validated bar.
    ///
    /// Invariants:
    /// - prices and volume are finite, volume is `>= 0`
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    pub fn new(date: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> ChartResult<Self> {
        if !open.is_finite()
            || !high.is_finite()
            || !low.is_finite()
            || !close.is_finite()
            || !volume.is_finite()
        {
            return Err(ChartError::InvalidData(
                "bar values must be finite".to_owned(),
            ));
        }
        if volume < 0.0 {
            return Err(ChartError::InvalidData(
                "bar volume must be >= 0".to_owned(),
            ));
        }
        if low > high {
            return Err(ChartError::InvalidData("bar low must be <= high".to_owned()));
        }
        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "bar open/close must be within low/high range".to_owned(),
            ));
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn from_decimal(
        date: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_millis(date),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            decimal_to_f64(volume, "volume")?,
        )
    }

    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}

/// Column-oriented OHLCV storage.
///
/// All six columns always have the same length; records are appended in
/// chronological order at the live edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BarSeries {
    date: DataSeries<i64>,
    open: DataSeries<f64>,
    high: DataSeries<f64>,
    low: DataSeries<f64>,
    close: DataSeries<f64>,
    volume: DataSeries<f64>,
}

impl BarSeries {
    /// Empty series whose columns are named `<prefix>.date`, `<prefix>.open`, ...
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            date: DataSeries::new(format!("{prefix}{DATE_SUFFIX}")),
            open: DataSeries::new(format!("{prefix}{OPEN_SUFFIX}")),
            high: DataSeries::new(format!("{prefix}{HIGH_SUFFIX}")),
            low: DataSeries::new(format!("{prefix}{LOW_SUFFIX}")),
            close: DataSeries::new(format!("{prefix}{CLOSE_SUFFIX}")),
            volume: DataSeries::new(format!("{prefix}{VOLUME_SUFFIX}")),
        }
    }

    pub fn from_bars(prefix: &str, bars: &[Bar]) -> ChartResult<Self> {
        let mut series = Self::new(prefix);
        for bar in bars {
            series.push(*bar)?;
        }
        Ok(series)
    }

    /// Appends a bar; a bar dated before the current last bar is rejected.
    pub fn push(&mut self, bar: Bar) -> ChartResult<()> {
        if let Some(last) = self.date.last_value() {
            if bar.date < last {
                return Err(ChartError::InvalidData(format!(
                    "bar date {} precedes last date {last}",
                    bar.date
                )));
            }
        }
        self.push_unchecked(bar);
        Ok(())
    }

    /// Appends without the chronology check. Used by converters whose output
    /// dates may repeat.
    pub(crate) fn push_unchecked(&mut self, bar: Bar) {
        self.date.push(Some(bar.date));
        self.open.push(Some(bar.open));
        self.high.push(Some(bar.high));
        self.low.push(Some(bar.low));
        self.close.push(Some(bar.close));
        self.volume.push(Some(bar.volume));
    }

    /// Appends a record with a date but no prices, e.g. a halted session.
    pub fn push_gap(&mut self, date: i64) -> ChartResult<()> {
        if let Some(last) = self.date.last_value() {
            if date < last {
                return Err(ChartError::InvalidData(format!(
                    "gap date {date} precedes last date {last}"
                )));
            }
        }
        self.push_gap_unchecked(Some(date));
        Ok(())
    }

    pub(crate) fn push_gap_unchecked(&mut self, date: Option<i64>) {
        self.date.push(date);
        self.open.push(None);
        self.high.push(None);
        self.low.push(None);
        self.close.push(None);
        self.volume.push(None);
    }

    /// Inserts older bars before the first record, e.g. a history page.
    ///
    /// `bars` must be chronological and end no later than the current first
    /// bar. Returns how many records were inserted.
    pub fn prepend(&mut self, bars: &[Bar]) -> ChartResult<usize> {
        if bars.windows(2).any(|pair| pair[1].date < pair[0].date) {
            return Err(ChartError::InvalidData(
                "prepended bars must be chronological".to_owned(),
            ));
        }
        if let (Some(last_new), Some(first)) = (bars.last(), self.date.first_value()) {
            if last_new.date > first {
                return Err(ChartError::InvalidData(format!(
                    "prepended bar date {} follows first date {first}",
                    last_new.date
                )));
            }
        }
        self.date.prepend(bars.iter().map(|bar| Some(bar.date)));
        self.open.prepend(bars.iter().map(|bar| Some(bar.open)));
        self.high.prepend(bars.iter().map(|bar| Some(bar.high)));
        self.low.prepend(bars.iter().map(|bar| Some(bar.low)));
        self.close.prepend(bars.iter().map(|bar| Some(bar.close)));
        self.volume.prepend(bars.iter().map(|bar| Some(bar.volume)));
        Ok(bars.len())
    }

    /// Replaces the live (last) bar. Its date must not move before the
    /// previous bar.
    pub fn update_last(&mut self, bar: Bar) -> ChartResult<()> {
        let len = self.len();
        if len == 0 {
            return Err(ChartError::NotFound(
                "cannot update last bar of an empty series".to_owned(),
            ));
        }
        if len > 1 {
            if let Some(previous) = self.date.value(len - 2) {
                if bar.date < previous {
                    return Err(ChartError::InvalidData(
                        "updated bar date precedes previous bar".to_owned(),
                    ));
                }
            }
        }
        self.date.update_last(Some(bar.date));
        self.open.update_last(Some(bar.open));
        self.high.update_last(Some(bar.high));
        self.low.update_last(Some(bar.low));
        self.close.update_last(Some(bar.close));
        self.volume.update_last(Some(bar.volume));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.date.clear();
        self.open.clear();
        self.high.clear();
        self.low.clear();
        self.close.clear();
        self.volume.clear();
    }

    /// Drops the oldest bars so at most `max_len` remain.
    pub fn trim(&mut self, max_len: usize) -> usize {
        let removed = self.date.trim(max_len);
        self.open.trim(max_len);
        self.high.trim(max_len);
        self.low.trim(max_len);
        self.close.trim(max_len);
        self.volume.trim(max_len);
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.date.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    /// Bar at `index`, `None` when any column is null there.
    #[must_use]
    pub fn bar(&self, index: usize) -> Option<Bar> {
        Some(Bar {
            date: self.date.value(index)?,
            open: self.open.value(index)?,
            high: self.high.value(index)?,
            low: self.low.value(index)?,
            close: self.close.value(index)?,
            volume: self.volume.value(index)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Bar> + '_ {
        (0..self.len()).filter_map(|index| self.bar(index))
    }

    #[must_use]
    pub fn dates(&self) -> &DataSeries<i64> {
        &self.date
    }

    #[must_use]
    pub fn open(&self) -> &DataSeries<f64> {
        &self.open
    }

    #[must_use]
    pub fn high(&self) -> &DataSeries<f64> {
        &self.high
    }

    #[must_use]
    pub fn low(&self) -> &DataSeries<f64> {
        &self.low
    }

    #[must_use]
    pub fn close(&self) -> &DataSeries<f64> {
        &self.close
    }

    #[must_use]
    pub fn volume(&self) -> &DataSeries<f64> {
        &self.volume
    }

    /// Lowest low / highest high over `[start, start + count)`.
    #[must_use]
    pub fn price_range(&self, start: usize, count: usize) -> Option<(f64, f64)> {
        let low = self.low.min_max(start, count)?;
        let high = self.high.min_max(start, count)?;
        Some((low.min, high.max))
    }
}

/// Auxiliary named series aligned with the chart's bar records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    series: Dictionary<String, DataSeries<f64>>,
}

impl SeriesSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a series of exactly `record_count` values under its own name.
    pub fn add(&mut self, series: DataSeries<f64>, record_count: usize) -> ChartResult<()> {
        if series.name().is_empty() {
            return Err(ChartError::InvalidConfig(
                "data series name must not be empty".to_owned(),
            ));
        }
        if series.len() != record_count {
            return Err(ChartError::InvalidData(format!(
                "data series `{}` has {} values, expected {record_count}",
                series.name(),
                series.len()
            )));
        }
        self.series.add(series.name().to_owned(), series)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.series.remove(&name.to_owned())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DataSeries<f64>> {
        self.series.get(&name.to_owned())
    }

    pub fn require(&self, name: &str) -> ChartResult<&DataSeries<f64>> {
        self.get(name)
            .ok_or_else(|| ChartError::NotFound(format!("data series `{name}`")))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DataSeries<f64>> {
        self.series.get_mut(&name.to_owned())
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.series.count()
    }

    /// Returns `true` when every series has `record_count` values.
    #[must_use]
    pub fn is_aligned(&self, record_count: usize) -> bool {
        self.series.values().all(|series| series.len() == record_count)
    }

    /// Keeps every series aligned after the bars were trimmed.
    pub fn trim(&mut self, max_len: usize) {
        for series in self.series.values_mut() {
            series.trim(max_len);
        }
    }

    /// Pads every series with `count` nulls at the front after older bars
    /// were prepended.
    pub fn prepend_nulls(&mut self, count: usize) {
        for series in self.series.values_mut() {
            series.prepend(std::iter::repeat_n(None, count));
        }
    }

    /// Pads every series with a trailing null after a bar was appended.
    pub fn push_nulls(&mut self) {
        for series in self.series.values_mut() {
            series.push(None);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.series.keys()
    }
}
