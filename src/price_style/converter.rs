//! Derived bar series for the collapsing price styles.
//!
//! Every conversion is a full recompute over the source bars. Records whose
//! prices are null are skipped, so the first non-null bar seeds the state.

use tracing::{trace, warn};

use crate::core::bar_series::{Bar, BarSeries};
use crate::price_style::{BoxSize, PointAndFigureSource, PriceStyle};
use crate::state::Stateful;

pub const HEIKIN_ASHI_PREFIX: &str = ".heikinAshi";
pub const RENKO_PREFIX: &str = ".renko";
pub const LINE_BREAK_PREFIX: &str = ".lineBreak";
pub const POINT_AND_FIGURE_PREFIX: &str = ".pointAndFigure";
pub const KAGI_PREFIX: &str = ".kagi";

/// Added to a renko brick date for each extra brick formed by one source bar.
const RENKO_BRICK_STEP_MS: i64 = 1000;
/// Column heights below this are treated as no reversal.
const POINT_AND_FIGURE_EPSILON: f64 = 1e-4;

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn push_bar(out: &mut BarSeries, date: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) {
    out.push_unchecked(Bar {
        date,
        open,
        high,
        low,
        close,
        volume,
    });
}

/// Same length as the source; null records stay null.
#[must_use]
pub fn heikin_ashi(bars: &BarSeries) -> BarSeries {
    let mut out = BarSeries::new(HEIKIN_ASHI_PREFIX);
    let mut previous: Option<(f64, f64)> = None;

    for index in 0..bars.len() {
        let Some(bar) = bars.bar(index) else {
            out.push_gap_unchecked(bars.dates().value(index));
            continue;
        };
        let open = previous.map_or(bar.open, |(open, close)| (open + close) / 2.0);
        let close = (bar.open + bar.high + bar.low + bar.close) / 4.0;
        let high = open.max(close).max(bar.high);
        let low = open.min(close).min(bar.low);
        push_bar(&mut out, bar.date, open, high, low, close, bar.volume);
        previous = Some((open, close));
    }
    out
}

/// Fixed-size bricks on closing prices. A brick takes the date of the first
/// source bar since the previous brick; further bricks formed at the same
/// step follow one second apart.
#[must_use]
pub fn renko(bars: &BarSeries, box_size: f64) -> BarSeries {
    let mut out = BarSeries::new(RENKO_PREFIX);
    let mut source = bars.iter();
    let Some(first) = source.next() else {
        return out;
    };

    let start = (first.open / box_size).floor() * box_size;
    let mut low_bound = start + box_size;
    let mut high_bound = low_bound - box_size;
    let mut volume = 0.0;
    let mut time: Option<i64> = None;

    for bar in std::iter::once(first).chain(source) {
        volume += bar.volume;
        let mut date = *time.get_or_insert(bar.date);
        let price = bar.close;

        if price - high_bound >= box_size {
            let bricks = ((price - high_bound) / box_size).trunc() as usize;
            for _ in 0..bricks {
                low_bound = high_bound;
                high_bound += box_size;
                push_bar(&mut out, date, low_bound, high_bound, low_bound, high_bound, volume);
                date += RENKO_BRICK_STEP_MS;
            }
            volume = 0.0;
            time = None;
        } else if low_bound - price >= box_size {
            let bricks = ((low_bound - price) / box_size).trunc() as usize;
            for _ in 0..bricks {
                high_bound = low_bound;
                low_bound -= box_size;
                push_bar(&mut out, date, high_bound, high_bound, low_bound, low_bound, volume);
                date += RENKO_BRICK_STEP_MS;
            }
            volume = 0.0;
            time = None;
        }
    }
    out
}

/// Three-line break (or `lines`-line break) on closing prices.
#[must_use]
pub fn line_break(bars: &BarSeries, lines: u32) -> BarSeries {
    let mut out = BarSeries::new(LINE_BREAK_PREFIX);
    let mut source = bars.iter().peekable();
    let Some(first) = source.peek().copied() else {
        return out;
    };

    let lines = lines.max(1) as usize;
    let mut min = first.open;
    let mut max = first.open;
    let mut volume = 0.0;
    let mut time: Option<i64> = None;
    // (open, high, low, close) of every emitted line.
    let mut emitted: Vec<(f64, f64, f64, f64)> = Vec::new();

    for bar in source {
        volume += bar.volume;
        let date = *time.get_or_insert(bar.date);
        let price = bar.close;
        let is_new_max = price > max;
        let is_new_min = price < min;
        if !is_new_max && !is_new_min {
            continue;
        }

        let count = emitted.len();
        let open = match emitted.last() {
            Some(&(_, high, low, _)) => {
                if is_new_max {
                    high
                } else {
                    low
                }
            }
            None => min,
        };
        let line = (open, open.max(price), open.min(price), price);
        push_bar(&mut out, date, line.0, line.1, line.2, line.3, volume);
        emitted.push(line);

        let lookback = count.saturating_sub(lines)..count;
        if is_new_max {
            max = price;
            for &(open, _, low, close) in emitted[lookback.clone()].iter().rev() {
                if close > open {
                    min = low;
                } else {
                    break;
                }
            }
        }
        if is_new_min {
            min = price;
            for &(open, high, _, close) in emitted[lookback].iter().rev() {
                if close < open {
                    max = high;
                } else {
                    break;
                }
            }
        }

        time = None;
        volume = 0.0;
    }
    out
}

/// X (rising) and O (falling) columns. A column reverses once price moves
/// `reversal_amount` boxes against it; the open column is emitted last.
#[must_use]
pub fn point_and_figure(
    bars: &BarSeries,
    box_size: f64,
    reversal_amount: f64,
    source: PointAndFigureSource,
) -> BarSeries {
    let mut out = BarSeries::new(POINT_AND_FIGURE_PREFIX);
    let records: Vec<Bar> = bars.iter().collect();
    let Some(first) = records.first() else {
        return out;
    };

    let use_high_low = source == PointAndFigureSource::HighLow;
    let high_of = |bar: &Bar| if use_high_low { bar.high } else { bar.close };
    let low_of = |bar: &Bar| if use_high_low { bar.low } else { bar.close };

    let reversal = box_size * reversal_amount;
    let mut high_bound = first.close + box_size / 2.0;
    let mut low_bound = high_bound - box_size;
    let mut is_rising = false;
    let mut volume = 0.0;
    let mut time: Option<i64> = None;

    let mut start = records.len();
    for (index, bar) in records.iter().enumerate() {
        if high_of(bar) > high_bound {
            is_rising = true;
            start = index;
            break;
        }
        if low_of(bar) < low_bound {
            is_rising = false;
            start = index;
            break;
        }
        volume += bar.volume;
    }

    for bar in &records[start..] {
        volume += bar.volume;
        let date = *time.get_or_insert(bar.date);
        let high = high_of(bar);
        let low = low_of(bar);

        if is_rising {
            if high > high_bound {
                high_bound += round_half_up((high - high_bound) / box_size) * box_size;
            } else if low < high_bound - reversal {
                let new_high = high_bound - box_size;
                let new_low = low_bound - round_half_up((low_bound - low) / box_size) * box_size;
                if (new_high - new_low).abs() > POINT_AND_FIGURE_EPSILON {
                    push_bar(&mut out, date, low_bound, high_bound, low_bound, high_bound, volume);
                    low_bound = new_low;
                    high_bound = new_high;
                    volume = 0.0;
                    time = None;
                    is_rising = false;
                }
            }
        } else if low < low_bound {
            low_bound -= round_half_up((low_bound - low) / box_size) * box_size;
        } else if high > low_bound + reversal {
            let new_low = low_bound + box_size;
            let new_high = high_bound + round_half_up((high - high_bound) / box_size) * box_size;
            if (new_high - new_low).abs() > POINT_AND_FIGURE_EPSILON {
                push_bar(&mut out, date, high_bound, high_bound, low_bound, low_bound, volume);
                low_bound = new_low;
                high_bound = new_high;
                volume = 0.0;
                time = None;
                is_rising = true;
            }
        }
    }

    if let Some(date) = time {
        let (open, close) = if is_rising {
            (low_bound, high_bound)
        } else {
            (high_bound, low_bound)
        };
        push_bar(&mut out, date, open, high_bound, low_bound, close, volume);
    }
    out
}

/// Kagi lines: a segment ends when price reverses by at least `reversal`.
/// The segment still forming is not emitted.
#[must_use]
pub fn kagi(bars: &BarSeries, reversal: f64) -> BarSeries {
    let mut out = BarSeries::new(KAGI_PREFIX);
    let mut source = bars.iter().peekable();
    let Some(first) = source.peek().copied() else {
        return out;
    };

    let mut check_price = first.close;
    let mut prev_check_price = first.open;
    let mut is_rising = check_price >= prev_check_price;
    let mut volume = 0.0;
    let mut time: Option<i64> = None;

    for bar in source {
        let date = *time.get_or_insert(bar.date);
        let delta = bar.close - check_price;
        let is_reversal = is_rising != (delta >= 0.0);

        if is_reversal && delta.abs() >= reversal {
            push_bar(
                &mut out,
                date,
                prev_check_price,
                prev_check_price.max(check_price),
                prev_check_price.min(check_price),
                check_price,
                volume,
            );
            prev_check_price = check_price;
            check_price = bar.close;
            is_rising = !is_rising;
            time = None;
            volume = 0.0;
        } else {
            check_price = if is_rising {
                check_price.max(bar.close)
            } else {
                check_price.min(bar.close)
            };
            volume += bar.volume;
        }
    }
    out
}

/// Keeps the derived series of the active price style in sync with the
/// source bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStyleConverter {
    style: PriceStyle,
    tick_size: Option<f64>,
    box_size_value: Option<f64>,
    derived: Option<BarSeries>,
}

impl Default for PriceStyleConverter {
    fn default() -> Self {
        Self::new(PriceStyle::default())
    }
}

impl PriceStyleConverter {
    #[must_use]
    pub fn new(style: PriceStyle) -> Self {
        Self {
            style,
            tick_size: None,
            box_size_value: None,
            derived: None,
        }
    }

    #[must_use]
    pub fn with_tick_size(mut self, tick_size: Option<f64>) -> Self {
        self.tick_size = tick_size;
        self
    }

    #[must_use]
    pub fn style(&self) -> &PriceStyle {
        &self.style
    }

    /// Switches style; the derived series is dropped until the next recompute.
    pub fn set_style(&mut self, style: PriceStyle) {
        self.style = style;
        self.box_size_value = None;
        self.derived = None;
    }

    #[must_use]
    pub fn tick_size(&self) -> Option<f64> {
        self.tick_size
    }

    pub fn set_tick_size(&mut self, tick_size: Option<f64>) {
        self.tick_size = tick_size;
    }

    /// Resolved box size (renko, point & figure) or reversal (kagi) of the
    /// last recompute.
    #[must_use]
    pub fn box_size_value(&self) -> Option<f64> {
        self.box_size_value
    }

    #[must_use]
    pub fn derived(&self) -> Option<&BarSeries> {
        self.derived.as_ref()
    }

    /// Series to plot: the derived one when the style has it, else `source`.
    #[must_use]
    pub fn series<'a>(&'a self, source: &'a BarSeries) -> &'a BarSeries {
        self.derived.as_ref().unwrap_or(source)
    }

    /// Regenerates the derived series from scratch. Returns `false` when the
    /// style plots the source bars directly or the conversion was skipped.
    pub fn recompute(&mut self, bars: &BarSeries) -> bool {
        let style = self.style.clone();
        self.box_size_value = None;
        self.derived = match &style {
            _ if bars.is_empty() => style.derived_prefix().map(BarSeries::new),
            PriceStyle::HeikinAshi(_) => Some(heikin_ashi(bars)),
            PriceStyle::Renko(options) => self
                .resolve(options.box_size, bars)
                .map(|size| renko(bars, size)),
            PriceStyle::LineBreak(options) => Some(line_break(bars, options.lines)),
            PriceStyle::PointAndFigure(options) => self
                .resolve(options.box_size, bars)
                .map(|size| point_and_figure(bars, size, options.reversal, options.source)),
            PriceStyle::Kagi(options) => self
                .resolve(options.reversal, bars)
                .map(|size| kagi(bars, size)),
            _ => None,
        };
        if let Some(derived) = &self.derived {
            trace!(
                style = style.class_name(),
                source_len = bars.len(),
                derived_len = derived.len(),
                "price style recomputed"
            );
        }
        self.derived.is_some()
    }

    fn resolve(&mut self, box_size: BoxSize, bars: &BarSeries) -> Option<f64> {
        let value = box_size.resolve(bars, self.tick_size);
        if value.is_none() {
            warn!(
                style = self.style.class_name(),
                ?box_size,
                tick_size = ?self.tick_size,
                "box size cannot be resolved; conversion skipped"
            );
        }
        self.box_size_value = value;
        value
    }
}
