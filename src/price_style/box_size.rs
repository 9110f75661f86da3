use serde::{Deserialize, Serialize};

use crate::core::bar_series::BarSeries;
use crate::core::primitives::round_to_decimals;
use crate::error::{ChartError, ChartResult};

pub const DEFAULT_ATR_PERIOD: u32 = 20;

/// How a renko box, point & figure box or kagi reversal is sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BoxSize {
    /// Last value of the Wilder average true range over `period` bars.
    Atr { period: u32 },
    /// Absolute price amount.
    Fixed { price: f64 },
    /// Multiple of the instrument tick size.
    Points { ticks: f64 },
}

impl Default for BoxSize {
    fn default() -> Self {
        Self::Atr {
            period: DEFAULT_ATR_PERIOD,
        }
    }
}

impl BoxSize {
    pub fn validate(self) -> ChartResult<Self> {
        match self {
            Self::Atr { period } if period == 0 => Err(ChartError::InvalidConfig(
                "ATR period must be > 0".to_owned(),
            )),
            Self::Fixed { price } if !price.is_finite() || price <= 0.0 => Err(
                ChartError::InvalidConfig("box size must be finite and > 0".to_owned()),
            ),
            Self::Points { ticks } if !ticks.is_finite() || ticks <= 0.0 => Err(
                ChartError::InvalidConfig("box size ticks must be finite and > 0".to_owned()),
            ),
            _ => Ok(self),
        }
    }

    /// Price amount for `bars`; `None` when it cannot be determined (too few
    /// bars for the ATR, missing tick size, or a non-positive result).
    #[must_use]
    pub fn resolve(self, bars: &BarSeries, tick_size: Option<f64>) -> Option<f64> {
        let value = match self {
            Self::Atr { period } => average_true_range(bars, period)?,
            Self::Fixed { price } => price,
            Self::Points { ticks } => ticks * tick_size.filter(|size| *size > 0.0)?,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// Latest Wilder ATR rounded to 5 decimals. Records with null prices are
/// skipped; `None` until `period` valid records exist.
#[must_use]
pub fn average_true_range(bars: &BarSeries, period: u32) -> Option<f64> {
    if period == 0 {
        return None;
    }
    let period_f = f64::from(period);
    let mut prev_close: Option<f64> = None;
    let mut seen = 0_u32;
    let mut sum = 0.0;
    let mut atr: Option<f64> = None;

    for bar in bars.iter() {
        let range = bar.high - bar.low;
        let true_range = match prev_close {
            Some(close) => range
                .max((bar.high - close).abs())
                .max((bar.low - close).abs()),
            None => range,
        };
        prev_close = Some(bar.close);

        atr = match atr {
            Some(previous) => Some((previous * (period_f - 1.0) + true_range) / period_f),
            None => {
                seen += 1;
                sum += true_range;
                (seen == period).then(|| sum / period_f)
            }
        };
    }

    atr.map(|value| round_to_decimals(value, 5))
}
