//! How bars are drawn, and the derived series some styles plot instead of the
//! source bars.

mod box_size;
mod converter;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub use box_size::{BoxSize, DEFAULT_ATR_PERIOD, average_true_range};
pub use converter::{
    HEIKIN_ASHI_PREFIX, KAGI_PREFIX, LINE_BREAK_PREFIX, POINT_AND_FIGURE_PREFIX,
    PriceStyleConverter, RENKO_PREFIX, heikin_ashi, kagi, line_break, point_and_figure, renko,
};

use crate::error::{ChartError, ChartResult};
use crate::state::{
    CLASS_NAME_KEY, OPTIONS_KEY, Stateful, class_name_of, options_or_default, to_state_value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceStyleKind {
    Bar,
    Candle,
    ColoredBar,
    ColoredHlBar,
    ColoredHlcBar,
    HeikinAshi,
    HlBar,
    HlcBar,
    HollowCandle,
    Kagi,
    LineBreak,
    Line,
    Mountain,
    PointAndFigure,
    Renko,
}

impl PriceStyleKind {
    pub const ALL: [Self; 15] = [
        Self::Bar,
        Self::Candle,
        Self::ColoredBar,
        Self::ColoredHlBar,
        Self::ColoredHlcBar,
        Self::HeikinAshi,
        Self::HlBar,
        Self::HlcBar,
        Self::HollowCandle,
        Self::Kagi,
        Self::LineBreak,
        Self::Line,
        Self::Mountain,
        Self::PointAndFigure,
        Self::Renko,
    ];

    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Candle => "candle",
            Self::ColoredBar => "coloredBar",
            Self::ColoredHlBar => "coloredHLBar",
            Self::ColoredHlcBar => "coloredHLCBar",
            Self::HeikinAshi => "heikinAshi",
            Self::HlBar => "HLBar",
            Self::HlcBar => "HLCBar",
            Self::HollowCandle => "hollowCandle",
            Self::Kagi => "kagi",
            Self::LineBreak => "lineBreak",
            Self::Line => "line",
            Self::Mountain => "mountain",
            Self::PointAndFigure => "pointAndFigure",
            Self::Renko => "renko",
        }
    }

    #[must_use]
    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.class_name() == name)
    }

    #[must_use]
    pub fn create_default(self) -> PriceStyle {
        let lines = ValueLineOptions::default();
        match self {
            Self::Bar => PriceStyle::Bar(lines),
            Self::Candle => PriceStyle::Candle(lines),
            Self::ColoredBar => PriceStyle::ColoredBar(lines),
            Self::ColoredHlBar => PriceStyle::ColoredHlBar(lines),
            Self::ColoredHlcBar => PriceStyle::ColoredHlcBar(lines),
            Self::HeikinAshi => PriceStyle::HeikinAshi(lines),
            Self::HlBar => PriceStyle::HlBar(lines),
            Self::HlcBar => PriceStyle::HlcBar(lines),
            Self::HollowCandle => PriceStyle::HollowCandle(lines),
            Self::Kagi => PriceStyle::Kagi(KagiOptions::default()),
            Self::LineBreak => PriceStyle::LineBreak(LineBreakOptions::default()),
            Self::Line => PriceStyle::Line(lines),
            Self::Mountain => PriceStyle::Mountain(lines),
            Self::PointAndFigure => PriceStyle::PointAndFigure(PointAndFigureOptions::default()),
            Self::Renko => PriceStyle::Renko(RenkoOptions::default()),
        }
    }
}

/// How a bar is drawn, shared by several price styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotShape {
    /// Open/close body with high/low wick.
    Candle { hollow: bool },
    /// Vertical high/low line with open and close ticks.
    Ohlc { open_tick: bool, close_tick: bool },
    /// Polyline through closes, optionally filled down to the frame bottom.
    Line { filled: bool },
    /// Open/close box without wick (renko bricks, line-break lines, P&F columns).
    Box,
    /// Vertical open/close segments joined horizontally.
    Kagi,
}

/// Options every price style carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueLineOptions {
    /// Draws a horizontal line at the last close.
    pub show_value_lines: bool,
    /// Extends value lines over the whole panel width.
    pub extend_value_lines: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenkoOptions {
    #[serde(flatten)]
    pub value_lines: ValueLineOptions,
    pub box_size: BoxSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineBreakOptions {
    #[serde(flatten)]
    pub value_lines: ValueLineOptions,
    pub lines: u32,
}

impl Default for LineBreakOptions {
    fn default() -> Self {
        Self {
            value_lines: ValueLineOptions::default(),
            lines: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointAndFigureSource {
    #[default]
    Close,
    HighLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointAndFigureOptions {
    #[serde(flatten)]
    pub value_lines: ValueLineOptions,
    pub box_size: BoxSize,
    /// Boxes against the column needed to start a new one.
    pub reversal: f64,
    pub source: PointAndFigureSource,
}

impl Default for PointAndFigureOptions {
    fn default() -> Self {
        Self {
            value_lines: ValueLineOptions::default(),
            box_size: BoxSize::default(),
            reversal: 3.0,
            source: PointAndFigureSource::Close,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KagiOptions {
    #[serde(flatten)]
    pub value_lines: ValueLineOptions,
    pub reversal: BoxSize,
}

/// Active price style and its options.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceStyle {
    Bar(ValueLineOptions),
    Candle(ValueLineOptions),
    ColoredBar(ValueLineOptions),
    ColoredHlBar(ValueLineOptions),
    ColoredHlcBar(ValueLineOptions),
    HeikinAshi(ValueLineOptions),
    HlBar(ValueLineOptions),
    HlcBar(ValueLineOptions),
    HollowCandle(ValueLineOptions),
    Kagi(KagiOptions),
    LineBreak(LineBreakOptions),
    Line(ValueLineOptions),
    Mountain(ValueLineOptions),
    PointAndFigure(PointAndFigureOptions),
    Renko(RenkoOptions),
}

impl Default for PriceStyle {
    fn default() -> Self {
        PriceStyleKind::Candle.create_default()
    }
}

impl PriceStyle {
    #[must_use]
    pub fn kind(&self) -> PriceStyleKind {
        match self {
            Self::Bar(_) => PriceStyleKind::Bar,
            Self::Candle(_) => PriceStyleKind::Candle,
            Self::ColoredBar(_) => PriceStyleKind::ColoredBar,
            Self::ColoredHlBar(_) => PriceStyleKind::ColoredHlBar,
            Self::ColoredHlcBar(_) => PriceStyleKind::ColoredHlcBar,
            Self::HeikinAshi(_) => PriceStyleKind::HeikinAshi,
            Self::HlBar(_) => PriceStyleKind::HlBar,
            Self::HlcBar(_) => PriceStyleKind::HlcBar,
            Self::HollowCandle(_) => PriceStyleKind::HollowCandle,
            Self::Kagi(_) => PriceStyleKind::Kagi,
            Self::LineBreak(_) => PriceStyleKind::LineBreak,
            Self::Line(_) => PriceStyleKind::Line,
            Self::Mountain(_) => PriceStyleKind::Mountain,
            Self::PointAndFigure(_) => PriceStyleKind::PointAndFigure,
            Self::Renko(_) => PriceStyleKind::Renko,
        }
    }

    #[must_use]
    pub fn value_lines(&self) -> ValueLineOptions {
        match self {
            Self::Bar(options)
            | Self::Candle(options)
            | Self::ColoredBar(options)
            | Self::ColoredHlBar(options)
            | Self::ColoredHlcBar(options)
            | Self::HeikinAshi(options)
            | Self::HlBar(options)
            | Self::HlcBar(options)
            | Self::HollowCandle(options)
            | Self::Line(options)
            | Self::Mountain(options) => *options,
            Self::Kagi(options) => options.value_lines,
            Self::LineBreak(options) => options.value_lines,
            Self::PointAndFigure(options) => options.value_lines,
            Self::Renko(options) => options.value_lines,
        }
    }

    pub fn set_value_lines(&mut self, value_lines: ValueLineOptions) {
        match self {
            Self::Bar(options)
            | Self::Candle(options)
            | Self::ColoredBar(options)
            | Self::ColoredHlBar(options)
            | Self::ColoredHlcBar(options)
            | Self::HeikinAshi(options)
            | Self::HlBar(options)
            | Self::HlcBar(options)
            | Self::HollowCandle(options)
            | Self::Line(options)
            | Self::Mountain(options) => *options = value_lines,
            Self::Kagi(options) => options.value_lines = value_lines,
            Self::LineBreak(options) => options.value_lines = value_lines,
            Self::PointAndFigure(options) => options.value_lines = value_lines,
            Self::Renko(options) => options.value_lines = value_lines,
        }
    }

    /// Name prefix of the derived series; `None` for styles that plot the
    /// source bars.
    #[must_use]
    pub fn derived_prefix(&self) -> Option<&'static str> {
        match self {
            Self::HeikinAshi(_) => Some(HEIKIN_ASHI_PREFIX),
            Self::Kagi(_) => Some(KAGI_PREFIX),
            Self::LineBreak(_) => Some(LINE_BREAK_PREFIX),
            Self::PointAndFigure(_) => Some(POINT_AND_FIGURE_PREFIX),
            Self::Renko(_) => Some(RENKO_PREFIX),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.derived_prefix().is_some()
    }

    /// Colors bars by their direction versus the previous close rather than
    /// their own open.
    #[must_use]
    pub fn colors_by_previous_close(&self) -> bool {
        matches!(
            self,
            Self::ColoredBar(_) | Self::ColoredHlBar(_) | Self::ColoredHlcBar(_)
        )
    }

    #[must_use]
    pub fn plot_shape(&self) -> PlotShape {
        match self {
            Self::Candle(_) | Self::HeikinAshi(_) => PlotShape::Candle { hollow: false },
            Self::HollowCandle(_) => PlotShape::Candle { hollow: true },
            Self::Bar(_) | Self::ColoredBar(_) => PlotShape::Ohlc {
                open_tick: true,
                close_tick: true,
            },
            Self::HlBar(_) | Self::ColoredHlBar(_) => PlotShape::Ohlc {
                open_tick: false,
                close_tick: false,
            },
            Self::HlcBar(_) | Self::ColoredHlcBar(_) => PlotShape::Ohlc {
                open_tick: false,
                close_tick: true,
            },
            Self::Line(_) => PlotShape::Line { filled: false },
            Self::Mountain(_) => PlotShape::Line { filled: true },
            Self::Renko(_) | Self::LineBreak(_) | Self::PointAndFigure(_) => PlotShape::Box,
            Self::Kagi(_) => PlotShape::Kagi,
        }
    }

    pub fn validate(self) -> ChartResult<Self> {
        match &self {
            Self::Renko(options) => {
                options.box_size.validate()?;
            }
            Self::Kagi(options) => {
                options.reversal.validate()?;
            }
            Self::LineBreak(options) if options.lines == 0 => {
                return Err(ChartError::InvalidConfig(
                    "line break lines must be > 0".to_owned(),
                ));
            }
            Self::PointAndFigure(options) => {
                options.box_size.validate()?;
                if !options.reversal.is_finite() || options.reversal <= 0.0 {
                    return Err(ChartError::InvalidConfig(
                        "point & figure reversal must be finite and > 0".to_owned(),
                    ));
                }
            }
            _ => {}
        }
        Ok(self)
    }

    fn options_value(&self) -> ChartResult<Value> {
        match self {
            Self::Kagi(options) => to_state_value(options),
            Self::LineBreak(options) => to_state_value(options),
            Self::PointAndFigure(options) => to_state_value(options),
            Self::Renko(options) => to_state_value(options),
            _ => to_state_value(&self.value_lines()),
        }
    }
}

impl Stateful for PriceStyle {
    fn class_name(&self) -> &str {
        self.kind().class_name()
    }

    fn save_state(&self) -> ChartResult<Value> {
        Ok(json!({ CLASS_NAME_KEY: self.class_name(), OPTIONS_KEY: self.options_value()? }))
    }

    /// Loads options for the style named by the blob; a blob without a class
    /// name keeps the current style.
    fn load_state(&mut self, state: &Value) -> ChartResult<()> {
        let kind = match class_name_of(state) {
            Ok(name) => PriceStyleKind::from_class_name(name)
                .ok_or_else(|| ChartError::NotRegistered(name.to_owned()))?,
            Err(ChartError::MissingClassName) => self.kind(),
            Err(e) => return Err(e),
        };
        let loaded = match kind {
            PriceStyleKind::Kagi => Self::Kagi(options_or_default(state)?),
            PriceStyleKind::LineBreak => Self::LineBreak(options_or_default(state)?),
            PriceStyleKind::PointAndFigure => Self::PointAndFigure(options_or_default(state)?),
            PriceStyleKind::Renko => Self::Renko(options_or_default(state)?),
            plain => {
                let options: ValueLineOptions = options_or_default(state)?;
                let mut style = plain.create_default();
                style.set_value_lines(options);
                style
            }
        };
        *self = loaded.validate()?;
        Ok(())
    }
}
