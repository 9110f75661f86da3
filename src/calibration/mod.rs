//! Tick and label placement for the date and value scales.
//!
//! A calibrator turns a projection snapshot into ordered major ticks (with
//! text) and optional minor ticks between them. Calibration always starts
//! from scratch, so running it twice on the same input gives the same ticks.

mod date;
pub mod format;
mod value;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::projection::{DateProjection, ValueProjection};
use crate::core::types::{Padding, Rect};
use crate::error::{ChartError, ChartResult};
use crate::render::TextHAlign;
use crate::state::{CLASS_NAME_KEY, OPTIONS_KEY, Stateful, class_name_of, options_or_default, to_state_value};

pub use format::{
    CustomDateFormat, DateGranularity, DateTimeFormatName, NumberFormat, TimeIntervalDateFormat,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MajorDateTick {
    pub x: f64,
    pub date_ms: i64,
    pub text_x: f64,
    pub text_align: TextHAlign,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MajorValueTick {
    pub y: f64,
    pub value: f64,
    pub text: String,
}

/// Unlabeled tick; `position` is x on the date scale and y on a value scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinorTick {
    pub position: f64,
}

/// Headless text measurement: every glyph is `char_width` wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub char_width: f64,
    pub font_size: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            font_size: 12.0,
        }
    }
}

impl TextMetrics {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.char_width.is_finite() || self.char_width <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "char width must be finite and > 0".to_owned(),
            ));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn text_width(self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
}

/// Everything the date calibrators read from the chart.
#[derive(Debug, Clone, Copy)]
pub struct DateCalibrationInput<'a> {
    pub projection: DateProjection<'a>,
    /// Horizontal panel padding around the projection frame.
    pub panel_padding: Padding,
    /// Labels are clipped to this area.
    pub text_bounds: Rect,
    /// Right edge of the panel content.
    pub max_x: f64,
    pub max_allowed_record: f64,
    pub metrics: TextMetrics,
}

/// Everything the value calibrators read from one panel.
#[derive(Debug, Clone, Copy)]
pub struct ValueCalibrationInput {
    pub projection: ValueProjection,
    pub panel_frame: Rect,
    /// Padding of the value scale itself.
    pub padding: Padding,
    pub panel_padding: Padding,
    pub metrics: TextMetrics,
}

/// Evenly splits the gap between neighbour major ticks into `count + 1` parts.
#[must_use]
pub fn minor_ticks_between(major_positions: &[f64], count: u32) -> Vec<MinorTick> {
    if count == 0 {
        return Vec::new();
    }
    let parts = f64::from(count) + 1.0;
    major_positions
        .windows(2)
        .flat_map(|pair| {
            let width = (pair[1] - pair[0]) / parts;
            (1..=count).map(move |j| MinorTick {
                position: (pair[0] + f64::from(j) * width).round(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateCalibratorKind {
    Auto,
    Fixed,
}

impl DateCalibratorKind {
    pub const ALL: [Self; 2] = [Self::Auto, Self::Fixed];

    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Auto => "StockChartX.AutoDateScaleCalibrator",
            Self::Fixed => "StockChartX.FixedDateScaleCalibrator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoDateCalibratorOptions {
    /// Minimum horizontal gap between two labels.
    pub min_labels_offset: f64,
    pub minor_ticks_count: u32,
}

impl Default for AutoDateCalibratorOptions {
    fn default() -> Self {
        Self {
            min_labels_offset: 30.0,
            minor_ticks_count: 0,
        }
    }
}

impl AutoDateCalibratorOptions {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.min_labels_offset.is_finite() || self.min_labels_offset <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "min labels offset must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Per-position label patterns; `None` falls back to `other`, then to a
/// pattern derived from the time interval.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedDateLabelsFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<CustomDateFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<CustomDateFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<CustomDateFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FixedDateCalibratorOptions {
    pub labels_count: u32,
    pub format: FixedDateLabelsFormat,
    pub minor_ticks_count: u32,
}

impl Default for FixedDateCalibratorOptions {
    fn default() -> Self {
        Self {
            labels_count: 3,
            format: FixedDateLabelsFormat::default(),
            minor_ticks_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DateCalibratorOptions {
    Auto(AutoDateCalibratorOptions),
    Fixed(FixedDateCalibratorOptions),
}

impl DateCalibratorOptions {
    #[must_use]
    pub fn kind(&self) -> DateCalibratorKind {
        match self {
            Self::Auto(_) => DateCalibratorKind::Auto,
            Self::Fixed(_) => DateCalibratorKind::Fixed,
        }
    }

    pub fn validate(self) -> ChartResult<Self> {
        match self {
            Self::Auto(options) => options.validate().map(Self::Auto),
            Self::Fixed(options) => Ok(Self::Fixed(options)),
        }
    }

    fn minor_ticks_count(&self) -> u32 {
        match self {
            Self::Auto(options) => options.minor_ticks_count,
            Self::Fixed(options) => options.minor_ticks_count,
        }
    }
}

/// Places date labels along the horizontal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DateCalibrator {
    options: DateCalibratorOptions,
    major_ticks: Vec<MajorDateTick>,
    minor_ticks: Vec<MinorTick>,
}

impl Default for DateCalibrator {
    fn default() -> Self {
        Self::with_kind(DateCalibratorKind::Auto)
    }
}

impl DateCalibrator {
    pub fn new(options: DateCalibratorOptions) -> ChartResult<Self> {
        Ok(Self {
            options: options.validate()?,
            major_ticks: Vec::new(),
            minor_ticks: Vec::new(),
        })
    }

    /// Calibrator of `kind` with default options.
    #[must_use]
    pub fn with_kind(kind: DateCalibratorKind) -> Self {
        let options = match kind {
            DateCalibratorKind::Auto => DateCalibratorOptions::Auto(AutoDateCalibratorOptions::default()),
            DateCalibratorKind::Fixed => {
                DateCalibratorOptions::Fixed(FixedDateCalibratorOptions::default())
            }
        };
        Self {
            options,
            major_ticks: Vec::new(),
            minor_ticks: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DateCalibratorKind {
        self.options.kind()
    }

    #[must_use]
    pub fn options(&self) -> &DateCalibratorOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DateCalibratorOptions) -> ChartResult<()> {
        self.options = options.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn major_ticks(&self) -> &[MajorDateTick] {
        &self.major_ticks
    }

    #[must_use]
    pub fn minor_ticks(&self) -> &[MinorTick] {
        &self.minor_ticks
    }

    /// Recomputes every tick. `None` (no viewport yet) leaves no ticks.
    pub fn calibrate(&mut self, input: Option<&DateCalibrationInput<'_>>) {
        self.major_ticks.clear();
        self.minor_ticks.clear();
        let Some(input) = input else {
            return;
        };

        match &self.options {
            DateCalibratorOptions::Auto(options) => {
                date::calibrate_auto(options, input, &mut self.major_ticks);
            }
            DateCalibratorOptions::Fixed(options) => {
                date::calibrate_fixed(options, input, &mut self.major_ticks);
            }
        }

        let positions: Vec<f64> = self.major_ticks.iter().map(|tick| tick.x).collect();
        self.minor_ticks = minor_ticks_between(&positions, self.options.minor_ticks_count());
    }
}

impl Stateful for DateCalibrator {
    fn class_name(&self) -> &str {
        self.kind().class_name()
    }

    fn save_state(&self) -> ChartResult<Value> {
        let options = match &self.options {
            DateCalibratorOptions::Auto(options) => to_state_value(options)?,
            DateCalibratorOptions::Fixed(options) => to_state_value(options)?,
        };
        Ok(json!({ CLASS_NAME_KEY: self.class_name(), OPTIONS_KEY: options }))
    }

    fn load_state(&mut self, state: &Value) -> ChartResult<()> {
        let kind = match class_name_of(state) {
            Ok(name) => DateCalibratorKind::ALL
                .into_iter()
                .find(|kind| kind.class_name() == name)
                .ok_or_else(|| ChartError::NotRegistered(name.to_string()))?,
            Err(ChartError::MissingClassName) => self.kind(),
            Err(e) => return Err(e),
        };
        let options = match kind {
            DateCalibratorKind::Auto => DateCalibratorOptions::Auto(options_or_default(state)?),
            DateCalibratorKind::Fixed => DateCalibratorOptions::Fixed(options_or_default(state)?),
        };
        self.set_options(options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCalibratorKind {
    Auto,
    Interval,
    Fixed,
}

impl ValueCalibratorKind {
    pub const ALL: [Self; 3] = [Self::Auto, Self::Interval, Self::Fixed];

    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Auto => "StockChartX.AutoValueScaleCalibrator",
            Self::Interval => "StockChartX.IntervalValueScaleCalibrator",
            Self::Fixed => "StockChartX.FixedValueScaleCalibrator",
        }
    }
}

/// Interval values below this are treated as zero.
pub const INTERVAL_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoValueCalibratorOptions {
    /// Vertical gap between labels, on top of the text height.
    pub min_values_offset: f64,
    pub minor_ticks_count: u32,
    pub number_format: NumberFormat,
}

impl Default for AutoValueCalibratorOptions {
    fn default() -> Self {
        Self {
            min_values_offset: 10.0,
            minor_ticks_count: 0,
            number_format: NumberFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntervalValueCalibratorOptions {
    /// Labels sit on multiples of this value.
    pub interval: f64,
    pub min_values_offset: f64,
    pub minor_ticks_count: u32,
    pub number_format: NumberFormat,
}

impl Default for IntervalValueCalibratorOptions {
    fn default() -> Self {
        Self {
            interval: 0.005,
            min_values_offset: 10.0,
            minor_ticks_count: 0,
            number_format: NumberFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FixedValueCalibratorOptions {
    pub labels_count: u32,
    pub minor_ticks_count: u32,
    pub number_format: NumberFormat,
}

impl Default for FixedValueCalibratorOptions {
    fn default() -> Self {
        Self {
            labels_count: 3,
            minor_ticks_count: 0,
            number_format: NumberFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueCalibratorOptions {
    Auto(AutoValueCalibratorOptions),
    Interval(IntervalValueCalibratorOptions),
    Fixed(FixedValueCalibratorOptions),
}

fn validate_values_offset(offset: f64) -> ChartResult<()> {
    if !offset.is_finite() || offset < 0.0 {
        return Err(ChartError::InvalidConfig(
            "values offset must be finite and >= 0".to_owned(),
        ));
    }
    Ok(())
}

impl ValueCalibratorOptions {
    #[must_use]
    pub fn kind(&self) -> ValueCalibratorKind {
        match self {
            Self::Auto(_) => ValueCalibratorKind::Auto,
            Self::Interval(_) => ValueCalibratorKind::Interval,
            Self::Fixed(_) => ValueCalibratorKind::Fixed,
        }
    }

    pub fn validate(self) -> ChartResult<Self> {
        match self {
            Self::Auto(mut options) => {
                validate_values_offset(options.min_values_offset)?;
                options.number_format = options.number_format.validate()?;
                Ok(Self::Auto(options))
            }
            Self::Interval(mut options) => {
                if !options.interval.is_finite() || options.interval <= 0.0 {
                    return Err(ChartError::InvalidConfig(
                        "interval must be finite and > 0".to_owned(),
                    ));
                }
                if options.interval < INTERVAL_EPSILON {
                    return Err(ChartError::InvalidConfig("interval is too small".to_owned()));
                }
                validate_values_offset(options.min_values_offset)?;
                options.number_format = options.number_format.validate()?;
                Ok(Self::Interval(options))
            }
            Self::Fixed(mut options) => {
                options.number_format = options.number_format.validate()?;
                Ok(Self::Fixed(options))
            }
        }
    }

    #[must_use]
    pub fn number_format(&self) -> &NumberFormat {
        match self {
            Self::Auto(options) => &options.number_format,
            Self::Interval(options) => &options.number_format,
            Self::Fixed(options) => &options.number_format,
        }
    }

    fn minor_ticks_count(&self) -> u32 {
        match self {
            Self::Auto(options) => options.minor_ticks_count,
            Self::Interval(options) => options.minor_ticks_count,
            Self::Fixed(options) => options.minor_ticks_count,
        }
    }
}

/// Places value labels along a panel's vertical axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCalibrator {
    options: ValueCalibratorOptions,
    major_ticks: Vec<MajorValueTick>,
    minor_ticks: Vec<MinorTick>,
}

impl Default for ValueCalibrator {
    fn default() -> Self {
        Self::with_kind(ValueCalibratorKind::Auto)
    }
}

impl ValueCalibrator {
    pub fn new(options: ValueCalibratorOptions) -> ChartResult<Self> {
        Ok(Self {
            options: options.validate()?,
            major_ticks: Vec::new(),
            minor_ticks: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_kind(kind: ValueCalibratorKind) -> Self {
        let options = match kind {
            ValueCalibratorKind::Auto => ValueCalibratorOptions::Auto(AutoValueCalibratorOptions::default()),
            ValueCalibratorKind::Interval => {
                ValueCalibratorOptions::Interval(IntervalValueCalibratorOptions::default())
            }
            ValueCalibratorKind::Fixed => {
                ValueCalibratorOptions::Fixed(FixedValueCalibratorOptions::default())
            }
        };
        Self {
            options,
            major_ticks: Vec::new(),
            minor_ticks: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ValueCalibratorKind {
        self.options.kind()
    }

    #[must_use]
    pub fn options(&self) -> &ValueCalibratorOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ValueCalibratorOptions) -> ChartResult<()> {
        self.options = options.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn major_ticks(&self) -> &[MajorValueTick] {
        &self.major_ticks
    }

    #[must_use]
    pub fn minor_ticks(&self) -> &[MinorTick] {
        &self.minor_ticks
    }

    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        self.options.number_format().format(value)
    }

    /// Recomputes every tick. `None` (no viewport yet) leaves no ticks.
    pub fn calibrate(&mut self, input: Option<&ValueCalibrationInput>) {
        self.major_ticks.clear();
        self.minor_ticks.clear();
        let Some(input) = input else {
            return;
        };

        match &self.options {
            ValueCalibratorOptions::Auto(options) => {
                value::calibrate_auto(options, input, &mut self.major_ticks);
            }
            ValueCalibratorOptions::Interval(options) => {
                value::calibrate_interval(options, input, &mut self.major_ticks);
            }
            ValueCalibratorOptions::Fixed(options) => {
                value::calibrate_fixed(options, input, &mut self.major_ticks);
            }
        }

        let positions: Vec<f64> = self.major_ticks.iter().map(|tick| tick.y).collect();
        self.minor_ticks = minor_ticks_between(&positions, self.options.minor_ticks_count());
    }
}

impl Stateful for ValueCalibrator {
    fn class_name(&self) -> &str {
        self.kind().class_name()
    }

    fn save_state(&self) -> ChartResult<Value> {
        let options = match &self.options {
            ValueCalibratorOptions::Auto(options) => to_state_value(options)?,
            ValueCalibratorOptions::Interval(options) => to_state_value(options)?,
            ValueCalibratorOptions::Fixed(options) => to_state_value(options)?,
        };
        Ok(json!({ CLASS_NAME_KEY: self.class_name(), OPTIONS_KEY: options }))
    }

    fn load_state(&mut self, state: &Value) -> ChartResult<()> {
        let kind = match class_name_of(state) {
            Ok(name) => ValueCalibratorKind::ALL
                .into_iter()
                .find(|kind| kind.class_name() == name)
                .ok_or_else(|| ChartError::NotRegistered(name.to_string()))?,
            Err(ChartError::MissingClassName) => self.kind(),
            Err(e) => return Err(e),
        };
        let options = match kind {
            ValueCalibratorKind::Auto => ValueCalibratorOptions::Auto(options_or_default(state)?),
            ValueCalibratorKind::Interval => {
                ValueCalibratorOptions::Interval(options_or_default(state)?)
            }
            ValueCalibratorKind::Fixed => ValueCalibratorOptions::Fixed(options_or_default(state)?),
        };
        self.set_options(options)
    }
}
