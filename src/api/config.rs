use serde::{Deserialize, Serialize};

use crate::animation::KineticPanConfig;
use crate::calibration::TextMetrics;
use crate::core::{DateScaleConfig, TimeFrame, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Palette used by the frame builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartColors {
    pub background: Color,
    pub grid: Color,
    pub axis_text: Color,
    pub up_bar: Color,
    pub down_bar: Color,
    pub line: Color,
    pub value_line: Color,
    pub highlighted_column: Color,
    pub ask_line: Color,
    pub bid_line: Color,
    pub marker: Color,
    pub selection: Color,
    pub band_fill: Color,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            grid: Color::rgb(0.9, 0.9, 0.9),
            axis_text: Color::rgb(0.25, 0.25, 0.25),
            up_bar: Color::rgb(0.15, 0.65, 0.6),
            down_bar: Color::rgb(0.94, 0.33, 0.31),
            line: Color::rgb(0.13, 0.59, 0.95),
            value_line: Color::rgb(0.5, 0.5, 0.5),
            highlighted_column: Color::rgba(1.0, 0.85, 0.0, 0.25),
            ask_line: Color::rgb(0.94, 0.33, 0.31),
            bid_line: Color::rgb(0.15, 0.65, 0.6),
            marker: Color::rgb(0.4, 0.2, 0.8),
            selection: Color::rgb(0.0, 0.47, 1.0),
            band_fill: Color::rgba(0.13, 0.59, 0.95, 0.15),
        }
    }
}

impl ChartColors {
    pub fn validate(self) -> ChartResult<Self> {
        for color in [
            self.background,
            self.grid,
            self.axis_text,
            self.up_bar,
            self.down_bar,
            self.line,
            self.value_line,
            self.highlighted_column,
            self.ask_line,
            self.bid_line,
            self.marker,
            self.selection,
            self.band_fill,
        ] {
            color.validate()?;
        }
        Ok(self)
    }
}

/// Chart bootstrap configuration.
///
/// Serializable so hosts can persist the setup next to the chart state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Identifies the chart in datafeed requests and store keys.
    pub chart_id: String,
    pub viewport: Viewport,
    #[serde(default)]
    pub mobile: bool,
    #[serde(default)]
    pub time_frame: TimeFrame,
    #[serde(default)]
    pub date_scale: DateScaleConfig,
    #[serde(default = "default_true")]
    pub scroll_enabled: bool,
    #[serde(default = "default_true")]
    pub zoom_enabled: bool,
    #[serde(default = "default_true")]
    pub kinetic_pan_enabled: bool,
    #[serde(default)]
    pub kinetic_pan: KineticPanConfig,
    #[serde(default)]
    pub text_metrics: TextMetrics,
    #[serde(default = "default_value_axis_width")]
    pub value_axis_width: f64,
    #[serde(default = "default_date_axis_height")]
    pub date_axis_height: f64,
    /// Instrument tick size, used by point-based box sizes.
    #[serde(default)]
    pub tick_size: Option<f64>,
    /// Records asked for by each datafeed request.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
    #[serde(default)]
    pub colors: ChartColors,
}

fn default_true() -> bool {
    true
}

fn default_value_axis_width() -> f64 {
    64.0
}

fn default_date_axis_height() -> f64 {
    24.0
}

fn default_history_page_size() -> usize {
    500
}

impl ChartConfig {
    #[must_use]
    pub fn new(chart_id: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            chart_id: chart_id.into(),
            viewport,
            mobile: false,
            time_frame: TimeFrame::default(),
            date_scale: DateScaleConfig::default(),
            scroll_enabled: true,
            zoom_enabled: true,
            kinetic_pan_enabled: true,
            kinetic_pan: KineticPanConfig::default(),
            text_metrics: TextMetrics::default(),
            value_axis_width: default_value_axis_width(),
            date_axis_height: default_date_axis_height(),
            tick_size: None,
            history_page_size: default_history_page_size(),
            colors: ChartColors::default(),
        }
    }

    #[must_use]
    pub fn with_time_frame(mut self, time_frame: TimeFrame) -> Self {
        self.time_frame = time_frame;
        self
    }

    #[must_use]
    pub fn with_mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    #[must_use]
    pub fn with_date_scale(mut self, date_scale: DateScaleConfig) -> Self {
        self.date_scale = date_scale;
        self
    }

    #[must_use]
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = Some(tick_size);
        self
    }

    #[must_use]
    pub fn with_history_page_size(mut self, history_page_size: usize) -> Self {
        self.history_page_size = history_page_size;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if self.chart_id.is_empty() {
            return Err(ChartError::InvalidConfig(
                "chart id must not be empty".to_owned(),
            ));
        }
        for (name, value) in [
            ("value axis width", self.value_axis_width),
            ("date axis height", self.date_axis_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.value_axis_width >= f64::from(self.viewport.width)
            || self.date_axis_height >= f64::from(self.viewport.height)
        {
            return Err(ChartError::InvalidConfig(
                "axes leave no room for the plot area".to_owned(),
            ));
        }
        if let Some(tick_size) = self.tick_size {
            if !tick_size.is_finite() || tick_size <= 0.0 {
                return Err(ChartError::InvalidConfig(
                    "tick size must be finite and > 0".to_owned(),
                ));
            }
        }
        if self.history_page_size == 0 {
            return Err(ChartError::InvalidConfig(
                "history page size must be > 0".to_owned(),
            ));
        }
        TimeFrame::new(self.time_frame.periodicity, self.time_frame.interval)?;
        self.date_scale.validate()?;
        self.kinetic_pan.validate()?;
        self.text_metrics.validate()?;
        self.colors.validate()?;
        Ok(self)
    }
}
