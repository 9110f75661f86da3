use serde::{Deserialize, Serialize};

use crate::core::primitives::non_degenerate_span;
use crate::core::types::{Padding, Rect};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleKind {
    Linear,
    /// Sign-preserving `ln(|v| + 1)` mapping.
    Logarithmic,
}

/// Vertical viewport of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueScale {
    min_visible: f64,
    max_visible: f64,
    kind: ScaleKind,
    /// Extra room above/below the data range, as a fraction of the span.
    auto_scale_margin_ratio: f64,
    padding: Padding,
    #[serde(skip)]
    frame: Rect,
}

impl Default for ValueScale {
    fn default() -> Self {
        Self {
            min_visible: 0.0,
            max_visible: 1.0,
            kind: ScaleKind::Linear,
            auto_scale_margin_ratio: 0.05,
            padding: Padding::new(0.0, 10.0, 0.0, 10.0),
            frame: Rect::default(),
        }
    }
}

impl ValueScale {
    pub fn new(min_visible: f64, max_visible: f64) -> ChartResult<Self> {
        let mut scale = Self::default();
        scale.set_visible_range(min_visible, max_visible)?;
        Ok(scale)
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ScaleKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ScaleKind) {
        self.kind = kind;
    }

    #[must_use]
    pub fn min_visible(&self) -> f64 {
        self.min_visible
    }

    #[must_use]
    pub fn max_visible(&self) -> f64 {
        self.max_visible
    }

    /// `min == max` is accepted; projection widens it to a minimum span.
    pub fn set_visible_range(&mut self, min_visible: f64, max_visible: f64) -> ChartResult<()> {
        if !min_visible.is_finite() || !max_visible.is_finite() || min_visible > max_visible {
            return Err(ChartError::InvalidData(
                "value range must be finite with min <= max".to_owned(),
            ));
        }
        self.min_visible = min_visible;
        self.max_visible = max_visible;
        Ok(())
    }

    /// Fits the visible range to `(min, max)` plus the configured margin.
    pub fn auto_scale(&mut self, min: f64, max: f64) -> ChartResult<()> {
        let margin = non_degenerate_span(min, max) * self.auto_scale_margin_ratio;
        self.set_visible_range(min - margin, max + margin)
    }

    pub fn set_auto_scale_margin_ratio(&mut self, ratio: f64) -> ChartResult<()> {
        if !ratio.is_finite() || !(0.0..0.5).contains(&ratio) {
            return Err(ChartError::InvalidConfig(
                "auto scale margin ratio must be in [0, 0.5)".to_owned(),
            ));
        }
        self.auto_scale_margin_ratio = ratio;
        Ok(())
    }

    #[must_use]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
    }

    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Projection frame: the panel frame shrunk by the vertical padding.
    pub fn set_frame(&mut self, panel_frame: Rect) {
        self.frame = panel_frame.apply_padding(Padding::new(0.0, self.padding.top, 0.0, self.padding.bottom));
    }
}
