use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::primitives::MIN_VALUE_SPAN;
use crate::core::types::{Padding, Rect};
use crate::error::{ChartError, ChartResult};

const MIN_SCROLL_PIXELS: f64 = 3.0;
const MIN_ZOOM_PIXELS: f64 = 3.0;

/// Which edge stays in place while zooming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomMode {
    PinCenter,
    PinLeft,
    PinRight,
    /// Keeps the record under the pointer in place.
    PinMouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateScaleConfig {
    /// Zooming in never shows fewer records than this.
    pub min_visible_records: f64,
    /// When `false`, visible records snap to whole records.
    pub allow_partial_records: bool,
    /// Blank space after the last record, as a fraction of the frame width.
    pub right_additional_space_ratio: f64,
    pub zoom_mode: ZoomMode,
    pub text_padding: Padding,
    pub major_tick_mark_length: f64,
    pub minor_tick_mark_length: f64,
}

impl Default for DateScaleConfig {
    fn default() -> Self {
        Self {
            min_visible_records: 5.0,
            allow_partial_records: true,
            right_additional_space_ratio: 0.5,
            zoom_mode: ZoomMode::PinCenter,
            text_padding: Padding::new(3.0, 0.0, 3.0, 3.0),
            major_tick_mark_length: 5.0,
            minor_tick_mark_length: 3.0,
        }
    }
}

impl DateScaleConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.min_visible_records.is_finite() || self.min_visible_records < 1.0 {
            return Err(ChartError::InvalidConfig(
                "min visible records must be finite and >= 1".to_owned(),
            ));
        }
        if !self.right_additional_space_ratio.is_finite()
            || !(0.0..1.0).contains(&self.right_additional_space_ratio)
        {
            return Err(ChartError::InvalidConfig(
                "right additional space ratio must be in [0, 1)".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Fractional record window `[first, last]` shown by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub first: f64,
    pub last: f64,
}

impl VisibleRange {
    #[must_use]
    pub fn columns(self) -> f64 {
        self.last - self.first + 1.0
    }
}

/// Horizontal viewport: which records are visible and how wide a column is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateScale {
    config: DateScaleConfig,
    range: Option<VisibleRange>,
    #[serde(skip)]
    frame: Rect,
    #[serde(skip)]
    more_history_requested: bool,
    #[serde(skip)]
    pending_history_request: bool,
}

impl Default for DateScale {
    fn default() -> Self {
        Self {
            config: DateScaleConfig::default(),
            range: None,
            frame: Rect::default(),
            more_history_requested: false,
            pending_history_request: false,
        }
    }
}

impl DateScale {
    pub fn new(config: DateScaleConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn config(&self) -> DateScaleConfig {
        self.config
    }

    pub fn set_config(&mut self, config: DateScaleConfig) -> ChartResult<()> {
        self.config = config.validate()?;
        if let Some(range) = self.range {
            self.range = Some(self.snap(range));
        }
        Ok(())
    }

    /// Projection frame: the plotting area shared by every panel.
    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    /// `None` until the scale is auto-scaled or given an explicit range.
    #[must_use]
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.range
    }

    #[must_use]
    pub fn first_visible_record(&self) -> Option<f64> {
        self.range.map(|range| range.first)
    }

    #[must_use]
    pub fn last_visible_record(&self) -> Option<f64> {
        self.range.map(|range| range.last)
    }

    /// Integral index of the first visible record.
    #[must_use]
    pub fn first_visible_index(&self) -> Option<i64> {
        self.range.map(|range| range.first.floor() as i64)
    }

    #[must_use]
    pub fn last_visible_index(&self) -> Option<i64> {
        self.range.map(|range| range.last.ceil() as i64)
    }

    pub fn set_visible_records(&mut self, first: f64, last: f64) -> ChartResult<()> {
        if !first.is_finite() || !last.is_finite() || first > last {
            return Err(ChartError::InvalidData(
                "visible records must be finite with first <= last".to_owned(),
            ));
        }
        self.range = Some(self.snap(VisibleRange { first, last }));
        trace!(first, last, "visible records set");
        Ok(())
    }

    pub fn set_needs_auto_scale(&mut self) {
        self.range = None;
    }

    #[must_use]
    pub fn needs_auto_scale(&self) -> bool {
        self.range.is_none()
    }

    /// Shows every record; clears the range when there is none.
    pub fn auto_scale(&mut self, record_count: usize) {
        self.range = (record_count > 0).then(|| VisibleRange {
            first: 0.0,
            last: (record_count - 1) as f64,
        });
    }

    #[must_use]
    pub fn columns_count(&self) -> f64 {
        self.range.map_or(0.0, VisibleRange::columns)
    }

    /// Frame width divided by visible columns, never zero.
    #[must_use]
    pub fn column_width(&self) -> f64 {
        let columns = self.columns_count().max(MIN_VALUE_SPAN);
        (self.frame.width / columns).max(MIN_VALUE_SPAN)
    }

    /// Last record index the view may reach, including the blank right margin.
    #[must_use]
    pub fn max_allowed_record(&self, record_count: usize) -> f64 {
        let additional_columns =
            self.frame.width * self.config.right_additional_space_ratio / self.column_width();
        record_count as f64 - 1.0 + additional_columns
    }

    #[must_use]
    pub fn can_set_visible_record(&self, record: f64, record_count: usize) -> bool {
        record >= 0.0 && record <= self.max_allowed_record(record_count)
    }

    /// Positive pixels move the content right, revealing older records.
    pub fn scroll_on_pixels(&mut self, pixels: f64, record_count: usize) -> ChartResult<bool> {
        if !pixels.is_finite() {
            return Err(ChartError::InvalidData("finite number expected".to_owned()));
        }
        if pixels.abs() < MIN_SCROLL_PIXELS {
            return Ok(false);
        }
        let mut records = pixels.abs() / self.column_width();
        if !self.config.allow_partial_records {
            records = records.ceil();
        }
        Ok(self.scroll_on_records(
            if pixels >= 0.0 { records } else { -records },
            record_count,
        ))
    }

    pub fn scroll_on_records(&mut self, records: f64, record_count: usize) -> bool {
        let Some(old) = self.range else {
            return false;
        };
        if records == 0.0 {
            return false;
        }

        let mut first = old.first - records;
        let mut last = old.last - records;
        if !self.config.allow_partial_records {
            first = first.round();
            last = last.round();
        }

        if !self.can_set_visible_record(first, record_count)
            || !self.can_set_visible_record(last, record_count)
        {
            if first >= 0.0 {
                return false;
            }
            first = 0.0;
            last = old.last - old.first;
            if !self.can_set_visible_record(first, record_count)
                || !self.can_set_visible_record(last, record_count)
            {
                return false;
            }
        }

        self.range = Some(VisibleRange { first, last });
        self.update_history_latch();
        true
    }

    /// Positive pixels zoom in (fewer records), negative zoom out.
    pub fn zoom_on_pixels(
        &mut self,
        left_pixels: f64,
        right_pixels: f64,
        record_count: usize,
    ) -> ChartResult<bool> {
        if !left_pixels.is_finite() || !right_pixels.is_finite() {
            return Err(ChartError::InvalidData(
                "pixels must be a finite number".to_owned(),
            ));
        }
        if left_pixels.abs() < MIN_ZOOM_PIXELS && right_pixels.abs() < MIN_ZOOM_PIXELS {
            return Ok(false);
        }

        let column_width = self.column_width();
        let mut left_records = left_pixels.abs() / column_width;
        let mut right_records = right_pixels.abs() / column_width;
        if !self.config.allow_partial_records {
            left_records = left_records.ceil();
            right_records = right_records.ceil();
        }

        Ok(self.zoom_on_records(
            if left_pixels > 0.0 { left_records } else { -left_records },
            if right_pixels > 0.0 { right_records } else { -right_records },
            record_count,
        ))
    }

    pub fn zoom_on_records(&mut self, left_records: f64, right_records: f64, record_count: usize) -> bool {
        let Some(old) = self.range else {
            return false;
        };
        if left_records == 0.0 && right_records == 0.0 {
            return false;
        }

        let mut first = old.first + left_records;
        let mut last = old.last - right_records;
        if !self.config.allow_partial_records {
            first = first.round();
            last = last.round();
        }
        if first > last {
            let pinned = last.max(old.last);
            first = pinned;
            last = pinned;
        }
        if !self.can_set_visible_record(first, record_count) {
            self.range = Some(VisibleRange {
                first: 0.0,
                last: old.last,
            });
            self.update_history_latch();
            return false;
        }
        if !self.can_set_visible_record(last, record_count) {
            last = self.max_allowed_record(record_count);
        }

        let changed = first != old.first || last != old.last;
        if changed {
            let new_columns = last - first + 1.0;
            if new_columns < self.config.min_visible_records {
                return false;
            }
            if first >= record_count as f64 {
                return false;
            }
            self.range = Some(VisibleRange { first, last });
            self.update_history_latch();
        }
        changed
    }

    /// Zooms by `pixels` split according to the configured zoom mode.
    ///
    /// `anchor_x` is only used by [`ZoomMode::PinMouse`].
    pub fn zoom_at(&mut self, pixels: f64, anchor_x: f64, record_count: usize) -> ChartResult<bool> {
        match self.config.zoom_mode {
            ZoomMode::PinCenter => self.zoom_on_pixels(pixels, pixels, record_count),
            ZoomMode::PinLeft => self.zoom_on_pixels(0.0, pixels, record_count),
            ZoomMode::PinRight => self.zoom_on_pixels(pixels, 0.0, record_count),
            ZoomMode::PinMouse => {
                let width = self.frame.width.max(MIN_VALUE_SPAN);
                let multiplier = ((anchor_x - self.frame.left) / width).clamp(0.0, 1.0);
                self.zoom_on_pixels(pixels * multiplier, pixels * (1.0 - multiplier), record_count)
            }
        }
    }

    /// Returns `true` once after the view reached the oldest loaded record.
    pub fn take_history_request(&mut self) -> bool {
        std::mem::take(&mut self.pending_history_request)
    }

    /// Re-arms the history latch once a requested page arrived.
    pub fn on_more_history_request_completed(&mut self) {
        self.more_history_requested = false;
    }

    /// Shifts the visible range right by `records` after older records were
    /// inserted, keeping the same bars on screen.
    pub fn shift_records(&mut self, records: f64) {
        if let Some(range) = self.range {
            self.range = Some(VisibleRange {
                first: range.first + records,
                last: range.last + records,
            });
        }
    }

    /// Shows the last `count` records.
    pub fn show_last_records(&mut self, count: usize, record_count: usize) {
        if record_count == 0 || count == 0 {
            return;
        }
        let last = (record_count - 1) as f64;
        let first = (last - (count.min(record_count) - 1) as f64).max(0.0);
        self.range = Some(self.snap(VisibleRange { first, last }));
    }

    fn update_history_latch(&mut self) {
        let first_index = self.first_visible_index().unwrap_or(0);
        if first_index > 0 {
            self.more_history_requested = false;
        } else if !self.more_history_requested {
            self.more_history_requested = true;
            self.pending_history_request = true;
        }
    }

    fn snap(&self, range: VisibleRange) -> VisibleRange {
        if self.config.allow_partial_records {
            range
        } else {
            VisibleRange {
                first: range.first.trunc(),
                last: range.last.trunc(),
            }
        }
    }
}
