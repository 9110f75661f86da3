use tracing::{trace, warn};

use crate::calibration::{DateCalibrationInput, ValueCalibrationInput};
use crate::core::{DateProjection, Padding, Rect, ValueProjection, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::Chart;

impl<R: Renderer> Chart<R> {
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.config.viewport = viewport;
        self.config = self.config.clone().validate()?;
        self.env
            .set_viewport_extent(f64::from(viewport.width), f64::from(viewport.height));
        self.layout()
    }

    /// Area shared by every panel's plots, left of the value axis and above
    /// the date axis.
    #[must_use]
    pub fn plot_frame(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.config.viewport.width) - self.config.value_axis_width,
            f64::from(self.config.viewport.height) - self.config.date_axis_height,
        )
    }

    #[must_use]
    pub fn date_axis_frame(&self) -> Rect {
        let plot = self.plot_frame();
        Rect::new(plot.left, plot.bottom(), plot.width, self.config.date_axis_height)
    }

    /// Index of the panel whose frame contains `y`.
    #[must_use]
    pub fn panel_index_at(&self, y: f64) -> Option<usize> {
        self.panels
            .iter()
            .position(|panel| y >= panel.frame().top && y < panel.frame().bottom())
    }

    /// Recomputes frames, pending auto-scales and every tick.
    pub fn layout(&mut self) -> ChartResult<()> {
        let plot = self.plot_frame();
        let total_ratio: f64 = self.panels.iter().map(|panel| panel.height_ratio()).sum();
        let mut top = plot.top;
        for panel in &mut self.panels {
            let height = plot.height * panel.height_ratio() / total_ratio;
            panel.set_frames(
                Rect::new(plot.left, top, f64::from(self.config.viewport.width), height),
                Rect::new(plot.left, top, plot.width, height),
            );
            top += height;
        }
        self.date_scale.set_frame(plot);

        if self.date_scale.needs_auto_scale() {
            self.date_scale.auto_scale(self.record_count());
            self.needs_value_auto_scale = true;
        }
        if self.needs_value_auto_scale {
            self.auto_scale_values()?;
        }
        self.calibrate();
        Ok(())
    }

    /// Visible records clamped to the plotted data, as `(start, count)`.
    #[must_use]
    pub fn visible_data_window(&self) -> Option<(usize, usize)> {
        let record_count = self.record_count();
        let range = self.date_scale.visible_range()?;
        if record_count == 0 {
            return None;
        }
        let first = range.first.floor().max(0.0) as usize;
        let last = (range.last.ceil().max(0.0) as usize).min(record_count - 1);
        (first <= last).then_some((first, last - first + 1))
    }

    /// Fits every panel's value scale to its visible values.
    pub fn auto_scale_values(&mut self) -> ChartResult<()> {
        self.needs_value_auto_scale = false;
        let Some((start, count)) = self.visible_data_window() else {
            return Ok(());
        };
        let plotted = self.converter.series(&self.bars);
        for panel in &mut self.panels {
            panel.auto_scale(plotted, &self.series, start, count)?;
        }
        Ok(())
    }

    fn calibrate(&mut self) {
        let plotted = self.converter.series(&self.bars);
        let metrics = self.config.text_metrics;
        let date_projection =
            DateProjection::new(&self.date_scale, plotted.dates(), self.config.time_frame.to_time_interval());
        let text_bounds = Rect::new(
            0.0,
            self.date_scale.frame().bottom(),
            self.date_scale.frame().width,
            self.config.date_axis_height,
        );
        let date_input = date_projection.map(|projection| DateCalibrationInput {
            projection,
            panel_padding: Padding::default(),
            text_bounds,
            max_x: self.date_scale.frame().right(),
            max_allowed_record: self.date_scale.max_allowed_record(plotted.len()),
            metrics,
        });
        self.date_calibrator.calibrate(date_input.as_ref());

        let has_range = date_input.is_some();
        for panel in &mut self.panels {
            let input = has_range.then(|| ValueCalibrationInput {
                projection: ValueProjection::new(panel.value_scale()),
                panel_frame: panel.content_frame(),
                padding: panel.value_scale().padding(),
                panel_padding: Padding::default(),
                metrics,
            });
            panel.value_calibrator_mut().calibrate(input.as_ref());
        }
        trace!(
            date_ticks = self.date_calibrator.major_ticks().len(),
            "chart calibrated"
        );
    }

    /// Marks the viewport dirty after input moved it.
    pub(super) fn on_viewport_changed(&mut self) {
        self.needs_value_auto_scale = true;
        if let Err(e) = self.layout() {
            warn!(error = %e, "layout after viewport change failed");
        }
    }
}
