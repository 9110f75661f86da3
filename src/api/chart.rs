use tracing::debug;

use crate::animation::{AnimationConfig, AnimationController, AnimationId};
use crate::calibration::DateCalibrator;
use crate::core::{
    BarSeries, DateProjection, DateScale, Point, Projection, SeriesSet, TimeFrame, ValueProjection,
};
use crate::datafeed::RequestTracker;
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    ClickGesture, ContextMenuGesture, DoubleClickGesture, EventRouter, GestureArray, GestureConfig,
    InputEnvironment, MouseWheelGesture, PanGesture,
};
use crate::price_style::{PriceStyle, PriceStyleConverter};
use crate::render::Renderer;

use super::config::ChartConfig;
use super::objects::ObjectId;
use super::panel::ChartPanel;

/// Notification queued for the host by input handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartEvent {
    /// A panel object became the selection.
    ObjectSelected(ObjectId),
    SelectionCleared,
    DoubleClicked(Point),
    ContextMenu(Point),
    /// The visible records changed through input or an animation.
    ViewportChanged,
}

/// Pan velocity sampled from the last drag step.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct PanTracker {
    pub(super) last_ms: Option<i64>,
    pub(super) velocity: f64,
}

/// Host-facing chart: bars, scales, panels, input and rendering.
pub struct Chart<R: Renderer> {
    pub(super) renderer: R,
    pub(super) config: ChartConfig,
    pub(super) bars: BarSeries,
    pub(super) series: SeriesSet,
    pub(super) date_scale: DateScale,
    pub(super) date_calibrator: DateCalibrator,
    pub(super) panels: Vec<ChartPanel>,
    pub(super) converter: PriceStyleConverter,
    pub(super) env: InputEnvironment,
    pub(super) gestures: GestureArray,
    pub(super) router: EventRouter,
    pub(super) animations: AnimationController<DateScale>,
    pub(super) kinetic_pan: Option<AnimationId>,
    pub(super) pan: PanTracker,
    pub(super) requests: RequestTracker,
    pub(super) events: Vec<ChartEvent>,
    pub(super) selected: Option<ObjectId>,
    pub(super) next_object_id: u64,
    pub(super) needs_value_auto_scale: bool,
}

pub(super) const SOURCE_PREFIX: &str = "";

impl<R: Renderer> Chart<R> {
    /// Creates a chart with one price panel and no bars.
    pub fn new(renderer: R, config: ChartConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        let mut env = InputEnvironment::new(config.mobile);
        env.set_viewport_extent(
            f64::from(config.viewport.width),
            f64::from(config.viewport.height),
        );

        let gestures = GestureArray::new()
            .with(Box::new(PanGesture::new(GestureConfig::default())))
            .with(Box::new(MouseWheelGesture::new(GestureConfig::default())))
            .with(Box::new(ClickGesture::new(GestureConfig::default())))
            .with(Box::new(DoubleClickGesture::new(GestureConfig::default())))
            .with(Box::new(ContextMenuGesture::new(GestureConfig::default())));

        let mut chart = Self {
            renderer,
            date_scale: DateScale::new(config.date_scale)?,
            date_calibrator: DateCalibrator::default(),
            bars: BarSeries::new(SOURCE_PREFIX),
            series: SeriesSet::new(),
            panels: vec![ChartPanel::price_panel(1.0)?],
            converter: PriceStyleConverter::new(PriceStyle::default()).with_tick_size(config.tick_size),
            env,
            gestures,
            router: EventRouter::new(),
            animations: AnimationController::new(AnimationConfig::for_environment(config.mobile))?,
            kinetic_pan: None,
            pan: PanTracker::default(),
            requests: RequestTracker::new(),
            events: Vec::new(),
            selected: None,
            next_object_id: 1,
            needs_value_auto_scale: true,
            config,
        };
        chart.layout()?;
        debug!(chart_id = %chart.config.chart_id, "chart created");
        Ok(chart)
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn chart_id(&self) -> &str {
        &self.config.chart_id
    }

    #[must_use]
    pub fn time_frame(&self) -> TimeFrame {
        self.config.time_frame
    }

    pub fn set_time_frame(&mut self, time_frame: TimeFrame) -> ChartResult<()> {
        self.config.time_frame = TimeFrame::new(time_frame.periodicity, time_frame.interval)?;
        Ok(())
    }

    /// Bar duration in milliseconds.
    #[must_use]
    pub fn time_interval(&self) -> f64 {
        self.config.time_frame.to_time_interval()
    }

    #[must_use]
    pub fn date_scale(&self) -> &DateScale {
        &self.date_scale
    }

    pub fn date_scale_mut(&mut self) -> &mut DateScale {
        self.needs_value_auto_scale = true;
        &mut self.date_scale
    }

    #[must_use]
    pub fn date_calibrator(&self) -> &DateCalibrator {
        &self.date_calibrator
    }

    pub fn set_date_calibrator(&mut self, calibrator: DateCalibrator) {
        self.date_calibrator = calibrator;
    }

    #[must_use]
    pub fn input_environment(&self) -> &InputEnvironment {
        &self.env
    }

    #[must_use]
    pub fn panels(&self) -> &[ChartPanel] {
        &self.panels
    }

    pub fn panel(&self, index: usize) -> ChartResult<&ChartPanel> {
        self.panels
            .get(index)
            .ok_or_else(|| ChartError::NotFound(format!("panel {index}")))
    }

    pub fn panel_mut(&mut self, index: usize) -> ChartResult<&mut ChartPanel> {
        self.panels
            .get_mut(index)
            .ok_or_else(|| ChartError::NotFound(format!("panel {index}")))
    }

    /// Appends a panel below the existing ones and returns its index.
    pub fn add_panel(&mut self, panel: ChartPanel) -> ChartResult<usize> {
        self.panels.push(panel);
        self.needs_value_auto_scale = true;
        self.layout()?;
        Ok(self.panels.len() - 1)
    }

    /// Removes a panel with its objects; the price panel cannot be removed.
    pub fn remove_panel(&mut self, index: usize) -> ChartResult<ChartPanel> {
        if index == 0 {
            return Err(ChartError::InvalidConfig(
                "the price panel cannot be removed".to_owned(),
            ));
        }
        if index >= self.panels.len() {
            return Err(ChartError::NotFound(format!("panel {index}")));
        }
        let panel = self.panels.remove(index);
        if self
            .selected
            .is_some_and(|id| panel.object(id).is_some())
        {
            self.selected = None;
        }
        self.layout()?;
        Ok(panel)
    }

    #[must_use]
    pub fn price_style(&self) -> &PriceStyle {
        self.converter.style()
    }

    pub fn set_price_style(&mut self, style: PriceStyle) -> ChartResult<()> {
        self.converter.set_style(style.validate()?);
        self.converter.recompute(&self.bars);
        self.date_scale.set_needs_auto_scale();
        self.needs_value_auto_scale = true;
        Ok(())
    }

    /// Series the price panel plots: the source bars or the derived series of
    /// the price style.
    #[must_use]
    pub fn plotted_bars(&self) -> &BarSeries {
        self.converter.series(&self.bars)
    }

    /// Record count the date scale navigates.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.plotted_bars().len()
    }

    /// Projection of panel `index`; `None` before the date scale has a
    /// visible range.
    #[must_use]
    pub fn projection(&self, index: usize) -> Option<Projection<'_>> {
        let panel = self.panels.get(index)?;
        let x = DateProjection::new(
            &self.date_scale,
            self.plotted_bars().dates(),
            self.time_interval(),
        )?;
        Some(Projection::new(x, ValueProjection::new(panel.value_scale())))
    }

    /// Drains the notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<ChartEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
