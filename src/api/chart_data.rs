use tracing::{debug, info, warn};

use crate::core::{Bar, BarSeries, DataSeries, SeriesSet};
use crate::datafeed::{BarsRequest, BarsResponse, Datafeed, RequestKind};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::chart::SOURCE_PREFIX;
use super::objects::{ChartPanelObject, ObjectId};
use super::Chart;

impl<R: Renderer> Chart<R> {
    /// Source bars as loaded, before any price style conversion.
    #[must_use]
    pub fn bars(&self) -> &BarSeries {
        &self.bars
    }

    /// Auxiliary series aligned with the source bars.
    #[must_use]
    pub fn series(&self) -> &SeriesSet {
        &self.series
    }

    /// Replaces every bar and shows them all. Auxiliary series are dropped.
    pub fn set_bars(&mut self, bars: &[Bar]) -> ChartResult<()> {
        self.bars = BarSeries::from_bars(SOURCE_PREFIX, bars)?;
        self.series = SeriesSet::new();
        self.requests.clear();
        self.on_bars_replaced()
    }

    /// Appends a live bar; auxiliary series get a trailing gap.
    pub fn append_bar(&mut self, bar: Bar) -> ChartResult<()> {
        self.bars.push(bar)?;
        self.series.push_nulls();
        self.on_bars_changed()
    }

    /// Replaces the live bar in place.
    pub fn update_last_bar(&mut self, bar: Bar) -> ChartResult<()> {
        self.bars.update_last(bar)?;
        self.on_bars_changed()
    }

    /// Keeps only the newest `max_len` records; returns how many were dropped.
    pub fn trim_bars(&mut self, max_len: usize) -> ChartResult<usize> {
        let before = self.record_count();
        let removed = self.bars.trim(max_len);
        if removed > 0 {
            self.series.trim(max_len);
            self.converter.recompute(&self.bars);
            let dropped = before.saturating_sub(self.record_count());
            self.date_scale.shift_records(-(dropped as f64));
            self.on_bars_changed()?;
        }
        Ok(removed)
    }

    /// Adds an auxiliary series; it must hold one value per source bar.
    pub fn add_series(&mut self, series: DataSeries<f64>) -> ChartResult<()> {
        self.series.add(series, self.bars.len())?;
        self.needs_value_auto_scale = true;
        Ok(())
    }

    /// Removes a series and unplots it from every panel.
    pub fn remove_series(&mut self, name: &str) -> bool {
        if !self.series.remove(name) {
            return false;
        }
        for panel in &mut self.panels {
            panel.remove_plot(name);
        }
        self.needs_value_auto_scale = true;
        true
    }

    /// Attaches `object` to panel `panel_index` and returns its new id.
    pub fn add_object(
        &mut self,
        panel_index: usize,
        object: ChartPanelObject,
    ) -> ChartResult<ObjectId> {
        let id = ObjectId(self.next_object_id);
        let panel = self.panel_mut(panel_index)?;
        panel.insert_object(id, object);
        self.next_object_id += 1;
        debug!(%id, panel_index, "panel object added");
        Ok(id)
    }

    /// Detaches the object from its panel and hands it back.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<ChartPanelObject> {
        let object = self
            .panels
            .iter_mut()
            .find_map(|panel| panel.take_object(id))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(object)
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&ChartPanelObject> {
        self.panels.iter().find_map(|panel| panel.object(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut ChartPanelObject> {
        self.panels.iter_mut().find_map(|panel| panel.object_mut(id))
    }

    #[must_use]
    pub fn selected_object(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Selects `id`, or clears the selection with `None`.
    pub fn select_object(&mut self, id: Option<ObjectId>) -> ChartResult<()> {
        if let Some(id) = id {
            if self.object(id).is_none() {
                return Err(ChartError::NotFound(format!("{id}")));
            }
        }
        if let Some(previous) = self.selected.take() {
            if let Some(object) = self.object_mut(previous) {
                object.set_selected(false);
            }
        }
        if let Some(id) = id {
            if let Some(object) = self.object_mut(id) {
                object.set_selected(true);
            }
            self.selected = Some(id);
        }
        Ok(())
    }

    /// Issues a request for the newest page (`Bars`) or the page older than
    /// the first loaded bar (`MoreBars`).
    pub fn request_bars(&mut self, kind: RequestKind) -> BarsRequest {
        let end_date_ms = match kind {
            RequestKind::Bars => None,
            RequestKind::MoreBars => self.bars.dates().first_value(),
        };
        let request = self.requests.issue(
            &self.config.chart_id,
            kind,
            self.config.history_page_size,
            end_date_ms,
        );
        debug!(
            chart_id = %request.chart_id,
            request_id = request.id,
            kind = kind.as_str(),
            count = request.count,
            "bars requested"
        );
        request
    }

    /// Issues a `MoreBars` request once scrolling reached the oldest record.
    pub fn poll_history_request(&mut self) -> Option<BarsRequest> {
        if self.bars.is_empty() || !self.date_scale.take_history_request() {
            return None;
        }
        Some(self.request_bars(RequestKind::MoreBars))
    }

    /// Applies a datafeed response. Returns `false` for stale responses.
    ///
    /// `Bars` pages are appended and the view jumps to the newest records on
    /// desktop; `MoreBars` pages are inserted before the first bar and the
    /// view keeps showing the same bars.
    pub fn accept_bars(&mut self, request: &BarsRequest, response: BarsResponse) -> ChartResult<bool> {
        let Some(kind) = self.requests.complete(request, &response) else {
            return Ok(false);
        };
        let count = response.bars.len();
        let result = match kind {
            RequestKind::Bars => self.append_page(&response.bars),
            RequestKind::MoreBars => self.prepend_page(&response.bars),
        };
        self.date_scale.on_more_history_request_completed();
        result?;
        info!(
            chart_id = %request.chart_id,
            kind = kind.as_str(),
            count,
            total = self.bars.len(),
            "bars accepted"
        );
        self.on_bars_changed()?;
        Ok(true)
    }

    /// Requests the newest page from `datafeed` and applies it.
    pub async fn load_initial_bars<D: Datafeed>(&mut self, datafeed: &D) -> ChartResult<bool> {
        let request = self.request_bars(RequestKind::Bars);
        let response = datafeed.send(request.clone()).await?;
        self.accept_bars(&request, response)
    }

    /// Requests the page before the first bar from `datafeed` and applies it.
    pub async fn load_more_history<D: Datafeed>(&mut self, datafeed: &D) -> ChartResult<bool> {
        let request = self.request_bars(RequestKind::MoreBars);
        match datafeed.send(request.clone()).await {
            Ok(response) => self.accept_bars(&request, response),
            Err(e) => {
                self.requests.cancel(&request);
                self.date_scale.on_more_history_request_completed();
                warn!(chart_id = %request.chart_id, error = %e, "history request failed");
                Err(e)
            }
        }
    }

    fn append_page(&mut self, bars: &[Bar]) -> ChartResult<()> {
        let first_page = self.bars.is_empty();
        for bar in bars {
            self.bars.push(*bar)?;
            self.series.push_nulls();
        }
        if first_page {
            self.date_scale.set_needs_auto_scale();
        }
        self.converter.recompute(&self.bars);
        if !self.config.mobile && !bars.is_empty() {
            let record_count = self.record_count();
            self.date_scale.show_last_records(bars.len(), record_count);
        }
        Ok(())
    }

    fn prepend_page(&mut self, bars: &[Bar]) -> ChartResult<()> {
        let before = self.record_count();
        let inserted = self.bars.prepend(bars)?;
        self.series.prepend_nulls(inserted);
        self.converter.recompute(&self.bars);
        let shift = self.record_count().saturating_sub(before);
        self.date_scale.shift_records(shift as f64);
        Ok(())
    }

    fn on_bars_replaced(&mut self) -> ChartResult<()> {
        self.date_scale.set_needs_auto_scale();
        self.on_bars_changed()
    }

    fn on_bars_changed(&mut self) -> ChartResult<()> {
        self.converter.recompute(&self.bars);
        self.needs_value_auto_scale = true;
        self.layout()
    }
}
