use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::{DateScaleConfig, TimeFrame, VisibleRange};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;
use crate::state::{Stateful, date_calibrator_registry, deserialize_optional, price_style_registry};
use crate::store::DataStore;

use super::Chart;
use super::objects::ObjectId;
use super::panel::{ChartPanel, ChartPanelState};

/// Everything needed to restore a chart's presentation; bars are not part of
/// it and come back through the datafeed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartState {
    pub time_frame: TimeFrame,
    #[serde(default)]
    pub price_style: Value,
    #[serde(default)]
    pub date_calibrator: Value,
    #[serde(default)]
    pub date_scale: DateScaleConfig,
    #[serde(default)]
    pub visible_range: Option<VisibleRange>,
    pub panels: Vec<ChartPanelState>,
}

impl<R: Renderer> Chart<R> {
    pub fn save_state(&self) -> ChartResult<ChartState> {
        Ok(ChartState {
            time_frame: self.config.time_frame,
            price_style: self.converter.style().save_state()?,
            date_calibrator: self.date_calibrator.save_state()?,
            date_scale: self.date_scale.config(),
            visible_range: self.date_scale.visible_range(),
            panels: self
                .panels
                .iter()
                .map(ChartPanel::save_state)
                .collect::<ChartResult<_>>()?,
        })
    }

    /// Replaces panels, objects, styles and the view with `state`.
    ///
    /// Every blob is parsed before the chart is touched. Restored objects get
    /// fresh ids and the selection is cleared.
    pub fn load_state(&mut self, state: &ChartState) -> ChartResult<()> {
        let time_frame = TimeFrame::new(state.time_frame.periodicity, state.time_frame.interval)?;
        let price_style = deserialize_optional(&price_style_registry(), Some(&state.price_style))?
            .unwrap_or_default()
            .validate()?;
        let date_calibrator =
            deserialize_optional(&date_calibrator_registry(), Some(&state.date_calibrator))?
                .unwrap_or_default();
        let date_scale = state.date_scale.validate()?;
        if state.panels.first().is_none_or(|panel| !panel.shows_price) {
            return Err(ChartError::InvalidData(
                "chart state must start with the price panel".to_owned(),
            ));
        }
        let restored = state
            .panels
            .iter()
            .map(ChartPanel::from_state)
            .collect::<ChartResult<Vec<_>>>()?;

        self.stop_kinetic_pan();
        self.selected = None;
        self.config.time_frame = time_frame;
        self.converter.set_style(price_style);
        self.converter.recompute(&self.bars);
        self.date_calibrator = date_calibrator;
        self.date_scale.set_config(date_scale)?;
        self.panels.clear();
        let mut object_count = 0;
        for (mut panel, objects) in restored {
            for object in objects {
                let id = ObjectId(self.next_object_id);
                self.next_object_id += 1;
                panel.insert_object(id, object);
                object_count += 1;
            }
            self.panels.push(panel);
        }

        match state.visible_range {
            Some(range) => self.date_scale.set_visible_records(range.first, range.last)?,
            None => self.date_scale.set_needs_auto_scale(),
        }
        self.needs_value_auto_scale = true;
        self.layout()?;
        debug!(
            chart_id = %self.config.chart_id,
            panels = self.panels.len(),
            objects = object_count,
            "chart state loaded"
        );
        Ok(())
    }

    /// Store key of this chart's state.
    #[must_use]
    pub fn state_key(&self) -> String {
        format!("{}.state", self.config.chart_id)
    }

    /// Writes the versioned state contract under [`state_key`](Self::state_key).
    pub async fn save_to_store<S: DataStore>(&self, store: &S) -> ChartResult<()> {
        let json = self.save_state()?.to_json_contract_v1_pretty()?;
        store.save(&self.state_key(), &json).await?;
        info!(chart_id = %self.config.chart_id, "chart state persisted");
        Ok(())
    }

    /// Restores the state saved under [`state_key`](Self::state_key); `false`
    /// when nothing was stored.
    pub async fn load_from_store<S: DataStore>(&mut self, store: &S) -> ChartResult<bool> {
        let Some(json) = store.load(&self.state_key()).await? else {
            return Ok(false);
        };
        let state = ChartState::from_json_compat_str(&json)?;
        self.load_state(&state)?;
        Ok(true)
    }

    /// Replaces the price style from a persisted blob such as
    /// `{"className": "renko", "options": {...}}`.
    pub fn load_price_style(&mut self, state: &Value) -> ChartResult<()> {
        let style = deserialize_optional(&price_style_registry(), Some(state))?
            .unwrap_or_default();
        self.set_price_style(style)
    }
}
