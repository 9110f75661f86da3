use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::calibration::ValueCalibrator;
use crate::core::{BarSeries, Rect, SeriesSet, ValueScale};
use crate::error::{ChartError, ChartResult};
use crate::state::{Stateful, deserialize, deserialize_optional, value_calibrator_registry};

use super::objects::{ChartPanelObject, ObjectId, panel_object_registry};

/// Area filled between two auxiliary series, e.g. a channel or a cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandPlot {
    pub upper: String,
    pub lower: String,
}

/// Horizontal stripe of the chart with its own value scale.
///
/// The first panel of a chart plots the price bars; every panel can plot
/// auxiliary series by name and host panel objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    height_ratio: f64,
    shows_price: bool,
    plots: Vec<String>,
    bands: Vec<BandPlot>,
    value_scale: ValueScale,
    value_calibrator: ValueCalibrator,
    objects: Vec<ChartPanelObject>,
    frame: Rect,
    content_frame: Rect,
}

impl ChartPanel {
    pub fn new(height_ratio: f64) -> ChartResult<Self> {
        validate_height_ratio(height_ratio)?;
        Ok(Self {
            height_ratio,
            shows_price: false,
            plots: Vec::new(),
            bands: Vec::new(),
            value_scale: ValueScale::default(),
            value_calibrator: ValueCalibrator::default(),
            objects: Vec::new(),
            frame: Rect::default(),
            content_frame: Rect::default(),
        })
    }

    pub(crate) fn price_panel(height_ratio: f64) -> ChartResult<Self> {
        let mut panel = Self::new(height_ratio)?;
        panel.shows_price = true;
        Ok(panel)
    }

    #[must_use]
    pub fn height_ratio(&self) -> f64 {
        self.height_ratio
    }

    pub fn set_height_ratio(&mut self, height_ratio: f64) -> ChartResult<()> {
        validate_height_ratio(height_ratio)?;
        self.height_ratio = height_ratio;
        Ok(())
    }

    #[must_use]
    pub fn shows_price(&self) -> bool {
        self.shows_price
    }

    #[must_use]
    pub fn plots(&self) -> &[String] {
        &self.plots
    }

    /// Plots the auxiliary series `name`; `false` when already plotted.
    pub fn add_plot(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.plots.contains(&name) {
            return false;
        }
        self.plots.push(name);
        true
    }

    /// Unplots `name` and drops the bands built on it.
    pub fn remove_plot(&mut self, name: &str) -> bool {
        let before = self.plots.len() + self.bands.len();
        self.plots.retain(|plot| plot != name);
        self.bands
            .retain(|band| band.upper != name && band.lower != name);
        self.plots.len() + self.bands.len() != before
    }

    #[must_use]
    pub fn bands(&self) -> &[BandPlot] {
        &self.bands
    }

    /// Fills the area between the series `upper` and `lower`.
    pub fn add_band(&mut self, upper: impl Into<String>, lower: impl Into<String>) -> bool {
        let band = BandPlot {
            upper: upper.into(),
            lower: lower.into(),
        };
        if self.bands.contains(&band) {
            return false;
        }
        self.bands.push(band);
        true
    }

    pub fn remove_band(&mut self, upper: &str, lower: &str) -> bool {
        let before = self.bands.len();
        self.bands
            .retain(|band| band.upper != upper || band.lower != lower);
        self.bands.len() != before
    }

    #[must_use]
    pub fn value_scale(&self) -> &ValueScale {
        &self.value_scale
    }

    pub fn value_scale_mut(&mut self) -> &mut ValueScale {
        &mut self.value_scale
    }

    #[must_use]
    pub fn value_calibrator(&self) -> &ValueCalibrator {
        &self.value_calibrator
    }

    pub fn set_value_calibrator(&mut self, calibrator: ValueCalibrator) {
        self.value_calibrator = calibrator;
    }

    pub(crate) fn value_calibrator_mut(&mut self) -> &mut ValueCalibrator {
        &mut self.value_calibrator
    }

    /// Whole panel including its value axis.
    #[must_use]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Plot area.
    #[must_use]
    pub fn content_frame(&self) -> Rect {
        self.content_frame
    }

    pub(crate) fn set_frames(&mut self, frame: Rect, content_frame: Rect) {
        self.frame = frame;
        self.content_frame = content_frame;
        self.value_scale.set_frame(content_frame);
    }

    #[must_use]
    pub fn objects(&self) -> &[ChartPanelObject] {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut [ChartPanelObject] {
        &mut self.objects
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&ChartPanelObject> {
        self.objects.iter().find(|object| object.id() == Some(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut ChartPanelObject> {
        self.objects.iter_mut().find(|object| object.id() == Some(id))
    }

    pub(crate) fn insert_object(&mut self, id: ObjectId, mut object: ChartPanelObject) {
        object.attach(id);
        self.objects.push(object);
    }

    pub(crate) fn take_object(&mut self, id: ObjectId) -> Option<ChartPanelObject> {
        let index = self.objects.iter().position(|object| object.id() == Some(id))?;
        let mut object = self.objects.remove(index);
        object.detach();
        Some(object)
    }

    /// Lowest and highest value drawn over `count` records from `start`.
    ///
    /// `bars` is the plotted price series; it only counts on the price panel.
    #[must_use]
    pub fn value_range(
        &self,
        bars: &BarSeries,
        series: &SeriesSet,
        start: usize,
        count: usize,
    ) -> Option<(f64, f64)> {
        let mut range = if self.shows_price {
            bars.price_range(start, count)
        } else {
            None
        };
        let band_names = self
            .bands
            .iter()
            .flat_map(|band| [&band.upper, &band.lower]);
        for name in self.plots.iter().chain(band_names) {
            let Some(min_max) = series.get(name).and_then(|s| s.min_max(start, count)) else {
                continue;
            };
            range = Some(match range {
                Some((min, max)) => (min.min(min_max.min), max.max(min_max.max)),
                None => (min_max.min, min_max.max),
            });
        }
        range
    }

    /// Fits the value scale to the visible records; returns whether it moved.
    pub(crate) fn auto_scale(
        &mut self,
        bars: &BarSeries,
        series: &SeriesSet,
        start: usize,
        count: usize,
    ) -> ChartResult<bool> {
        let Some((min, max)) = self.value_range(bars, series, start, count) else {
            return Ok(false);
        };
        let before = (self.value_scale.min_visible(), self.value_scale.max_visible());
        self.value_scale.auto_scale(min, max)?;
        let after = (self.value_scale.min_visible(), self.value_scale.max_visible());
        if before != after {
            debug!(min = after.0, max = after.1, "panel value scale auto-scaled");
        }
        Ok(before != after)
    }
}

fn validate_height_ratio(height_ratio: f64) -> ChartResult<()> {
    if !height_ratio.is_finite() || height_ratio <= 0.0 {
        return Err(ChartError::InvalidConfig(
            "panel height ratio must be finite and > 0".to_owned(),
        ));
    }
    Ok(())
}

/// Persisted form of a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPanelState {
    pub height_ratio: f64,
    #[serde(default)]
    pub shows_price: bool,
    #[serde(default)]
    pub plots: Vec<String>,
    #[serde(default)]
    pub bands: Vec<BandPlot>,
    pub value_scale: ValueScale,
    #[serde(default)]
    pub value_calibrator: Value,
    #[serde(default)]
    pub objects: Vec<Value>,
}

impl ChartPanel {
    pub fn save_state(&self) -> ChartResult<ChartPanelState> {
        Ok(ChartPanelState {
            height_ratio: self.height_ratio,
            shows_price: self.shows_price,
            plots: self.plots.clone(),
            bands: self.bands.clone(),
            value_scale: self.value_scale,
            value_calibrator: self.value_calibrator.save_state()?,
            objects: self
                .objects
                .iter()
                .map(|object| object.save_state())
                .collect::<ChartResult<_>>()?,
        })
    }

    /// Rebuilds a panel; objects come back detached and are attached by the
    /// chart.
    pub fn from_state(state: &ChartPanelState) -> ChartResult<(Self, Vec<ChartPanelObject>)> {
        let mut panel = Self::new(state.height_ratio)?;
        panel.shows_price = state.shows_price;
        panel.plots = state.plots.clone();
        panel.bands = state.bands.clone();
        panel.value_scale = state.value_scale;
        panel.value_calibrator =
            deserialize_optional(&value_calibrator_registry(), Some(&state.value_calibrator))?
                .unwrap_or_default();

        let registry = panel_object_registry();
        let objects = state
            .objects
            .iter()
            .map(|blob| deserialize(&registry, blob))
            .collect::<ChartResult<Vec<_>>>()?;
        Ok((panel, objects))
    }
}
