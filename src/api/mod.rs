//! Host-facing chart: composes bars, scales, panels, price styles, input,
//! animation, persistence and rendering behind [`Chart`].

mod chart;
mod chart_data;
mod chart_input;
mod chart_layout;
mod chart_state;
mod config;
mod json_contract;
mod objects;
mod panel;
mod render_frame_builder;

pub use chart::{Chart, ChartEvent};
pub use chart_state::ChartState;
pub use config::{ChartColors, ChartConfig};
pub use json_contract::{CHART_STATE_JSON_SCHEMA_V1, ChartStateJsonContractV1};
pub use objects::{
    ChartPanelObject, GEOMETRIC_MARKER_CLASS_NAME, GeometricMarkerOptions,
    HIGHLIGHTED_COLUMN_CLASS_NAME, HighlightedColumnOptions, MarkerShape, MarkerSize, ObjectGeometry,
    ObjectId, PanelObjectKind, PanelObjectOptions, SPREAD_CLASS_NAME, SpreadOptions,
    panel_object_registry,
};
pub use panel::{BandPlot, ChartPanel, ChartPanelState};
