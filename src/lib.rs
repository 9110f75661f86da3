//! stockchart-rs: headless financial chart core.
//!
//! Bars, date and value scales, projections, axis calibration, gesture
//! recognition, price-style conversion and class-named state blobs, composed
//! by [`Chart`]. Drawing goes through a backend-agnostic [`render::Renderer`].

pub mod animation;
pub mod api;
pub mod calibration;
pub mod core;
pub mod datafeed;
pub mod error;
pub mod interaction;
pub mod price_style;
pub mod render;
pub mod state;
pub mod store;
pub mod telemetry;

pub use api::{Chart, ChartConfig, ChartEvent, ChartPanel, ChartPanelObject, ChartState};
pub use error::{ChartError, ChartResult};
