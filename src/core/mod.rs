pub mod band;
pub mod bar_series;
pub mod chart_point;
pub mod data_series;
pub mod date_scale;
pub mod dictionary;
pub mod geometry;
pub mod primitives;
pub mod projection;
pub mod time_frame;
pub mod types;
pub mod value_scale;

pub use band::{band_fill_path, first_non_null_value};
pub use bar_series::{Bar, BarSeries, SeriesSet};
pub use chart_point::ChartPoint;
pub use data_series::{DataSeries, MinMax};
pub use date_scale::{DateScale, DateScaleConfig, VisibleRange, ZoomMode};
pub use dictionary::Dictionary;
pub use geometry::{Proximity, Regression, linear_regression};
pub use primitives::MIN_VALUE_SPAN;
pub use projection::{DateProjection, Projection, ValueProjection};
pub use time_frame::{Periodicity, TimeFrame, TimeSpan};
pub use types::{Padding, Point, Rect, Viewport};
pub use value_scale::{ScaleKind, ValueScale};
