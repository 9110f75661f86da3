//! Objects drawn on top of a panel's plots: highlighted columns, bid/ask
//! spread lines and geometric markers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::geometry::Proximity;
use crate::core::{ChartPoint, Point, Projection, Rect};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    ClickGesture, EventHandling, GestureArray, GestureConfig, GestureKind, GestureSignal,
    GestureState, GestureTarget, Hittable, InputEnvironment, WindowEvent,
};
use crate::state::{
    CLASS_NAME_KEY, ClassRegistry, OPTIONS_KEY, Stateful, class_name_of, options_or_default,
    to_state_value,
};

pub const HIGHLIGHTED_COLUMN_CLASS_NAME: &str = "StockChartX.HighlightedColumn";
pub const SPREAD_CLASS_NAME: &str = "StockChartX.Spread";
pub const GEOMETRIC_MARKER_CLASS_NAME: &str = "StockChartX.GeometricMarker";

/// Identity of an object attached to a chart panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    Diamond,
    Dot,
    Square,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerSize {
    pub width: f64,
    pub height: f64,
}

impl Default for MarkerSize {
    fn default() -> Self {
        Self {
            width: 14.0,
            height: 14.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighlightedColumnOptions {
    /// Unix epoch milliseconds of the highlighted record.
    pub date: i64,
}

/// A zero price hides its line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadOptions {
    pub ask: f64,
    pub bid: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometricMarkerOptions {
    pub point: ChartPoint,
    pub shape: MarkerShape,
    pub size: MarkerSize,
}

impl Default for GeometricMarkerOptions {
    fn default() -> Self {
        Self {
            point: ChartPoint::from_record(0.0, 0.0),
            shape: MarkerShape::Diamond,
            size: MarkerSize::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelObjectKind {
    HighlightedColumn(HighlightedColumnOptions),
    Spread(SpreadOptions),
    GeometricMarker(GeometricMarkerOptions),
}

impl PanelObjectKind {
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::HighlightedColumn(_) => HIGHLIGHTED_COLUMN_CLASS_NAME,
            Self::Spread(_) => SPREAD_CLASS_NAME,
            Self::GeometricMarker(_) => GEOMETRIC_MARKER_CLASS_NAME,
        }
    }

    pub fn validate(self) -> ChartResult<Self> {
        match self {
            Self::HighlightedColumn(_) => {}
            Self::Spread(options) => {
                if !options.ask.is_finite() || !options.bid.is_finite() {
                    return Err(ChartError::InvalidData(
                        "spread prices must be finite".to_owned(),
                    ));
                }
            }
            Self::GeometricMarker(options) => {
                if !options.point.is_resolvable() {
                    return Err(ChartError::InvalidData(
                        "marker point needs a horizontal and a vertical coordinate".to_owned(),
                    ));
                }
                let MarkerSize { width, height } = options.size;
                if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
                    return Err(ChartError::InvalidData(
                        "marker size must be finite and > 0".to_owned(),
                    ));
                }
            }
        }
        Ok(self)
    }

    fn options_value(&self) -> ChartResult<Value> {
        match self {
            Self::HighlightedColumn(options) => to_state_value(options),
            Self::Spread(options) => to_state_value(options),
            Self::GeometricMarker(options) => to_state_value(options),
        }
    }
}

/// Options shared by every panel object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelObjectOptions {
    pub visible: bool,
    pub z_index: i32,
}

impl Default for PanelObjectOptions {
    fn default() -> Self {
        Self {
            visible: true,
            z_index: 0,
        }
    }
}

/// Pixel geometry of an object under one projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectGeometry {
    /// Full-height column.
    Column(Rect),
    /// Horizontal lines across `left..right`; `None` for hidden lines.
    Lines {
        left: f64,
        right: f64,
        ask_y: Option<f64>,
        bid_y: Option<f64>,
    },
    /// Marker bounds.
    Bounds(Rect),
}

impl ObjectGeometry {
    #[must_use]
    pub fn hit_test(&self, point: Point, proximity: Proximity) -> bool {
        match *self {
            Self::Column(rect) | Self::Bounds(rect) => proximity.is_point_inside_or_near_rect(point, rect),
            Self::Lines {
                left,
                right,
                ask_y,
                bid_y,
            } => {
                let near = |y: Option<f64>| {
                    y.is_some_and(|y| {
                        proximity.is_point_near_line(point, Point::new(left, y), Point::new(right, y))
                    })
                };
                near(ask_y) || near(bid_y)
            }
        }
    }
}

/// An object living on exactly one chart panel.
///
/// Selection is recognized by the object's own click gesture.
#[derive(Debug)]
pub struct ChartPanelObject {
    id: Option<ObjectId>,
    kind: PanelObjectKind,
    options: PanelObjectOptions,
    selected: bool,
    gestures: GestureArray,
}

impl Clone for ChartPanelObject {
    /// The clone is detached and unselected.
    fn clone(&self) -> Self {
        Self::from_parts(self.kind, self.options)
    }
}

impl PartialEq for ChartPanelObject {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.options == other.options
    }
}

impl ChartPanelObject {
    pub fn new(kind: PanelObjectKind) -> ChartResult<Self> {
        Ok(Self::from_parts(kind.validate()?, PanelObjectOptions::default()))
    }

    pub fn highlighted_column(date: i64) -> ChartResult<Self> {
        Self::new(PanelObjectKind::HighlightedColumn(HighlightedColumnOptions { date }))
    }

    pub fn spread(ask: f64, bid: f64) -> ChartResult<Self> {
        Self::new(PanelObjectKind::Spread(SpreadOptions { ask, bid }))
    }

    pub fn geometric_marker(point: ChartPoint, shape: MarkerShape) -> ChartResult<Self> {
        Self::new(PanelObjectKind::GeometricMarker(GeometricMarkerOptions {
            point,
            shape,
            size: MarkerSize::default(),
        }))
    }

    fn from_parts(kind: PanelObjectKind, options: PanelObjectOptions) -> Self {
        Self {
            id: None,
            kind,
            options,
            selected: false,
            gestures: GestureArray::new().with(Box::new(ClickGesture::new(GestureConfig::default()))),
        }
    }

    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.options.z_index = z_index;
        self
    }

    /// `None` while the object is not attached to a panel.
    #[must_use]
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub(crate) fn attach(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    pub(crate) fn detach(&mut self) {
        self.id = None;
        self.selected = false;
        self.gestures.reset();
    }

    #[must_use]
    pub fn kind(&self) -> &PanelObjectKind {
        &self.kind
    }

    pub fn set_kind(&mut self, kind: PanelObjectKind) -> ChartResult<()> {
        self.kind = kind.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn options(&self) -> PanelObjectOptions {
        self.options
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.options.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.options.visible = visible;
        if !visible {
            self.selected = false;
        }
    }

    #[must_use]
    pub fn z_index(&self) -> i32 {
        self.options.z_index
    }

    pub fn set_z_index(&mut self, z_index: i32) {
        self.options.z_index = z_index;
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Pixel geometry in a panel whose plot area is `content_frame`.
    ///
    /// `None` when the object cannot be placed (unresolvable marker point).
    #[must_use]
    pub fn geometry(&self, projection: &Projection<'_>, content_frame: Rect) -> Option<ObjectGeometry> {
        match self.kind {
            PanelObjectKind::HighlightedColumn(HighlightedColumnOptions { date }) => {
                let column_width = projection.x.column_width();
                let x = projection.x.x_by_date(date);
                Some(ObjectGeometry::Column(Rect::new(
                    x - column_width / 2.0,
                    content_frame.top,
                    column_width,
                    content_frame.height,
                )))
            }
            PanelObjectKind::Spread(SpreadOptions { ask, bid }) => {
                let line_y = |value: f64| (value != 0.0).then(|| projection.y.y_by_value(value));
                Some(ObjectGeometry::Lines {
                    left: content_frame.left,
                    right: content_frame.right(),
                    ask_y: line_y(ask),
                    bid_y: line_y(bid),
                })
            }
            PanelObjectKind::GeometricMarker(options) => {
                let center = options.point.to_point(projection)?;
                Some(ObjectGeometry::Bounds(Rect::new(
                    (center.x - options.size.width / 2.0).round(),
                    (center.y - options.size.height / 2.0).round(),
                    options.size.width,
                    options.size.height,
                )))
            }
        }
    }
}

impl Stateful for ChartPanelObject {
    fn class_name(&self) -> &str {
        self.kind.class_name()
    }

    fn save_state(&self) -> ChartResult<Value> {
        let mut options = self.kind.options_value()?;
        if let Value::Object(map) = &mut options {
            map.insert("visible".to_owned(), json!(self.options.visible));
            map.insert("zIndex".to_owned(), json!(self.options.z_index));
        }
        Ok(json!({ CLASS_NAME_KEY: self.class_name(), OPTIONS_KEY: options }))
    }

    fn load_state(&mut self, state: &Value) -> ChartResult<()> {
        let class_name = match class_name_of(state) {
            Ok(name) => name,
            Err(ChartError::MissingClassName) => self.kind.class_name(),
            Err(e) => return Err(e),
        };
        let kind = match class_name {
            HIGHLIGHTED_COLUMN_CLASS_NAME => {
                PanelObjectKind::HighlightedColumn(options_or_default(state)?)
            }
            SPREAD_CLASS_NAME => PanelObjectKind::Spread(options_or_default(state)?),
            GEOMETRIC_MARKER_CLASS_NAME => PanelObjectKind::GeometricMarker(options_or_default(state)?),
            other => return Err(ChartError::NotRegistered(other.to_owned())),
        };
        self.options = options_or_default(state)?;
        self.set_kind(kind)
    }
}

/// Registry with every built-in panel object class.
#[must_use]
pub fn panel_object_registry() -> ClassRegistry<ChartPanelObject> {
    let mut registry = ClassRegistry::new();
    let defaults = [
        PanelObjectKind::HighlightedColumn(HighlightedColumnOptions::default()),
        PanelObjectKind::Spread(SpreadOptions::default()),
        PanelObjectKind::GeometricMarker(GeometricMarkerOptions::default()),
    ];
    for kind in defaults {
        let _ = registry.register(kind.class_name(), move || {
            ChartPanelObject::from_parts(kind, PanelObjectOptions::default())
        });
    }
    registry
}

/// Gesture target recording whether the object was clicked.
struct ClickTarget {
    geometry: ObjectGeometry,
    proximity: Proximity,
    clicked: bool,
}

impl Hittable for ClickTarget {
    fn hit_test(&self, point: Point) -> bool {
        self.geometry.hit_test(point, self.proximity)
    }
}

impl GestureTarget for ClickTarget {
    fn on_gesture(&mut self, signal: &GestureSignal<'_>) {
        if signal.kind == GestureKind::Click && signal.state == GestureState::Finished {
            self.clicked = true;
        }
    }
}

/// An object together with its geometry for one routing pass.
pub(crate) struct ObjectHitView<'a> {
    pub(crate) object: &'a mut ChartPanelObject,
    pub(crate) geometry: ObjectGeometry,
    pub(crate) proximity: Proximity,
    pub(crate) clicked: bool,
}

impl EventHandling for ObjectHitView<'_> {
    fn z_index(&self) -> i32 {
        self.object.z_index()
    }

    fn contains(&self, point: Point) -> bool {
        self.object.is_visible() && self.geometry.hit_test(point, self.proximity)
    }

    fn handle_event(&mut self, event: &WindowEvent, env: &mut InputEnvironment) -> bool {
        let in_bounds = self.contains(event.position);
        let mut target = ClickTarget {
            geometry: self.geometry,
            proximity: self.proximity,
            clicked: false,
        };
        let handled = self
            .object
            .gestures
            .handle_event(event, in_bounds, env, &mut target);
        self.clicked |= target.clicked;
        handled
    }
}
