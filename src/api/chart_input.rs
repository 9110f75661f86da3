use tracing::{debug, trace, warn};

use crate::animation::KineticPan;
use crate::core::{Point, Rect};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    GestureKind, GestureSignal, GestureState, GestureTarget, Hittable, WindowEvent,
};
use crate::render::Renderer;

use super::Chart;
use super::chart::{ChartEvent, PanTracker};
use super::objects::{ObjectGeometry, ObjectHitView};

/// Share of the plot width one wheel notch zooms by.
const WHEEL_ZOOM_RATIO: f64 = 0.05;

/// Owned copy of a gesture recognized on the chart itself.
#[derive(Debug, Clone, Copy)]
struct RecognizedGesture {
    kind: GestureKind,
    state: GestureState,
    position: Point,
    move_offset: Point,
    delta: f64,
    timestamp_ms: i64,
}

/// Collects chart-level gestures so they are applied once dispatch returns.
struct GestureQueue {
    plot_frame: Rect,
    recognized: Vec<RecognizedGesture>,
}

impl GestureQueue {
    fn new(plot_frame: Rect) -> Self {
        Self {
            plot_frame,
            recognized: Vec::new(),
        }
    }
}

impl Hittable for GestureQueue {
    fn hit_test(&self, point: Point) -> bool {
        self.plot_frame.contains_point(point)
    }
}

impl GestureTarget for GestureQueue {
    fn on_gesture(&mut self, signal: &GestureSignal<'_>) {
        self.recognized.push(RecognizedGesture {
            kind: signal.kind,
            state: signal.state,
            position: signal.position,
            move_offset: signal.move_offset,
            delta: signal.delta,
            timestamp_ms: signal.event.timestamp_ms,
        });
    }
}

impl<R: Renderer> Chart<R> {
    /// Feeds one host input event. Panel objects under the pointer see it
    /// first; otherwise the chart's own gestures scroll, zoom and auto-scale.
    ///
    /// Returns whether the event was consumed.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        if event.kind.is_touch() {
            self.env.mark_touch();
        }
        if self.route_to_objects(event) {
            return true;
        }

        let plot_frame = self.plot_frame();
        let in_bounds = plot_frame.contains_point(event.position);
        let mut queue = GestureQueue::new(plot_frame);
        let handled = self
            .gestures
            .handle_event(event, in_bounds, &mut self.env, &mut queue);
        self.apply_gestures(&queue.recognized);
        handled
    }

    /// Advances time-based gestures and running animations; call once per
    /// host frame while [`needs_frame`](Self::needs_frame) holds.
    ///
    /// Returns whether the visible records moved.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        let mut queue = GestureQueue::new(self.plot_frame());
        self.gestures.poll(now_ms, &mut self.env, &mut queue);
        let mut moved = self.apply_gestures(&queue.recognized);

        let before = self.date_scale.visible_range();
        let ran = self.animations.tick(now_ms, &mut self.date_scale);
        if let Some(id) = self.kinetic_pan {
            if !self.animations.contains(id) {
                self.animations.unregister(id);
                self.kinetic_pan = None;
                trace!("kinetic pan finished");
            }
        }
        if ran > 0 && self.date_scale.visible_range() != before {
            self.viewport_moved();
            moved = true;
        }
        moved
    }

    /// Whether the host should keep scheduling frames.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.animations.needs_frame()
    }

    #[must_use]
    pub fn is_kinetic_pan_running(&self) -> bool {
        self.kinetic_pan.is_some()
    }

    /// Starts a decaying scroll at `velocity` pixels per second; a zero
    /// velocity only stops the running one.
    pub fn start_kinetic_pan(&mut self, velocity: f64) -> ChartResult<()> {
        if !velocity.is_finite() {
            return Err(ChartError::InvalidData(
                "kinetic pan velocity must be finite".to_owned(),
            ));
        }
        self.stop_kinetic_pan();
        if velocity == 0.0 {
            return Ok(());
        }
        let pan = KineticPan::new(self.config.kinetic_pan, velocity)?;
        if !pan.is_active() {
            return Ok(());
        }
        let frame_seconds = self.animations.config().interval_ms / 1000.0;
        let animation = pan.into_animation(self.record_count(), frame_seconds);
        self.kinetic_pan = Some(self.animations.start(animation));
        debug!(velocity, "kinetic pan started");
        Ok(())
    }

    pub fn stop_kinetic_pan(&mut self) {
        if let Some(id) = self.kinetic_pan.take() {
            self.animations.unregister(id);
            trace!("kinetic pan stopped");
        }
    }

    /// Routes `event` to the objects of every panel; selects the object the
    /// click landed on.
    fn route_to_objects(&mut self, event: &WindowEvent) -> bool {
        let geometries: Vec<Vec<Option<ObjectGeometry>>> = (0..self.panels.len())
            .map(|index| {
                let panel = &self.panels[index];
                match self.projection(index) {
                    Some(projection) => panel
                        .objects()
                        .iter()
                        .map(|object| object.geometry(&projection, panel.content_frame()))
                        .collect(),
                    None => Vec::new(),
                }
            })
            .collect();

        let proximity = self.env.proximity();
        let mut views = Vec::new();
        for (panel, panel_geometries) in self.panels.iter_mut().zip(geometries) {
            for (object, geometry) in panel.objects_mut().iter_mut().zip(panel_geometries) {
                if let Some(geometry) = geometry {
                    views.push(ObjectHitView {
                        object,
                        geometry,
                        proximity,
                        clicked: false,
                    });
                }
            }
        }
        let routed = self.router.route(&mut views, event, &mut self.env);
        let clicked = views
            .iter()
            .find(|view| view.clicked)
            .and_then(|view| view.object.id());
        drop(views);

        if let Some(id) = clicked {
            if self.selected != Some(id) {
                if let Err(e) = self.select_object(Some(id)) {
                    warn!(error = %e, "object selection failed");
                } else {
                    debug!(%id, "panel object selected");
                    self.events.push(ChartEvent::ObjectSelected(id));
                }
            }
        }
        routed.is_some()
    }

    /// Applies chart-level gestures; returns whether the visible records
    /// moved.
    fn apply_gestures(&mut self, recognized: &[RecognizedGesture]) -> bool {
        let mut moved = false;
        for gesture in recognized {
            match (gesture.kind, gesture.state) {
                (GestureKind::Pan, _) => moved |= self.on_pan(gesture),
                (GestureKind::Wheel, _) => moved |= self.on_wheel(gesture),
                (GestureKind::DoubleClick, GestureState::Finished) => {
                    self.stop_kinetic_pan();
                    self.date_scale.set_needs_auto_scale();
                    self.events.push(ChartEvent::DoubleClicked(gesture.position));
                    moved = true;
                }
                (GestureKind::Click, GestureState::Finished) => {
                    if self.selected.is_some() && self.select_object(None).is_ok() {
                        self.events.push(ChartEvent::SelectionCleared);
                    }
                }
                (GestureKind::ContextMenu, GestureState::Finished) => {
                    self.events.push(ChartEvent::ContextMenu(gesture.position));
                }
                _ => {}
            }
        }
        if moved {
            self.viewport_moved();
        }
        moved
    }

    fn on_pan(&mut self, gesture: &RecognizedGesture) -> bool {
        match gesture.state {
            GestureState::Started => {
                self.stop_kinetic_pan();
                self.pan = PanTracker {
                    last_ms: Some(gesture.timestamp_ms),
                    velocity: 0.0,
                };
                false
            }
            GestureState::Continued => {
                if !self.config.scroll_enabled {
                    return false;
                }
                let dx = gesture.move_offset.x;
                if let Some(last_ms) = self.pan.last_ms {
                    let elapsed = (gesture.timestamp_ms - last_ms) as f64 / 1000.0;
                    if elapsed > 0.0 {
                        self.pan.velocity = dx / elapsed;
                    }
                }
                self.pan.last_ms = Some(gesture.timestamp_ms);
                let record_count = self.record_count();
                match self.date_scale.scroll_on_pixels(dx, record_count) {
                    Ok(moved) => moved,
                    Err(e) => {
                        warn!(error = %e, "pan scroll rejected");
                        false
                    }
                }
            }
            GestureState::Finished => {
                let velocity = std::mem::take(&mut self.pan).velocity;
                if self.config.scroll_enabled && self.config.kinetic_pan_enabled {
                    if let Err(e) = self.start_kinetic_pan(velocity) {
                        warn!(error = %e, "kinetic pan not started");
                    }
                }
                false
            }
            GestureState::None => false,
        }
    }

    fn on_wheel(&mut self, gesture: &RecognizedGesture) -> bool {
        if !self.config.zoom_enabled || gesture.delta == 0.0 {
            return false;
        }
        self.stop_kinetic_pan();
        let pixels = -gesture.delta * self.plot_frame().width * WHEEL_ZOOM_RATIO;
        let record_count = self.record_count();
        match self.date_scale.zoom_at(pixels, gesture.position.x, record_count) {
            Ok(moved) => moved,
            Err(e) => {
                warn!(error = %e, "wheel zoom rejected");
                false
            }
        }
    }

    fn viewport_moved(&mut self) {
        self.on_viewport_changed();
        self.events.push(ChartEvent::ViewportChanged);
    }
}
