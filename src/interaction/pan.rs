use serde::{Deserialize, Serialize};

use crate::core::types::Point;
use crate::error::{ChartError, ChartResult};
use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::{EventKind, WindowEvent};
use crate::interaction::gesture::{
    Gesture, GestureConfig, GestureKind, GestureSignal, GestureState, GestureTarget, check_hit,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanOptions {
    /// Smallest per-axis movement that counts as a drag step.
    pub min_move_distance: f64,
    pub horizontal_move_enabled: bool,
    pub vertical_move_enabled: bool,
}

impl Default for PanOptions {
    fn default() -> Self {
        Self {
            min_move_distance: 1.0,
            horizontal_move_enabled: true,
            vertical_move_enabled: true,
        }
    }
}

impl PanOptions {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.min_move_distance.is_finite() || self.min_move_distance <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "min move distance must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Press, drag, release.
#[derive(Debug, Clone)]
pub struct PanGesture {
    config: GestureConfig,
    options: PanOptions,
    state: GestureState,
    start_point: Option<Point>,
    prev_point: Point,
    started_ms: i64,
}

impl PanGesture {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            options: PanOptions::default(),
            state: GestureState::None,
            start_point: None,
            prev_point: Point::default(),
            started_ms: 0,
        }
    }

    pub fn with_options(config: GestureConfig, options: PanOptions) -> ChartResult<Self> {
        Ok(Self {
            options: options.validate()?,
            ..Self::new(config)
        })
    }

    #[must_use]
    pub fn options(&self) -> PanOptions {
        self.options
    }

    fn notify(&self, event: &WindowEvent, move_offset: Point, target: &mut dyn GestureTarget) {
        let mut signal = GestureSignal::new(GestureKind::Pan, self.state, event);
        signal.start_point = self.start_point;
        signal.elapsed_ms = Some(event.timestamp_ms - self.started_ms);
        signal.move_offset = move_offset;
        target.on_gesture(&signal);
    }
}

impl Gesture for PanGesture {
    fn kind(&self) -> GestureKind {
        GestureKind::Pan
    }

    fn key(&self) -> &str {
        self.config.key_or(GestureKind::Pan)
    }

    fn state(&self) -> GestureState {
        self.state
    }

    fn handle_event(
        &mut self,
        event: &WindowEvent,
        env: &mut InputEnvironment,
        target: &mut dyn GestureTarget,
    ) -> bool {
        let position = event.position;
        match event.kind {
            EventKind::MouseDown | EventKind::TouchStart => {
                if event.kind == EventKind::TouchStart {
                    env.mark_touch();
                }
                let button_ok = event.kind == EventKind::TouchStart
                    || self.config.check_button(event, env);
                if !(button_ok && check_hit(event, &*target) && self.config.check_keys(event)) {
                    return false;
                }
                self.prev_point = position;
                self.start_point = Some(position);
                self.started_ms = event.timestamp_ms;
                self.state = GestureState::Started;
                self.notify(event, Point::default(), target);
                true
            }
            EventKind::MouseMove | EventKind::TouchMove => {
                if !self.is_active() {
                    return false;
                }
                let offset = Point::new(position.x - self.prev_point.x, position.y - self.prev_point.y);
                let min = self.options.min_move_distance;
                let moved = (self.options.horizontal_move_enabled && offset.x.abs() >= min)
                    || (self.options.vertical_move_enabled && offset.y.abs() >= min);
                if moved {
                    self.state = GestureState::Continued;
                    self.prev_point = position;
                    self.notify(event, offset, target);
                }
                true
            }
            EventKind::MouseUp | EventKind::MouseLeave | EventKind::TouchEnd => {
                if !self.is_active() {
                    return false;
                }
                self.state = GestureState::Finished;
                let offset = Point::new(position.x - self.prev_point.x, position.y - self.prev_point.y);
                self.notify(event, offset, target);
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::None;
        self.start_point = None;
    }
}
