use smallvec::SmallVec;

use crate::core::types::Point;
use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::{EventKind, WindowEvent};
use crate::interaction::gesture::{
    Gesture, GestureConfig, GestureKind, GestureSignal, GestureState, GestureTarget, check_hit,
};

/// Mouse wheel steps and two-finger pinch.
///
/// `delta` is `1` for zoom out (wheel down, fingers closing) and `-1` for
/// zoom in.
#[derive(Debug, Clone)]
pub struct MouseWheelGesture {
    config: GestureConfig,
    state: GestureState,
    delta: f64,
    prev_scale: f64,
    scale_threshold: f64,
}

impl MouseWheelGesture {
    pub const DEFAULT_SCALE_THRESHOLD: f64 = 0.005;

    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::None,
            delta: 0.0,
            prev_scale: 0.0,
            scale_threshold: Self::DEFAULT_SCALE_THRESHOLD,
        }
    }

    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    fn notify(&self, event: &WindowEvent, position: Point, target: &mut dyn GestureTarget) {
        let mut signal = GestureSignal::new(GestureKind::Wheel, self.state, event);
        signal.position = position;
        signal.delta = self.delta;
        target.on_gesture(&signal);
    }
}

/// Finger distance normalized by the larger viewport side.
fn touches_scale(touches: &SmallVec<[Point; 2]>, env: &InputEnvironment) -> Option<f64> {
    let [first, second] = touches.as_slice() else {
        return None;
    };
    let extent = env.viewport_extent();
    if !extent.is_finite() || extent <= 0.0 {
        return None;
    }
    Some(first.distance_to(*second) / extent)
}

fn touches_midpoint(touches: &SmallVec<[Point; 2]>) -> Option<Point> {
    let [first, second] = touches.as_slice() else {
        return None;
    };
    Some(Point::new((first.x + second.x) / 2.0, (first.y + second.y) / 2.0))
}

impl Gesture for MouseWheelGesture {
    fn kind(&self) -> GestureKind {
        GestureKind::Wheel
    }

    fn key(&self) -> &str {
        self.config.key_or(GestureKind::Wheel)
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
        match event.kind {
            EventKind::Wheel => {
                if !(check_hit(event, &*target) && self.config.check_keys(event)) {
                    return false;
                }
                self.delta = if event.wheel_delta > 0.0 { 1.0 } else { -1.0 };
                self.state = GestureState::Finished;
                self.notify(event, event.position, target);
                true
            }
            EventKind::TouchStart => {
                env.mark_touch();
                if self.is_active() || event.touches.len() != 2 {
                    return false;
                }
                let Some(scale) = event.scale.or_else(|| touches_scale(&event.touches, env)) else {
                    return false;
                };
                self.prev_scale = scale;
                self.state = GestureState::Started;
                true
            }
            EventKind::TouchMove => {
                if !self.is_active() {
                    return false;
                }
                let (scale, position) = match event.scale {
                    Some(scale) => (scale, event.position),
                    None => match (
                        touches_scale(&event.touches, env),
                        touches_midpoint(&event.touches),
                    ) {
                        (Some(scale), Some(midpoint)) => (scale, midpoint),
                        _ => return true,
                    },
                };
                let offset = scale - self.prev_scale;
                let sign_changed =
                    (self.prev_scale > 0.0 && scale < 0.0) || (self.prev_scale < 0.0 && scale > 0.0);
                let threshold = if sign_changed { 2.0 } else { 1.0 } * self.scale_threshold;
                if offset.abs() >= threshold {
                    self.delta = if offset < 0.0 { 1.0 } else { -1.0 };
                    self.state = GestureState::Continued;
                    self.prev_scale = scale;
                    self.notify(event, position, target);
                }
                true
            }
            EventKind::TouchEnd => {
                if !self.is_active() {
                    return false;
                }
                self.state = GestureState::Finished;
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::None;
        self.delta = 0.0;
        self.prev_scale = 0.0;
    }
}
