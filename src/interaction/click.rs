use serde::{Deserialize, Serialize};

use crate::core::types::Point;
use crate::error::{ChartError, ChartResult};
use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::{EventKind, WindowEvent};
use crate::interaction::gesture::{
    Gesture, GestureConfig, GestureKind, GestureSignal, GestureState, GestureTarget, check_hit,
};

/// Limits for recognizing a tap from a touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapLimits {
    /// Largest allowed |dx| and |dy| between touch start and end.
    pub max_touch_offset: f64,
    /// Longest allowed time between touch start and end.
    pub max_touch_interval_ms: i64,
}

impl TapLimits {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.max_touch_offset.is_finite() || self.max_touch_offset <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "max touch offset must be finite and > 0".to_owned(),
            ));
        }
        if self.max_touch_interval_ms <= 0 {
            return Err(ChartError::InvalidConfig(
                "max touch interval must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    fn accepts(self, start: Point, start_ms: i64, end: &WindowEvent) -> bool {
        (end.position.x - start.x).abs() <= self.max_touch_offset
            && (end.position.y - start.y).abs() <= self.max_touch_offset
            && end.timestamp_ms - start_ms <= self.max_touch_interval_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TouchStart {
    point: Point,
    timestamp_ms: i64,
}

/// Single click or tap.
#[derive(Debug, Clone)]
pub struct ClickGesture {
    config: GestureConfig,
    limits: TapLimits,
    state: GestureState,
    touch_start: Option<TouchStart>,
}

impl ClickGesture {
    pub const DEFAULT_LIMITS: TapLimits = TapLimits {
        max_touch_offset: 10.0,
        max_touch_interval_ms: 500,
    };

    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            limits: Self::DEFAULT_LIMITS,
            state: GestureState::None,
            touch_start: None,
        }
    }

    pub fn with_limits(config: GestureConfig, limits: TapLimits) -> ChartResult<Self> {
        Ok(Self {
            limits: limits.validate()?,
            ..Self::new(config)
        })
    }

    #[must_use]
    pub fn limits(&self) -> TapLimits {
        self.limits
    }

    fn finish(&mut self, event: &WindowEvent, env: &InputEnvironment, target: &mut dyn GestureTarget) -> bool {
        if !(self.config.check_button(event, env)
            && check_hit(event, &*target)
            && self.config.check_keys(event))
        {
            return false;
        }
        self.state = GestureState::Finished;
        let mut signal = GestureSignal::new(GestureKind::Click, self.state, event);
        if let Some(start) = self.touch_start {
            signal.start_point = Some(start.point);
            signal.elapsed_ms = Some(event.timestamp_ms - start.timestamp_ms);
        }
        target.on_gesture(&signal);
        self.reset();
        true
    }
}

impl Gesture for ClickGesture {
    fn kind(&self) -> GestureKind {
        GestureKind::Click
    }

    fn key(&self) -> &str {
        self.config.key_or(GestureKind::Click)
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
            // Synthetic clicks follow every tap; the touch path owns those.
            EventKind::Click => !env.has_seen_touch() && self.finish(event, env, target),
            EventKind::TouchStart => {
                env.mark_touch();
                if check_hit(event, &*target) {
                    self.touch_start = Some(TouchStart {
                        point: event.position,
                        timestamp_ms: event.timestamp_ms,
                    });
                    self.state = GestureState::Started;
                }
                false
            }
            EventKind::TouchEnd => {
                if !self.is_active() {
                    return false;
                }
                let is_tap = self
                    .touch_start
                    .is_some_and(|start| self.limits.accepts(start.point, start.timestamp_ms, event));
                if is_tap && self.finish(event, env, target) {
                    return true;
                }
                self.state = GestureState::None;
                false
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::None;
        self.touch_start = None;
    }
}

/// Double click, or two taps close in space and time.
#[derive(Debug, Clone)]
pub struct DoubleClickGesture {
    config: GestureConfig,
    limits: TapLimits,
    state: GestureState,
    touch_start: Option<TouchStart>,
    is_second_touch: bool,
}

impl DoubleClickGesture {
    pub const DEFAULT_LIMITS: TapLimits = TapLimits {
        max_touch_offset: 10.0,
        max_touch_interval_ms: 2500,
    };

    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            limits: Self::DEFAULT_LIMITS,
            state: GestureState::None,
            touch_start: None,
            is_second_touch: false,
        }
    }

    pub fn with_limits(config: GestureConfig, limits: TapLimits) -> ChartResult<Self> {
        Ok(Self {
            limits: limits.validate()?,
            ..Self::new(config)
        })
    }

    fn finish(&mut self, event: &WindowEvent, env: &InputEnvironment, target: &mut dyn GestureTarget) -> bool {
        if !(self.config.check_button(event, env) && check_hit(event, &*target)) {
            return false;
        }
        self.state = GestureState::Finished;
        let mut signal = GestureSignal::new(GestureKind::DoubleClick, self.state, event);
        if let Some(start) = self.touch_start {
            signal.start_point = Some(start.point);
            signal.elapsed_ms = Some(event.timestamp_ms - start.timestamp_ms);
        }
        target.on_gesture(&signal);
        self.reset();
        true
    }
}

impl Gesture for DoubleClickGesture {
    fn kind(&self) -> GestureKind {
        GestureKind::DoubleClick
    }

    fn key(&self) -> &str {
        self.config.key_or(GestureKind::DoubleClick)
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
            EventKind::DoubleClick => self.finish(event, env, target),
            EventKind::TouchStart => {
                env.mark_touch();
                if self.is_active() {
                    self.is_second_touch = true;
                    return true;
                }
                if check_hit(event, &*target) {
                    self.touch_start = Some(TouchStart {
                        point: event.position,
                        timestamp_ms: event.timestamp_ms,
                    });
                    self.is_second_touch = false;
                    self.state = GestureState::Started;
                    return true;
                }
                self.state = GestureState::None;
                false
            }
            EventKind::TouchEnd => {
                if !self.is_second_touch {
                    return false;
                }
                let is_double_tap = self
                    .touch_start
                    .is_some_and(|start| self.limits.accepts(start.point, start.timestamp_ms, event));
                if is_double_tap {
                    return self.finish(event, env, target);
                }
                self.state = GestureState::None;
                self.is_second_touch = false;
                false
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::None;
        self.touch_start = None;
        self.is_second_touch = false;
    }
}
