use crate::core::types::Point;
use crate::error::{ChartError, ChartResult};
use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::{EventKind, WindowEvent};
use crate::interaction::gesture::{
    Gesture, GestureConfig, GestureKind, GestureSignal, GestureState, GestureTarget, check_hit,
};

/// Right click, or a long tap recognized by [`Gesture::poll`].
#[derive(Debug, Clone)]
pub struct ContextMenuGesture {
    config: GestureConfig,
    max_touch_offset: f64,
    touch_interval_ms: i64,
    state: GestureState,
    start: Option<(Point, i64)>,
    last_event: Option<WindowEvent>,
}

impl ContextMenuGesture {
    pub const DEFAULT_MAX_TOUCH_OFFSET: f64 = 10.0;
    pub const DEFAULT_TOUCH_INTERVAL_MS: i64 = 2000;

    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            max_touch_offset: Self::DEFAULT_MAX_TOUCH_OFFSET,
            touch_interval_ms: Self::DEFAULT_TOUCH_INTERVAL_MS,
            state: GestureState::None,
            start: None,
            last_event: None,
        }
    }

    pub fn with_long_tap(
        config: GestureConfig,
        max_touch_offset: f64,
        touch_interval_ms: i64,
    ) -> ChartResult<Self> {
        if !max_touch_offset.is_finite() || max_touch_offset <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "max touch offset must be finite and > 0".to_owned(),
            ));
        }
        if touch_interval_ms <= 0 {
            return Err(ChartError::InvalidConfig(
                "touch interval must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            max_touch_offset,
            touch_interval_ms,
            ..Self::new(config)
        })
    }

    fn finish(&mut self, event: &WindowEvent, target: &mut dyn GestureTarget) -> bool {
        if !check_hit(event, &*target) {
            return false;
        }
        self.state = GestureState::Finished;
        let mut signal = GestureSignal::new(GestureKind::ContextMenu, self.state, event);
        if let Some((point, started_ms)) = self.start {
            signal.start_point = Some(point);
            signal.elapsed_ms = Some(event.timestamp_ms - started_ms);
        }
        target.on_gesture(&signal);
        true
    }
}

impl Gesture for ContextMenuGesture {
    fn kind(&self) -> GestureKind {
        GestureKind::ContextMenu
    }

    fn key(&self) -> &str {
        self.config.key_or(GestureKind::ContextMenu)
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
            EventKind::ContextMenu => {
                self.start = None;
                self.config.check_keys(event) && self.finish(event, target)
            }
            EventKind::TouchStart => {
                env.mark_touch();
                if check_hit(event, &*target) {
                    self.start = Some((event.position, event.timestamp_ms));
                    self.last_event = Some(event.clone());
                    self.state = GestureState::Started;
                }
                false
            }
            EventKind::TouchMove => {
                if self.is_active() {
                    self.last_event = Some(event.clone());
                }
                false
            }
            EventKind::TouchEnd => {
                if self.is_active() {
                    self.state = GestureState::None;
                }
                // A tap that already opened the menu swallows its release.
                self.last_event.take().is_some() && self.state == GestureState::Finished
            }
            _ => false,
        }
    }

    fn poll(
        &mut self,
        now_ms: i64,
        _env: &mut InputEnvironment,
        target: &mut dyn GestureTarget,
    ) -> bool {
        if !self.is_active() {
            return false;
        }
        let (Some((start_point, started_ms)), Some(last)) = (self.start, self.last_event.clone()) else {
            return false;
        };
        if now_ms - started_ms < self.touch_interval_ms {
            return false;
        }
        let is_long_tap = (last.position.x - start_point.x).abs() <= self.max_touch_offset
            && (last.position.y - start_point.y).abs() <= self.max_touch_offset;
        if is_long_tap {
            let mut held = last;
            held.timestamp_ms = now_ms;
            if self.finish(&held, target) {
                return true;
            }
        }
        self.state = GestureState::None;
        false
    }

    fn reset(&mut self) {
        self.state = GestureState::None;
        self.start = None;
        self.last_event = None;
    }
}
