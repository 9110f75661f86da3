use serde::{Deserialize, Serialize};

use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::{EventKind, WindowEvent};
use crate::interaction::gesture::{
    Gesture, GestureConfig, GestureKind, GestureSignal, GestureState, GestureTarget, check_hit,
};

/// Which hover notifications reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverOptions {
    pub enter_enabled: bool,
    pub hover_enabled: bool,
    pub leave_enabled: bool,
}

impl Default for HoverOptions {
    fn default() -> Self {
        Self {
            enter_enabled: true,
            hover_enabled: true,
            leave_enabled: true,
        }
    }
}

/// Tracks the pointer entering, moving over and leaving the target.
///
/// `Started` is enter, `Continued` is hover and `Finished` is leave.
#[derive(Debug, Clone)]
pub struct MouseHoverGesture {
    config: GestureConfig,
    options: HoverOptions,
    state: GestureState,
}

impl MouseHoverGesture {
    #[must_use]
    pub fn new(config: GestureConfig, options: HoverOptions) -> Self {
        Self {
            config,
            options,
            state: GestureState::None,
        }
    }

    fn transition(
        &mut self,
        state: GestureState,
        enabled: bool,
        event: &WindowEvent,
        target: &mut dyn GestureTarget,
    ) {
        self.state = state;
        if enabled {
            target.on_gesture(&GestureSignal::new(GestureKind::Hover, state, event));
        }
    }
}

impl Gesture for MouseHoverGesture {
    fn kind(&self) -> GestureKind {
        GestureKind::Hover
    }

    fn key(&self) -> &str {
        self.config.key_or(GestureKind::Hover)
    }

    fn state(&self) -> GestureState {
        self.state
    }

    fn is_hover(&self) -> bool {
        true
    }

    fn handle_event(
        &mut self,
        event: &WindowEvent,
        _env: &mut InputEnvironment,
        target: &mut dyn GestureTarget,
    ) -> bool {
        match event.kind {
            EventKind::MouseEnter | EventKind::MouseMove | EventKind::TouchStart | EventKind::TouchMove => {
                if check_hit(event, &*target) {
                    if self.is_active() {
                        self.transition(GestureState::Continued, self.options.hover_enabled, event, target);
                    } else {
                        self.transition(GestureState::Started, self.options.enter_enabled, event, target);
                    }
                    true
                } else if self.is_active() {
                    self.transition(GestureState::Finished, self.options.leave_enabled, event, target);
                    true
                } else {
                    false
                }
            }
            EventKind::MouseLeave | EventKind::TouchEnd => {
                if !self.is_active() {
                    return false;
                }
                self.transition(GestureState::Finished, self.options.leave_enabled, event, target);
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::None;
    }
}
