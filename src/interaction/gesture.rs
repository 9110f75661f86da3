use smallvec::SmallVec;

use crate::core::types::Point;
use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::{EventKind, MouseButton, WindowEvent};

/// Life cycle of one gesture recognition.
///
/// An aborted cycle returns to `None` without notifying the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    None,
    Started,
    Continued,
    Finished,
}

impl GestureState {
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Started | Self::Continued)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Click,
    DoubleClick,
    ContextMenu,
    Pan,
    Wheel,
    Hover,
}

impl GestureKind {
    #[must_use]
    pub fn default_key(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DoubleClick => "doubleClick",
            Self::ContextMenu => "contextMenu",
            Self::Pan => "pan",
            Self::Wheel => "wheel",
            Self::Hover => "hover",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyModifier {
    Shift,
    Ctrl,
    Alt,
}

/// Options shared by every gesture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GestureConfig {
    /// Identity inside a gesture array; defaults to the gesture kind name.
    pub key: Option<String>,
    /// `None` accepts any button.
    pub button: Option<MouseButton>,
    /// Modifiers that must all be held.
    pub keys: SmallVec<[KeyModifier; 3]>,
}

impl GestureConfig {
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    #[must_use]
    pub fn with_keys(mut self, keys: &[KeyModifier]) -> Self {
        self.keys = keys.iter().copied().collect();
        self
    }

    pub(crate) fn key_or(&self, kind: GestureKind) -> &str {
        self.key.as_deref().unwrap_or(kind.default_key())
    }

    /// Left-button gestures accept any press on mobile devices.
    pub(crate) fn check_button(&self, event: &WindowEvent, env: &InputEnvironment) -> bool {
        match self.button {
            None => true,
            Some(MouseButton::Left) if env.is_mobile() => true,
            Some(button) => event.button == Some(button),
        }
    }

    pub(crate) fn check_keys(&self, event: &WindowEvent) -> bool {
        self.keys.iter().all(|key| match key {
            KeyModifier::Shift => event.modifiers.shift,
            KeyModifier::Ctrl => event.modifiers.ctrl,
            KeyModifier::Alt => event.modifiers.alt,
        })
    }
}

/// Anything that can say whether a pixel belongs to it.
pub trait Hittable {
    fn hit_test(&self, point: Point) -> bool;
}

/// Receiver of recognized gestures.
pub trait GestureTarget: Hittable {
    fn on_gesture(&mut self, signal: &GestureSignal<'_>);
}

/// Notification delivered to a [`GestureTarget`].
#[derive(Debug, Clone, Copy)]
pub struct GestureSignal<'a> {
    pub kind: GestureKind,
    pub state: GestureState,
    pub event: &'a WindowEvent,
    /// Pointer position the gesture reports; for pinch zoom the midpoint of
    /// the two touches.
    pub position: Point,
    pub start_point: Option<Point>,
    pub elapsed_ms: Option<i64>,
    /// Movement since the previously delivered pan position.
    pub move_offset: Point,
    /// Wheel or pinch direction: `1` zooms out, `-1` zooms in.
    pub delta: f64,
}

impl<'a> GestureSignal<'a> {
    #[must_use]
    pub fn new(kind: GestureKind, state: GestureState, event: &'a WindowEvent) -> Self {
        Self {
            kind,
            state,
            event,
            position: event.position,
            start_point: None,
            elapsed_ms: None,
            move_offset: Point::default(),
            delta: 0.0,
        }
    }
}

/// Hit check shared by the gestures; leaving the window never hits.
pub(crate) fn check_hit(event: &WindowEvent, target: &dyn GestureTarget) -> bool {
    event.kind != EventKind::MouseLeave && target.hit_test(event.position)
}

/// A state machine recognizing one gesture from raw window events.
pub trait Gesture {
    fn kind(&self) -> GestureKind;

    /// Identity inside a [`GestureArray`](crate::interaction::GestureArray).
    fn key(&self) -> &str;

    fn state(&self) -> GestureState;

    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Hover gestures observe events without claiming them.
    fn is_hover(&self) -> bool {
        false
    }

    /// Returns `true` when the event was consumed.
    fn handle_event(
        &mut self,
        event: &WindowEvent,
        env: &mut InputEnvironment,
        target: &mut dyn GestureTarget,
    ) -> bool;

    /// Time-driven recognition (long taps). Called by the host clock.
    fn poll(
        &mut self,
        _now_ms: i64,
        _env: &mut InputEnvironment,
        _target: &mut dyn GestureTarget,
    ) -> bool {
        false
    }

    fn reset(&mut self);
}
