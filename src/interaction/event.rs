use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::types::Point;

/// Normalized input event kinds delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    MouseEnter,
    MouseLeave,
    MouseMove,
    MouseDown,
    MouseUp,
    Click,
    DoubleClick,
    ContextMenu,
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
}

impl EventKind {
    #[must_use]
    pub fn pointer_kind(self) -> PointerKind {
        match self {
            Self::TouchStart | Self::TouchMove | Self::TouchEnd => PointerKind::Touch,
            _ => PointerKind::Mouse,
        }
    }

    #[must_use]
    pub fn is_touch(self) -> bool {
        self.pointer_kind() == PointerKind::Touch
    }

    /// Kinds that end a press or drag.
    #[must_use]
    pub fn is_release(self) -> bool {
        matches!(self, Self::MouseUp | Self::MouseLeave | Self::TouchEnd)
    }

    #[must_use]
    pub fn is_press(self) -> bool {
        matches!(self, Self::MouseDown | Self::TouchStart)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// One pointer event in chart pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    pub kind: EventKind,
    pub position: Point,
    pub modifiers: Modifiers,
    pub button: Option<MouseButton>,
    pub timestamp_ms: i64,
    /// Active touch points, for multi-finger gestures.
    pub touches: SmallVec<[Point; 2]>,
    /// Raw wheel delta; negative scrolls up.
    pub wheel_delta: f64,
    /// Pinch scale reported by the platform, when it has one.
    pub scale: Option<f64>,
}

impl WindowEvent {
    #[must_use]
    pub fn new(kind: EventKind, position: Point, timestamp_ms: i64) -> Self {
        let button = matches!(
            kind,
            EventKind::MouseDown | EventKind::MouseUp | EventKind::Click | EventKind::DoubleClick
        )
        .then_some(MouseButton::Left);
        Self {
            kind,
            position,
            modifiers: Modifiers::default(),
            button,
            timestamp_ms,
            touches: SmallVec::new(),
            wheel_delta: 0.0,
            scale: None,
        }
    }

    #[must_use]
    pub fn wheel(position: Point, wheel_delta: f64, timestamp_ms: i64) -> Self {
        Self {
            wheel_delta,
            ..Self::new(EventKind::Wheel, position, timestamp_ms)
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_touches(mut self, touches: &[Point]) -> Self {
        self.touches = touches.iter().copied().collect();
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn pointer_kind(&self) -> PointerKind {
        self.kind.pointer_kind()
    }
}
