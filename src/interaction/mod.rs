//! Pointer input: normalized window events, gesture recognizers and routing
//! to interactive objects.

mod click;
mod context_menu;
mod environment;
mod event;
mod gesture;
mod gesture_array;
mod hover;
mod pan;
mod router;
mod wheel;

pub use click::{ClickGesture, DoubleClickGesture, TapLimits};
pub use context_menu::ContextMenuGesture;
pub use environment::InputEnvironment;
pub use event::{EventKind, Modifiers, MouseButton, PointerKind, WindowEvent};
pub use gesture::{
    Gesture, GestureConfig, GestureKind, GestureSignal, GestureState, GestureTarget, Hittable,
    KeyModifier,
};
pub use gesture_array::GestureArray;
pub use hover::{HoverOptions, MouseHoverGesture};
pub use pan::{PanGesture, PanOptions};
pub use router::{EventHandling, EventRouter};
pub use wheel::MouseWheelGesture;
