use std::fmt;

use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::{EventKind, WindowEvent};
use crate::interaction::gesture::{Gesture, GestureTarget};

/// Ordered set of gestures sharing one target, unique by [`Gesture::key`].
#[derive(Default)]
pub struct GestureArray {
    gestures: Vec<Box<dyn Gesture + Send>>,
}

impl fmt::Debug for GestureArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.gestures.iter().map(|g| g.key())).finish()
    }
}

impl GestureArray {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `gesture`; returns `false` when its key is already present.
    pub fn add(&mut self, gesture: Box<dyn Gesture + Send>) -> bool {
        if self.contains(gesture.key()) {
            return false;
        }
        self.gestures.push(gesture);
        true
    }

    #[must_use]
    pub fn with(mut self, gesture: Box<dyn Gesture + Send>) -> Self {
        self.add(gesture);
        self
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.gestures.iter().position(|g| g.key() == key) {
            Some(index) => {
                self.gestures.remove(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.gestures.iter().any(|g| g.key() == key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&(dyn Gesture + Send)> {
        self.gestures.iter().find(|g| g.key() == key).map(|g| &**g)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.gestures.iter().map(|g| g.key())
    }

    #[must_use]
    pub fn has_active(&self) -> bool {
        self.gestures.iter().any(|g| !g.is_hover() && g.is_active())
    }

    /// Offers `event` to the gestures in order.
    ///
    /// In bounds, dispatch stops at the first non-hover gesture that consumes
    /// the event; hover gestures never count as consuming. Out of bounds,
    /// only hover gestures see the event, plus every gesture for mouse leave
    /// and mouse up so drags can finish. Returns whether a gesture consumed it.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        in_bounds: bool,
        env: &mut InputEnvironment,
        target: &mut dyn GestureTarget,
    ) -> bool {
        if in_bounds {
            for gesture in &mut self.gestures {
                if gesture.handle_event(event, env, target) && !gesture.is_hover() {
                    return true;
                }
            }
            return false;
        }

        let forward_all = matches!(event.kind, EventKind::MouseLeave | EventKind::MouseUp);
        for gesture in &mut self.gestures {
            if forward_all || gesture.is_hover() {
                gesture.handle_event(event, env, target);
            }
        }
        false
    }

    /// Drives time-based recognition; `true` when any gesture fired.
    pub fn poll(
        &mut self,
        now_ms: i64,
        env: &mut InputEnvironment,
        target: &mut dyn GestureTarget,
    ) -> bool {
        let mut fired = false;
        for gesture in &mut self.gestures {
            fired |= gesture.poll(now_ms, env, target);
        }
        fired
    }

    pub fn reset(&mut self) {
        for gesture in &mut self.gestures {
            gesture.reset();
        }
    }
}
