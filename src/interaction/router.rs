use crate::core::types::Point;
use crate::interaction::environment::InputEnvironment;
use crate::interaction::event::WindowEvent;

/// An interactive object taking part in event routing.
pub trait EventHandling {
    /// Higher values sit on top and see events first.
    fn z_index(&self) -> i32;

    fn contains(&self, point: Point) -> bool;

    /// Returns `true` when the event was consumed.
    fn handle_event(&mut self, event: &WindowEvent, env: &mut InputEnvironment) -> bool;
}

/// Delivers events to the topmost object under the pointer.
///
/// The object that consumed a press keeps receiving events until the release,
/// even when the pointer leaves it mid-drag. An event the captor does not
/// consume goes on to the other objects, never back to the captor.
#[derive(Debug, Clone, Default)]
pub struct EventRouter {
    captured: Option<usize>,
    order: Vec<usize>,
}

impl EventRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the object holding the pointer capture.
    #[must_use]
    pub fn captured(&self) -> Option<usize> {
        self.captured
    }

    pub fn release(&mut self) {
        self.captured = None;
    }

    /// Routes `event` through `handlers`; returns the index of the object that
    /// consumed it.
    ///
    /// Objects are tried from the highest z-index down; among equal z-indices
    /// the one added last wins.
    pub fn route<H: EventHandling>(
        &mut self,
        handlers: &mut [H],
        event: &WindowEvent,
        env: &mut InputEnvironment,
    ) -> Option<usize> {
        let mut offered = None;
        if let Some(index) = self.captured {
            if let Some(handler) = handlers.get_mut(index) {
                offered = Some(index);
                let handled = handler.handle_event(event, env);
                if event.kind.is_release() {
                    self.captured = None;
                }
                if handled {
                    return Some(index);
                }
            } else {
                self.captured = None;
            }
        }

        self.order.clear();
        self.order.extend(0..handlers.len());
        self.order
            .sort_by(|&a, &b| handlers[b].z_index().cmp(&handlers[a].z_index()).then(b.cmp(&a)));

        for position in 0..self.order.len() {
            let index = self.order[position];
            if offered == Some(index) {
                continue;
            }
            let handler = &mut handlers[index];
            if !event.kind.is_release() && !handler.contains(event.position) {
                continue;
            }
            if handler.handle_event(event, env) {
                if event.kind.is_press() {
                    self.captured = Some(index);
                }
                return Some(index);
            }
        }
        None
    }
}
