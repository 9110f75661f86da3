use crate::core::geometry::Proximity;

/// Per-chart input context shared by every gesture.
///
/// Touch devices emit a synthetic `click` after `touchend`; once a touch was
/// seen, click gestures rely on the touch sequence alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputEnvironment {
    touch_seen: bool,
    mobile: bool,
    /// Larger viewport side in pixels, used to normalize pinch distances.
    viewport_extent: f64,
}

impl InputEnvironment {
    #[must_use]
    pub fn new(mobile: bool) -> Self {
        Self {
            mobile,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    pub fn set_mobile(&mut self, mobile: bool) {
        self.mobile = mobile;
    }

    pub fn mark_touch(&mut self) {
        self.touch_seen = true;
    }

    #[must_use]
    pub fn has_seen_touch(&self) -> bool {
        self.touch_seen
    }

    #[must_use]
    pub fn proximity(&self) -> Proximity {
        Proximity::regular(self.mobile)
    }

    #[must_use]
    pub fn viewport_extent(&self) -> f64 {
        self.viewport_extent
    }

    pub fn set_viewport_extent(&mut self, width: f64, height: f64) {
        self.viewport_extent = width.max(height);
    }
}
