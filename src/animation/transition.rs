use serde::{Deserialize, Serialize};

use crate::animation::{Animation, AnimationStep};
use crate::core::date_scale::{DateScale, VisibleRange};
use crate::error::{ChartError, ChartResult};

/// Eases the visible range toward a target, a fixed fraction per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransition {
    target: VisibleRange,
    /// Share of the remaining distance covered per frame, in `(0, 1]`.
    smoothing: f64,
    /// Records; closer than this snaps to the target.
    epsilon: f64,
}

impl ViewportTransition {
    pub const DEFAULT_SMOOTHING: f64 = 0.35;
    pub const DEFAULT_EPSILON: f64 = 0.01;

    pub fn new(target: VisibleRange) -> ChartResult<Self> {
        Self::with_smoothing(target, Self::DEFAULT_SMOOTHING)
    }

    pub fn with_smoothing(target: VisibleRange, smoothing: f64) -> ChartResult<Self> {
        if !target.first.is_finite() || !target.last.is_finite() || target.first > target.last {
            return Err(ChartError::InvalidData(
                "transition target must be finite with first <= last".to_owned(),
            ));
        }
        if !smoothing.is_finite() || smoothing <= 0.0 || smoothing > 1.0 {
            return Err(ChartError::InvalidConfig(
                "transition smoothing must be in (0, 1]".to_owned(),
            ));
        }
        Ok(Self {
            target,
            smoothing,
            epsilon: Self::DEFAULT_EPSILON,
        })
    }

    #[must_use]
    pub fn target(&self) -> VisibleRange {
        self.target
    }

    /// Moves `scale` one frame closer; `Stop` once it sits on the target.
    pub fn step(&self, scale: &mut DateScale) -> ChartResult<AnimationStep> {
        let Some(current) = scale.visible_range() else {
            scale.set_visible_records(self.target.first, self.target.last)?;
            return Ok(AnimationStep::Stop);
        };
        let d_first = self.target.first - current.first;
        let d_last = self.target.last - current.last;
        if d_first.abs() < self.epsilon && d_last.abs() < self.epsilon {
            scale.set_visible_records(self.target.first, self.target.last)?;
            return Ok(AnimationStep::Stop);
        }
        scale.set_visible_records(
            current.first + d_first * self.smoothing,
            current.last + d_last * self.smoothing,
        )?;
        Ok(AnimationStep::Continue)
    }

    #[must_use]
    pub fn into_animation(self) -> Animation<DateScale> {
        Animation::new(move |scale: &mut DateScale| self.step(scale))
    }
}

/// Tuning for the fling that continues a pan after release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticPanConfig {
    /// Multiplicative velocity decay per second.
    pub decay_per_second: f64,
    /// Pixels per second below which the fling stops.
    pub stop_velocity_abs: f64,
}

impl Default for KineticPanConfig {
    fn default() -> Self {
        Self {
            decay_per_second: 0.85,
            stop_velocity_abs: 0.01,
        }
    }
}

impl KineticPanConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.decay_per_second.is_finite()
            || self.decay_per_second <= 0.0
            || self.decay_per_second >= 1.0
        {
            return Err(ChartError::InvalidConfig(
                "kinetic pan decay must be in (0, 1)".to_owned(),
            ));
        }
        if !self.stop_velocity_abs.is_finite() || self.stop_velocity_abs <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "kinetic pan stop velocity must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Decaying horizontal scroll velocity in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticPan {
    config: KineticPanConfig,
    velocity: f64,
}

impl KineticPan {
    pub fn new(config: KineticPanConfig, velocity_px_per_sec: f64) -> ChartResult<Self> {
        if !velocity_px_per_sec.is_finite() {
            return Err(ChartError::InvalidData(
                "kinetic pan velocity must be finite".to_owned(),
            ));
        }
        Ok(Self {
            config: config.validate()?,
            velocity: velocity_px_per_sec,
        })
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.velocity.abs() >= self.config.stop_velocity_abs
    }

    /// Advances by `delta_seconds` and returns the pixel displacement to
    /// apply, or `None` once the velocity fell below the stop threshold.
    pub fn step(&mut self, delta_seconds: f64) -> Option<f64> {
        if !self.is_active() {
            return None;
        }
        let displacement = self.velocity * delta_seconds;
        self.velocity *= self.config.decay_per_second.powf(delta_seconds);
        if !self.is_active() {
            self.velocity = 0.0;
        }
        Some(displacement)
    }

    /// Scrolls `record_count` records by one frame of `frame_seconds` per
    /// tick; stops when the velocity dies out or the scale cannot move.
    #[must_use]
    pub fn into_animation(mut self, record_count: usize, frame_seconds: f64) -> Animation<DateScale> {
        Animation::new(move |scale: &mut DateScale| {
            let Some(pixels) = self.step(frame_seconds) else {
                return Ok(AnimationStep::Stop);
            };
            let moved = scale.scroll_on_pixels(pixels, record_count)?;
            Ok(if moved && self.is_active() {
                AnimationStep::Continue
            } else {
                AnimationStep::Stop
            })
        })
    }
}
