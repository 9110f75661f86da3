//! Frame-throttled animation loop owned by one chart.
//!
//! The host calls [`AnimationController::tick`] from its frame callback while
//! [`AnimationController::needs_frame`] is `true`.

mod transition;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

pub use transition::{KineticPan, KineticPanConfig, ViewportTransition};

use crate::error::{ChartError, ChartResult};

/// Returned by a callback: keep running or leave the run set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStep {
    Continue,
    Stop,
}

pub type AnimationCallback<C> = Box<dyn FnMut(&mut C) -> ChartResult<AnimationStep> + Send>;

pub struct Animation<C> {
    callback: AnimationCallback<C>,
    recurring: bool,
    started: bool,
}

impl<C> fmt::Debug for Animation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("recurring", &self.recurring)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl<C> Animation<C> {
    /// Recurring animation: runs every frame until removed or it returns
    /// [`AnimationStep::Stop`].
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&mut C) -> ChartResult<AnimationStep> + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
            recurring: true,
            started: false,
        }
    }

    /// Runs on the next frame only.
    pub fn once<F>(callback: F) -> Self
    where
        F: FnMut(&mut C) -> ChartResult<AnimationStep> + Send + 'static,
    {
        Self {
            recurring: false,
            ..Self::new(callback)
        }
    }

    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.recurring
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Minimum time between two frames.
    pub interval_ms: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

impl AnimationConfig {
    /// 40 frames per second.
    #[must_use]
    pub fn desktop() -> Self {
        Self {
            interval_ms: 1000.0 / 40.0,
        }
    }

    /// 20 frames per second.
    #[must_use]
    pub fn mobile() -> Self {
        Self {
            interval_ms: 1000.0 / 20.0,
        }
    }

    #[must_use]
    pub fn for_environment(mobile: bool) -> Self {
        if mobile { Self::mobile() } else { Self::desktop() }
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.interval_ms.is_finite() || self.interval_ms < 0.0 {
            return Err(ChartError::InvalidConfig(
                "animation interval must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Registered animations plus the ordered run set driven by [`tick`].
///
/// [`tick`]: AnimationController::tick
pub struct AnimationController<C> {
    config: AnimationConfig,
    animations: IndexMap<AnimationId, Animation<C>>,
    running: Vec<AnimationId>,
    next_id: u64,
    last_frame_ms: Option<i64>,
}

impl<C> fmt::Debug for AnimationController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("config", &self.config)
            .field("registered", &self.animations.len())
            .field("running", &self.running)
            .finish()
    }
}

impl<C> Default for AnimationController<C> {
    fn default() -> Self {
        Self::with_config(AnimationConfig::default())
    }
}

impl<C> AnimationController<C> {
    pub fn new(config: AnimationConfig) -> ChartResult<Self> {
        Ok(Self::with_config(config.validate()?))
    }

    fn with_config(config: AnimationConfig) -> Self {
        Self {
            config,
            animations: IndexMap::new(),
            running: Vec::new(),
            next_id: 0,
            last_frame_ms: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> AnimationConfig {
        self.config
    }

    pub fn set_config(&mut self, config: AnimationConfig) -> ChartResult<()> {
        self.config = config.validate()?;
        Ok(())
    }

    pub fn register(&mut self, animation: Animation<C>) -> AnimationId {
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.animations.insert(id, animation);
        id
    }

    /// Registers and starts in one call.
    pub fn start(&mut self, animation: Animation<C>) -> AnimationId {
        let id = self.register(animation);
        self.add(id);
        id
    }

    /// Drops a registered animation, stopping it first.
    pub fn unregister(&mut self, id: AnimationId) -> bool {
        self.remove(id);
        self.animations.shift_remove(&id).is_some()
    }

    /// Appends to the run set. `false` when already running or unknown.
    pub fn add(&mut self, id: AnimationId) -> bool {
        if self.contains(id) {
            return false;
        }
        let Some(animation) = self.animations.get_mut(&id) else {
            return false;
        };
        animation.started = true;
        if self.running.is_empty() {
            trace!("animation loop started");
        }
        self.running.push(id);
        true
    }

    /// Leaves the run set; `false` when it was not running.
    pub fn remove(&mut self, id: AnimationId) -> bool {
        let Some(index) = self.running.iter().position(|running| *running == id) else {
            return false;
        };
        self.running.remove(index);
        if let Some(animation) = self.animations.get_mut(&id) {
            animation.started = false;
        }
        true
    }

    #[must_use]
    pub fn contains(&self, id: AnimationId) -> bool {
        self.running.contains(&id)
    }

    #[must_use]
    pub fn get(&self, id: AnimationId) -> Option<&Animation<C>> {
        self.animations.get(&id)
    }

    /// Size of the run set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.running.is_empty()
    }

    /// Whether the host should schedule another frame.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.is_running()
    }

    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.running) {
            if let Some(animation) = self.animations.get_mut(&id) {
                animation.started = false;
            }
        }
    }

    /// Runs every animation in the run set once, in the order they were added,
    /// unless less than the configured interval elapsed since the last frame.
    ///
    /// Returns how many callbacks ran. A failing callback is logged and the
    /// remaining ones still run.
    pub fn tick(&mut self, now_ms: i64, context: &mut C) -> usize {
        if self.running.is_empty() {
            return 0;
        }
        if let Some(last) = self.last_frame_ms {
            if ((now_ms - last) as f64) < self.config.interval_ms {
                return 0;
            }
        }

        let mut ran = 0;
        let mut index = 0;
        while index < self.running.len() {
            let id = self.running[index];
            let Some(animation) = self.animations.get_mut(&id) else {
                self.running.remove(index);
                continue;
            };

            let step = match (animation.callback)(context) {
                Ok(step) => step,
                Err(e) => {
                    warn!(animation = id.0, error = %e, "animation callback failed");
                    AnimationStep::Continue
                }
            };
            ran += 1;

            if step == AnimationStep::Stop || !animation.recurring {
                animation.started = false;
                self.running.remove(index);
            } else {
                index += 1;
            }
        }

        self.last_frame_ms = Some(now_ms);
        if self.running.is_empty() {
            trace!("animation loop stopped");
        }
        ran
    }
}
