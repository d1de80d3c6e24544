mod animatable;
mod animator;
mod clock;
mod timing;

use std::time::Duration;

pub use animatable::{lerp, Animatable};
pub use animator::{FloatAnimator, Tween};
pub use clock::{FrameClock, ManualClock, SystemClock};
pub use timing::TimingFunction;

/// Configuration for how a property should animate when it changes
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of the animation
    pub duration: Duration,
    /// Timing function controlling the animation curve
    pub timing: TimingFunction,
    /// Delay before animation starts
    pub delay: Duration,
}

impl Transition {
    /// Create a new transition with the given duration and timing function
    pub fn new(duration: Duration, timing: TimingFunction) -> Self {
        Self {
            duration,
            timing,
            delay: Duration::ZERO,
        }
    }

    /// Shorthand for a linear transition lasting `ms` milliseconds
    pub fn linear_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms), TimingFunction::Linear)
    }

    /// Set the delay before the animation starts
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the duration of the animation
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the timing function
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    /// Delay plus duration.
    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }
}
