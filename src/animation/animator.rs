use std::time::{Duration, Instant};

use crate::animation::{lerp, Transition};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Running { started_at: Instant },
    Ended,
    Canceled { value: f32 },
}

/// Time-based animation of a single `f32` from one value to another.
///
/// The animator holds no clock: every query takes the current time, so the
/// value is sampled at draw time rather than pushed on a timer.
#[derive(Clone, Debug)]
pub struct FloatAnimator {
    from: f32,
    to: f32,
    transition: Transition,
    phase: Phase,
}

impl FloatAnimator {
    pub fn new(from: f32, to: f32, transition: Transition) -> Self {
        Self {
            from,
            to,
            transition,
            phase: Phase::Idle,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.phase = Phase::Running { started_at: now };
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    /// Linear progress in [0, 1], ignoring the timing curve.
    /// Stays at 0 while the start delay is pending.
    pub fn fraction(&self, now: Instant) -> f32 {
        match self.phase {
            Phase::Idle => 0.0,
            Phase::Ended | Phase::Canceled { .. } => 1.0,
            Phase::Running { started_at } => {
                let elapsed = now.saturating_duration_since(started_at);
                let Some(active) = elapsed.checked_sub(self.transition.delay) else {
                    return 0.0;
                };
                if self.transition.duration.is_zero() {
                    return 1.0;
                }
                (active.as_secs_f32() / self.transition.duration.as_secs_f32()).min(1.0)
            }
        }
    }

    pub fn sample(&self, now: Instant) -> f32 {
        match self.phase {
            Phase::Idle => self.from,
            Phase::Ended => self.to,
            Phase::Canceled { value } => value,
            Phase::Running { .. } => {
                let eased = self.transition.timing.evaluate(self.fraction(now));
                lerp(self.from, self.to, eased)
            }
        }
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Ended | Phase::Canceled { .. } => true,
            Phase::Running { started_at } => {
                now.saturating_duration_since(started_at) >= self.transition.total()
            }
        }
    }

    pub fn is_running(&self, now: Instant) -> bool {
        matches!(self.phase, Phase::Running { .. }) && !self.is_finished(now)
    }

    /// True once the start delay has passed.
    pub fn has_begun(&self, now: Instant) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Ended | Phase::Canceled { .. } => true,
            Phase::Running { started_at } => {
                now.saturating_duration_since(started_at) >= self.transition.delay
            }
        }
    }

    /// Time left until the animator finishes, including any pending delay.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.phase {
            Phase::Running { started_at } => self
                .transition
                .total()
                .saturating_sub(now.saturating_duration_since(started_at)),
            _ => Duration::ZERO,
        }
    }

    /// Jump straight to the final value.
    pub fn end(&mut self) -> f32 {
        self.phase = Phase::Ended;
        self.to
    }

    /// Stop where the animation currently is.
    pub fn cancel(&mut self, now: Instant) -> f32 {
        let value = self.sample(now);
        self.phase = Phase::Canceled { value };
        value
    }
}

/// A plain `f32` field with an optional animator driving it.
///
/// A second animator can be queued behind the running one with
/// [`queue_to`](Self::queue_to); it takes over once the first has finished.
#[derive(Clone, Debug)]
pub struct Tween {
    value: f32,
    animator: Option<FloatAnimator>,
    queued: Option<FloatAnimator>,
}

impl Tween {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            animator: None,
            queued: None,
        }
    }

    /// Current value: the animator's sample if one is attached.
    pub fn get(&self, now: Instant) -> f32 {
        if let Some(queued) = self.queued.as_ref().filter(|queued| queued.has_begun(now)) {
            return queued.sample(now);
        }
        self.animator
            .as_ref()
            .map(|animator| animator.sample(now))
            .unwrap_or(self.value)
    }

    /// Set the value immediately, dropping any running animation.
    pub fn set(&mut self, value: f32) {
        self.animator = None;
        self.queued = None;
        self.value = value;
    }

    /// Animate toward `target` once the running animation has finished.
    ///
    /// The queued animation starts from the running one's target and its
    /// delay is stretched to cover whatever is left of it. With nothing
    /// running this is the same as [`animate_to`](Self::animate_to).
    pub fn queue_to(&mut self, target: f32, transition: Transition, now: Instant) {
        let Some(current) = self
            .animator
            .as_ref()
            .filter(|animator| !animator.is_finished(now))
        else {
            self.animate_to(target, transition, now);
            return;
        };
        let delay = transition.delay.max(current.remaining(now));
        let mut queued = FloatAnimator::new(current.target(), target, transition.delay(delay));
        queued.start(now);
        self.queued = Some(queued);
    }

    /// Animate from the current value toward `target`, replacing any running animation.
    pub fn animate_to(&mut self, target: f32, transition: Transition, now: Instant) {
        let from = self.get(now);
        self.animate_from(from, target, transition, now);
    }

    pub fn animate_from(&mut self, from: f32, target: f32, transition: Transition, now: Instant) {
        self.value = from;
        self.queued = None;
        let mut animator = FloatAnimator::new(from, target, transition);
        animator.start(now);
        self.animator = Some(animator);
    }

    /// The value the tween will settle at.
    pub fn final_value(&self) -> f32 {
        self.queued
            .as_ref()
            .or(self.animator.as_ref())
            .map(FloatAnimator::target)
            .unwrap_or(self.value)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.animator
            .iter()
            .chain(self.queued.iter())
            .any(|animator| !animator.is_finished(now))
    }

    /// Fold a finished animator into the plain value.
    /// Returns true if an animation completed during this call.
    pub fn settle(&mut self, now: Instant) -> bool {
        let mut completed = false;
        if self.queued.is_some() && self.animator.as_ref().map_or(true, |animator| animator.is_finished(now)) {
            self.animator = self.queued.take();
            completed = true;
        }
        completed | self.settle_current(now)
    }

    fn settle_current(&mut self, now: Instant) -> bool {
        match &self.animator {
            Some(animator) if animator.is_finished(now) => {
                self.value = animator.sample(now);
                self.animator = None;
                true
            }
            _ => false,
        }
    }

    pub fn end(&mut self) {
        if let Some(mut animator) = self.queued.take().or_else(|| self.animator.take()) {
            self.value = animator.end();
        }
        self.animator = None;
    }

    pub fn cancel(&mut self, now: Instant) {
        self.value = self.get(now);
        self.animator = None;
        self.queued = None;
    }
}
