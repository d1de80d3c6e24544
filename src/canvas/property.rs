//! Render-thread animation primitives.
//!
//! A hardware-accelerated canvas records draws against property handles
//! instead of plain values. Animators targeting those handles are handed to
//! the canvas and advanced on whichever thread renders the display list, so
//! every type here is `Send + Sync`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use super::Paint;
use crate::animation::{lerp, Transition};

/// A shared `f32` a display list reads at render time.
#[derive(Debug, Clone)]
pub struct CanvasProperty(Arc<AtomicU32>);

impl CanvasProperty {
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// A paint whose alpha can be animated at render time.
#[derive(Debug, Clone)]
pub struct CanvasPaintProperty {
    paint: Arc<Paint>,
    alpha: Arc<AtomicU32>,
}

impl CanvasPaintProperty {
    pub fn new(paint: &Paint) -> Self {
        Self {
            alpha: Arc::new(AtomicU32::new(paint.alpha() as u32)),
            paint: Arc::new(paint.clone()),
        }
    }

    pub fn alpha(&self) -> u8 {
        self.alpha.load(Ordering::Acquire) as u8
    }

    pub fn set_alpha(&self, alpha: u8) {
        self.alpha.store(alpha as u32, Ordering::Release);
    }

    /// Snapshot of the paint with the current animated alpha.
    pub fn paint(&self) -> Paint {
        self.paint.with_alpha(self.alpha())
    }
}

/// The value a [`RenderThreadAnimator`] writes to.
#[derive(Debug, Clone)]
pub enum AnimatedProperty {
    Float(CanvasProperty),
    PaintAlpha(CanvasPaintProperty),
}

impl AnimatedProperty {
    pub fn get(&self) -> f32 {
        match self {
            AnimatedProperty::Float(property) => property.get(),
            AnimatedProperty::PaintAlpha(paint) => paint.alpha() as f32,
        }
    }

    pub fn set(&self, value: f32) {
        match self {
            AnimatedProperty::Float(property) => property.set(value),
            AnimatedProperty::PaintAlpha(paint) => {
                paint.set_alpha(value.round().clamp(0.0, 255.0) as u8)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AnimatorPhase {
    Pending,
    Running { started_at: Instant, from: f32 },
    Finished,
}

/// An animation descriptor executed by the render thread.
#[derive(Debug)]
pub struct RenderThreadAnimator {
    target: AnimatedProperty,
    start_value: Option<f32>,
    to: f32,
    transition: Transition,
    phase: Mutex<AnimatorPhase>,
}

impl RenderThreadAnimator {
    pub fn new(target: AnimatedProperty, to: f32, transition: Transition) -> Self {
        Self {
            target,
            start_value: None,
            to,
            transition,
            phase: Mutex::new(AnimatorPhase::Pending),
        }
    }

    /// Animate from this value instead of the property's value at start.
    pub fn with_start_value(mut self, value: f32) -> Self {
        self.start_value = Some(value);
        self
    }

    fn phase(&self) -> MutexGuard<'_, AnimatorPhase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn target(&self) -> &AnimatedProperty {
        &self.target
    }

    pub fn final_value(&self) -> f32 {
        self.to
    }

    pub fn start(&self, now: Instant) {
        let mut phase = self.phase();
        if matches!(*phase, AnimatorPhase::Pending) {
            let from = self.start_value.unwrap_or_else(|| self.target.get());
            *phase = AnimatorPhase::Running {
                started_at: now,
                from,
            };
        }
    }

    /// Advance to `now`, writing the property. Returns false once finished.
    pub fn tick(&self, now: Instant) -> bool {
        let mut phase = self.phase();
        let AnimatorPhase::Running { started_at, from } = *phase else {
            return matches!(*phase, AnimatorPhase::Pending);
        };
        let elapsed = now.saturating_duration_since(started_at);
        let Some(active) = elapsed.checked_sub(self.transition.delay) else {
            return true;
        };
        let t = if self.transition.duration.is_zero() {
            1.0
        } else {
            (active.as_secs_f32() / self.transition.duration.as_secs_f32()).min(1.0)
        };
        self.target
            .set(lerp(from, self.to, self.transition.timing.evaluate(t)));
        if t >= 1.0 {
            *phase = AnimatorPhase::Finished;
            return false;
        }
        true
    }

    /// Jump to the final value.
    pub fn end(&self) {
        let mut phase = self.phase();
        if !matches!(*phase, AnimatorPhase::Finished) {
            self.target.set(self.to);
            *phase = AnimatorPhase::Finished;
        }
    }

    /// Stop without touching the property.
    pub fn cancel(&self) {
        *self.phase() = AnimatorPhase::Finished;
    }

    pub fn is_started(&self) -> bool {
        !matches!(*self.phase(), AnimatorPhase::Pending)
    }

    pub fn is_finished(&self) -> bool {
        matches!(*self.phase(), AnimatorPhase::Finished)
    }
}

/// Property-based drawing offered by hardware-accelerated canvases.
pub trait PropertyCanvas {
    fn draw_circle_props(
        &mut self,
        cx: &CanvasProperty,
        cy: &CanvasProperty,
        radius: &CanvasProperty,
        paint: &CanvasPaintProperty,
    );

    /// Hand an animator to the render thread, starting it at `now`.
    fn start_animator(&mut self, animator: Arc<RenderThreadAnimator>, now: Instant);
}
