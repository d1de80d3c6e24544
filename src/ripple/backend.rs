//! The two ways a foreground ripple can be animated.
//!
//! [`SoftwareBackend`] keeps tween fractions on the UI thread and samples
//! them at draw time. [`HardwareBackend`] records the ripple against canvas
//! properties and hands render-thread animators to a [`PropertyCanvas`].
//!
//! [`PropertyCanvas`]: crate::canvas::PropertyCanvas

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{OPACITY_ENTER_DURATION, OPACITY_EXIT_DURATION, RIPPLE_ENTER_DURATION};
use crate::animation::{lerp, TimingFunction, Transition, Tween};
use crate::canvas::{
    AnimatedProperty, Canvas, CanvasPaintProperty, CanvasProperty, Paint, RenderThreadAnimator,
};

/// Geometry and paint a backend draws with.
#[derive(Debug, Clone, Copy)]
pub struct RippleFrame<'a> {
    pub start_radius: f32,
    pub target_radius: f32,
    /// Clamped starting point relative to the hotspot center
    pub origin: (f32, f32),
    pub paint: &'a Paint,
}

/// One animation path of a foreground ripple.
pub trait AnimationBackend {
    /// Fade out after `delay`.
    fn exit(&mut self, frame: &RippleFrame<'_>, delay: Duration, now: Instant);

    fn draw(&mut self, canvas: &mut dyn Canvas, frame: &RippleFrame<'_>, now: Instant);

    /// Jump every animation to its final value.
    fn end(&mut self);

    fn has_finished_exit(&self, now: Instant) -> bool;

    fn is_animating(&self, now: Instant) -> bool;
}

fn enter_transition() -> Transition {
    Transition::new(RIPPLE_ENTER_DURATION, TimingFunction::DECELERATE)
}

fn exit_transition(delay: Duration) -> Transition {
    Transition::linear_ms(OPACITY_EXIT_DURATION.as_millis() as u64).delay(delay)
}

/// Animates tween fractions that are interpolated at draw time.
#[derive(Debug, Clone)]
pub struct SoftwareBackend {
    tween_radius: Tween,
    tween_origin: Tween,
    opacity: Tween,
    exiting: bool,
}

impl SoftwareBackend {
    /// An idle backend; nothing is drawn until [`enter`](Self::enter).
    pub fn new() -> Self {
        Self {
            tween_radius: Tween::new(0.0),
            tween_origin: Tween::new(0.0),
            opacity: Tween::new(0.0),
            exiting: false,
        }
    }

    /// Start growing toward the target radius and fading in.
    pub fn enter(&mut self, now: Instant) {
        self.tween_radius.animate_from(0.0, 1.0, enter_transition(), now);
        self.tween_origin.animate_from(0.0, 1.0, enter_transition(), now);
        self.opacity.animate_from(
            0.0,
            1.0,
            Transition::linear_ms(OPACITY_ENTER_DURATION.as_millis() as u64),
            now,
        );
    }

    pub fn tween_radius(&self, now: Instant) -> f32 {
        self.tween_radius.get(now)
    }

    pub fn tween_origin(&self, now: Instant) -> f32 {
        self.tween_origin.get(now)
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        self.opacity.get(now)
    }

    pub fn current_radius(&self, frame: &RippleFrame<'_>, now: Instant) -> f32 {
        lerp(frame.start_radius, frame.target_radius, self.tween_radius(now))
    }

    pub fn current_center(&self, frame: &RippleFrame<'_>, now: Instant) -> (f32, f32) {
        let t = self.tween_origin(now);
        (lerp(frame.origin.0, 0.0, t), lerp(frame.origin.1, 0.0, t))
    }

    pub fn current_alpha(&self, paint: &Paint, now: Instant) -> u8 {
        (paint.alpha() as f32 * self.opacity(now) + 0.5).clamp(0.0, 255.0) as u8
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationBackend for SoftwareBackend {
    fn exit(&mut self, _frame: &RippleFrame<'_>, delay: Duration, now: Instant) {
        // A fade-in still running plays out before the fade-out begins.
        self.opacity.queue_to(0.0, exit_transition(delay), now);
        self.exiting = true;
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, frame: &RippleFrame<'_>, now: Instant) {
        let alpha = self.current_alpha(frame.paint, now);
        let radius = self.current_radius(frame, now);
        if alpha == 0 || radius <= 0.0 {
            log::trace!("Skipping ripple draw (alpha {}, radius {})", alpha, radius);
            return;
        }
        let (x, y) = self.current_center(frame, now);
        canvas.draw_circle(x, y, radius, &frame.paint.with_alpha(alpha));
    }

    fn end(&mut self) {
        self.tween_radius.end();
        self.tween_origin.end();
        self.opacity.end();
    }

    fn has_finished_exit(&self, now: Instant) -> bool {
        self.exiting && !self.opacity.is_animating(now)
    }

    fn is_animating(&self, now: Instant) -> bool {
        self.tween_radius.is_animating(now)
            || self.tween_origin.is_animating(now)
            || self.opacity.is_animating(now)
    }
}

/// Canvas properties driven by render-thread animators.
#[derive(Debug)]
pub struct HardwareBackend {
    x: CanvasProperty,
    y: CanvasProperty,
    radius: CanvasProperty,
    paint: CanvasPaintProperty,
    pending: Vec<Arc<RenderThreadAnimator>>,
    running: Vec<Arc<RenderThreadAnimator>>,
    exit_animator: Option<Arc<RenderThreadAnimator>>,
}

impl HardwareBackend {
    /// Create properties at the ripple's current values and queue the
    /// enter animators toward the final ones.
    pub fn enter(radius: f32, center: (f32, f32), alpha: u8, frame: &RippleFrame<'_>) -> Self {
        let x = CanvasProperty::new(center.0);
        let y = CanvasProperty::new(center.1);
        let radius_property = CanvasProperty::new(radius);
        let paint = CanvasPaintProperty::new(&frame.paint.with_alpha(alpha));

        let pending = vec![
            Arc::new(RenderThreadAnimator::new(
                AnimatedProperty::Float(radius_property.clone()),
                frame.target_radius,
                enter_transition(),
            )),
            Arc::new(RenderThreadAnimator::new(
                AnimatedProperty::Float(x.clone()),
                0.0,
                enter_transition(),
            )),
            Arc::new(RenderThreadAnimator::new(
                AnimatedProperty::Float(y.clone()),
                0.0,
                enter_transition(),
            )),
            Arc::new(RenderThreadAnimator::new(
                AnimatedProperty::PaintAlpha(paint.clone()),
                frame.paint.alpha() as f32,
                Transition::linear_ms(OPACITY_ENTER_DURATION.as_millis() as u64),
            )),
        ];

        Self {
            x,
            y,
            radius: radius_property,
            paint,
            pending,
            running: Vec::new(),
            exit_animator: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius.get()
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x.get(), self.y.get())
    }

    pub fn alpha(&self) -> u8 {
        self.paint.alpha()
    }

    pub fn is_exiting(&self) -> bool {
        self.exit_animator.is_some()
    }

    /// Stop every animator where it is, for a hand-off back to software.
    pub fn cancel(&mut self) {
        for animator in self.pending.drain(..).chain(self.running.drain(..)) {
            animator.cancel();
        }
        self.exit_animator = None;
    }
}

impl AnimationBackend for HardwareBackend {
    fn exit(&mut self, frame: &RippleFrame<'_>, delay: Duration, _now: Instant) {
        let animator = Arc::new(
            RenderThreadAnimator::new(
                AnimatedProperty::PaintAlpha(self.paint.clone()),
                0.0,
                exit_transition(delay),
            )
            .with_start_value(frame.paint.alpha() as f32),
        );
        self.pending.push(animator.clone());
        self.exit_animator = Some(animator);
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, _frame: &RippleFrame<'_>, now: Instant) {
        let Some(canvas) = canvas.property_canvas() else {
            return;
        };
        for animator in self.pending.drain(..) {
            canvas.start_animator(animator.clone(), now);
            self.running.push(animator);
        }
        self.running.retain(|animator| !animator.is_finished());
        canvas.draw_circle_props(&self.x, &self.y, &self.radius, &self.paint);
    }

    fn end(&mut self) {
        for animator in self.pending.drain(..).chain(self.running.drain(..)) {
            animator.end();
        }
    }

    fn has_finished_exit(&self, _now: Instant) -> bool {
        self.exit_animator
            .as_ref()
            .is_some_and(|animator| animator.is_finished())
    }

    fn is_animating(&self, _now: Instant) -> bool {
        !self.pending.is_empty() || self.running.iter().any(|animator| !animator.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::color::Color;

    fn frame(paint: &Paint) -> RippleFrame<'_> {
        RippleFrame {
            start_radius: 10.0,
            target_radius: 50.0,
            origin: (20.0, 0.0),
            paint,
        }
    }

    #[test]
    fn test_software_enter_reaches_target() {
        let paint = Paint::new(Color::WHITE);
        let start = Instant::now();
        let mut backend = SoftwareBackend::new();
        backend.enter(start);
        let frame = frame(&paint);
        assert_eq!(backend.current_radius(&frame, start), 10.0);
        assert_eq!(backend.current_alpha(&paint, start), 0);

        let done = start + RIPPLE_ENTER_DURATION;
        assert_abs_diff_eq!(backend.current_radius(&frame, done), 50.0, epsilon = 1e-3);
        assert_eq!(backend.current_center(&frame, done), (0.0, 0.0));
        assert_eq!(backend.current_alpha(&paint, done), 255);
        assert!(!backend.is_animating(done));
    }

    #[test]
    fn test_software_exit_holds_then_fades() {
        let paint = Paint::new(Color::WHITE);
        let start = Instant::now();
        let mut backend = SoftwareBackend::new();
        backend.enter(start);
        let delay = Duration::from_millis(200);
        backend.exit(&frame(&paint), delay, start + Duration::from_millis(25));

        let released = start + Duration::from_millis(25);
        assert_eq!(backend.opacity(released + Duration::from_millis(100)), 1.0);
        assert!(!backend.has_finished_exit(released + delay));
        assert!(backend.has_finished_exit(released + delay + OPACITY_EXIT_DURATION));
    }

    #[test]
    fn test_software_exit_keeps_running_fade_in() {
        let paint = Paint::new(Color::WHITE);
        let start = Instant::now();
        let mut backend = SoftwareBackend::new();
        backend.enter(start);
        let released = start + Duration::from_millis(10);
        backend.exit(&frame(&paint), Duration::from_millis(215), released);

        assert_abs_diff_eq!(backend.opacity(released), 10.0 / 75.0, epsilon = 1e-4);
        assert_abs_diff_eq!(
            backend.opacity(start + Duration::from_millis(40)),
            40.0 / 75.0,
            epsilon = 1e-4
        );
        assert_eq!(backend.opacity(start + OPACITY_ENTER_DURATION), 1.0);
        assert_eq!(backend.opacity(start + Duration::from_millis(225)), 1.0);
        assert_abs_diff_eq!(
            backend.opacity(start + Duration::from_millis(300)),
            0.5,
            epsilon = 1e-4
        );
        assert!(backend.has_finished_exit(start + Duration::from_millis(375)));
    }

    #[test]
    fn test_hardware_draw_starts_pending_animators() {
        let paint = Paint::new(Color::WHITE);
        let frame = frame(&paint);
        let start = Instant::now();
        let mut backend = HardwareBackend::enter(10.0, (20.0, 0.0), 0, &frame);
        let mut canvas = RecordingCanvas::hardware();
        backend.draw(&mut canvas, &frame, start);
        assert_eq!(canvas.running_animators(), 4);

        canvas.advance_animations(start + RIPPLE_ENTER_DURATION);
        assert_abs_diff_eq!(backend.radius(), 50.0, epsilon = 1e-4);
        assert_abs_diff_eq!(backend.center().0, 0.0, epsilon = 1e-4);
        assert_eq!(backend.alpha(), 255);

        backend.exit(&frame, Duration::ZERO, start);
        assert!(backend.is_exiting());
        assert!(!backend.has_finished_exit(start));
        backend.end();
        assert!(backend.has_finished_exit(start));
        assert_eq!(backend.alpha(), 0);
    }
}
