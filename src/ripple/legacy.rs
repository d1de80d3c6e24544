//! The original single-circle ripple.
//!
//! Unlike [`RippleForeground`](super::RippleForeground), this ripple starts
//! from a zero radius after a short delay, and its durations follow the
//! touch-down and touch-up accelerations instead of fixed constants.
//! [`RippleDrawable`](super::RippleDrawable) does not use it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::animation::{lerp, TimingFunction, Transition, Tween};
use crate::canvas::{
    AnimatedProperty, Canvas, CanvasPaintProperty, CanvasProperty, Paint, RenderThreadAnimator,
};
use crate::density::density_scale;
use crate::geometry::Rect;

/// Radius growth while the pointer is down, in px/s² at mdpi.
const TOUCH_DOWN_ACCELERATION: f32 = 1024.0;
/// Extra radius growth once the pointer is released.
const TOUCH_UP_ACCELERATION: f32 = 3400.0;
/// Opacity lost per second during exit.
const OPACITY_DECAY_VELOCITY: f32 = 3.0;
const ENTER_DELAY: Duration = Duration::from_millis(80);

fn duration_ms(ms: f32) -> Duration {
    Duration::from_millis((ms + 0.5).max(0.0) as u64)
}

/// Render-thread state for an exit that started on a hardware canvas.
#[derive(Debug)]
struct HardwareExit {
    x: CanvasProperty,
    y: CanvasProperty,
    radius: CanvasProperty,
    paint: CanvasPaintProperty,
    animators: Vec<Arc<RenderThreadAnimator>>,
    opacity: Arc<RenderThreadAnimator>,
}

#[derive(Debug, Clone, Copy)]
struct ExitDurations {
    radius: Duration,
    opacity: Duration,
}

#[derive(Debug)]
pub struct Ripple {
    bounds: Rect,
    starting: (f32, f32),
    clamped_starting: (f32, f32),
    outer_radius: f32,
    has_max_radius: bool,
    density_scale: f32,
    tween_radius: Tween,
    tween_x: Tween,
    tween_y: Tween,
    opacity: Tween,
    can_use_hardware: bool,
    pending_hardware_exit: Option<ExitDurations>,
    hardware: Option<HardwareExit>,
    /// An exit is running and its end has not been reported yet.
    awaiting_removal: bool,
}

impl Ripple {
    pub fn new(bounds: Rect, x: f32, y: f32, max_radius: i32, density_dpi: u32) -> Self {
        let mut ripple = Self {
            bounds,
            starting: (x, y),
            clamped_starting: (x, y),
            outer_radius: 0.0,
            has_max_radius: false,
            density_scale: 1.0,
            tween_radius: Tween::new(0.0),
            tween_x: Tween::new(0.0),
            tween_y: Tween::new(0.0),
            opacity: Tween::new(1.0),
            can_use_hardware: false,
            pending_hardware_exit: None,
            hardware: None,
            awaiting_removal: false,
        };
        ripple.setup(max_radius, density_dpi);
        ripple
    }

    /// `max_radius` of -1 covers the bounds.
    pub fn setup(&mut self, max_radius: i32, density_dpi: u32) {
        if max_radius >= 0 {
            self.has_max_radius = true;
            self.outer_radius = max_radius as f32;
        } else {
            self.has_max_radius = false;
            self.outer_radius = covering_radius(&self.bounds);
        }
        self.density_scale = density_scale(density_dpi);
        self.clamp_starting_position();
    }

    pub fn on_hotspot_bounds_changed(&mut self, bounds: Rect) {
        self.bounds = bounds;
        if !self.has_max_radius {
            self.outer_radius = covering_radius(&bounds);
            self.clamp_starting_position();
        }
    }

    fn clamp_starting_position(&mut self) {
        let (cx, cy) = self.bounds.center();
        let dx = self.starting.0 - cx;
        let dy = self.starting.1 - cy;
        let r = self.outer_radius;
        if dx * dx + dy * dy > r * r {
            let angle = dy.atan2(dx);
            self.clamped_starting = (cx + angle.cos() * r, cy + angle.sin() * r);
        } else {
            self.clamped_starting = self.starting;
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.starting = (x, y);
        self.clamp_starting_position();
    }

    pub fn enter(&mut self, now: Instant) {
        self.cancel(now);
        let duration = duration_ms(
            1000.0 * (self.outer_radius / TOUCH_DOWN_ACCELERATION * self.density_scale).sqrt(),
        );
        let transition = Transition::new(duration, TimingFunction::Linear).delay(ENTER_DELAY);
        // The enter always runs on the UI thread.
        self.tween_radius.animate_to(1.0, transition.clone(), now);
        self.tween_x.animate_to(1.0, transition.clone(), now);
        self.tween_y.animate_to(1.0, transition, now);
    }

    pub fn exit(&mut self, now: Instant) {
        let remaining = if self.tween_radius.is_animating(now) {
            self.outer_radius - self.current_radius(now)
        } else {
            self.outer_radius
        };
        let opacity = self.opacity.get(now);
        self.cancel(now);

        let durations = ExitDurations {
            radius: duration_ms(
                1000.0
                    * (remaining / (TOUCH_UP_ACCELERATION + TOUCH_DOWN_ACCELERATION)
                        * self.density_scale)
                        .sqrt(),
            ),
            opacity: duration_ms(1000.0 * opacity / OPACITY_DECAY_VELOCITY),
        };
        self.awaiting_removal = true;
        if self.can_use_hardware {
            self.pending_hardware_exit = Some(durations);
        } else {
            self.exit_software(durations, now);
        }
    }

    fn exit_software(&mut self, durations: ExitDurations, now: Instant) {
        let grow = Transition::new(durations.radius, TimingFunction::Logarithmic);
        self.tween_radius.animate_to(1.0, grow.clone(), now);
        self.tween_x.animate_to(1.0, grow.clone(), now);
        self.tween_y.animate_to(1.0, grow, now);
        self.opacity.animate_to(
            0.0,
            Transition::new(durations.opacity, TimingFunction::Linear),
            now,
        );
    }

    fn start_pending_hardware_exit(
        &mut self,
        durations: ExitDurations,
        paint: &Paint,
        canvas: &mut dyn Canvas,
        now: Instant,
    ) {
        let Some(property_canvas) = canvas.property_canvas() else {
            self.exit_software(durations, now);
            return;
        };
        let (x, y) = self.current_center(now);
        let alpha = (paint.alpha() as f32 * self.opacity.get(now) + 0.5) as u8;
        let x = CanvasProperty::new(x);
        let y = CanvasProperty::new(y);
        let radius = CanvasProperty::new(self.current_radius(now));
        let paint_property = CanvasPaintProperty::new(&paint.with_alpha(alpha));

        let grow = Transition::new(durations.radius, TimingFunction::Logarithmic);
        let opacity = Arc::new(RenderThreadAnimator::new(
            AnimatedProperty::PaintAlpha(paint_property.clone()),
            0.0,
            Transition::new(durations.opacity, TimingFunction::Linear),
        ));
        let animators = vec![
            Arc::new(RenderThreadAnimator::new(
                AnimatedProperty::Float(radius.clone()),
                self.outer_radius,
                grow.clone(),
            )),
            Arc::new(RenderThreadAnimator::new(
                AnimatedProperty::Float(x.clone()),
                0.0,
                grow.clone(),
            )),
            Arc::new(RenderThreadAnimator::new(
                AnimatedProperty::Float(y.clone()),
                0.0,
                grow,
            )),
            opacity.clone(),
        ];
        for animator in &animators {
            property_canvas.start_animator(animator.clone(), now);
        }
        log::debug!("Legacy ripple exit handed to the render thread");

        // Software values match where the hardware animation ends.
        self.tween_radius.set(1.0);
        self.tween_x.set(1.0);
        self.tween_y.set(1.0);
        self.opacity.set(0.0);

        self.hardware = Some(HardwareExit {
            x,
            y,
            radius,
            paint: paint_property,
            animators,
            opacity,
        });
    }

    /// Draw relative to the hotspot center. Returns true if anything was drawn.
    pub fn draw(&mut self, canvas: &mut dyn Canvas, paint: &Paint, now: Instant) -> bool {
        let can_use_hardware = canvas.is_hardware_accelerated();
        if self.can_use_hardware && !can_use_hardware {
            log::debug!("Legacy ripple lost its hardware canvas");
            self.cancel_hardware(true);
        }
        self.can_use_hardware = can_use_hardware;

        if can_use_hardware && (self.is_hardware_animating() || self.pending_hardware_exit.is_some())
        {
            self.draw_hardware(canvas, paint, now)
        } else {
            self.draw_software(canvas, paint, now)
        }
    }

    fn draw_hardware(&mut self, canvas: &mut dyn Canvas, paint: &Paint, now: Instant) -> bool {
        if let Some(durations) = self.pending_hardware_exit.take() {
            self.cancel_hardware(false);
            self.start_pending_hardware_exit(durations, paint, canvas, now);
        }
        if let Some(hardware) = &self.hardware {
            if let Some(property_canvas) = canvas.property_canvas() {
                property_canvas.draw_circle_props(
                    &hardware.x,
                    &hardware.y,
                    &hardware.radius,
                    &hardware.paint,
                );
                return true;
            }
        }
        self.draw_software(canvas, paint, now)
    }

    fn draw_software(&mut self, canvas: &mut dyn Canvas, paint: &Paint, now: Instant) -> bool {
        let alpha = (paint.alpha() as f32 * self.opacity.get(now) + 0.5).min(255.0) as u8;
        let radius = self.current_radius(now);
        if alpha == 0 || radius <= 0.0 {
            return false;
        }
        let (x, y) = self.current_center(now);
        canvas.draw_circle(x, y, radius, &paint.with_alpha(alpha));
        true
    }

    pub fn current_radius(&self, now: Instant) -> f32 {
        lerp(0.0, self.outer_radius, self.tween_radius.get(now))
    }

    pub fn current_center(&self, now: Instant) -> (f32, f32) {
        let (cx, cy) = self.bounds.center();
        (
            lerp(self.clamped_starting.0 - cx, 0.0, self.tween_x.get(now)),
            lerp(self.clamped_starting.1 - cy, 0.0, self.tween_y.get(now)),
        )
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        self.opacity.get(now)
    }

    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    pub fn clamped_starting_position(&self) -> (f32, f32) {
        self.clamped_starting
    }

    /// Square around the local origin that contains the finished ripple.
    pub fn local_bounds(&self) -> Rect {
        let r = (self.outer_radius as i32 + 1) as f32;
        Rect::from_ltrb(-r, -r, r, r)
    }

    pub fn is_hardware_animating(&self) -> bool {
        self.hardware
            .as_ref()
            .is_some_and(|hardware| hardware.animators.iter().any(|a| !a.is_finished()))
    }

    pub fn has_pending_hardware_exit(&self) -> bool {
        self.pending_hardware_exit.is_some()
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.tween_radius.is_animating(now)
            || self.tween_x.is_animating(now)
            || self.tween_y.is_animating(now)
            || self.opacity.is_animating(now)
            || self.is_hardware_animating()
    }

    /// Returns true once, when a running exit has finished. The owner
    /// drops the ripple in response.
    pub fn poll_removal(&mut self, now: Instant) -> bool {
        if !self.awaiting_removal || self.pending_hardware_exit.is_some() {
            return false;
        }
        let finished = match &self.hardware {
            Some(hardware) => hardware.opacity.is_finished(),
            None => !self.opacity.is_animating(now),
        };
        if finished {
            self.awaiting_removal = false;
        }
        finished
    }

    /// Jump every animation to its end. The ripple is not reported for removal.
    pub fn jump(&mut self) {
        self.awaiting_removal = false;
        self.tween_radius.end();
        self.tween_x.end();
        self.tween_y.end();
        self.opacity.end();
        self.cancel_hardware(true);
    }

    /// Stop every animation where it is. The ripple is not reported for removal.
    pub fn cancel(&mut self, now: Instant) {
        self.awaiting_removal = false;
        self.tween_radius.cancel(now);
        self.tween_x.cancel(now);
        self.tween_y.cancel(now);
        self.opacity.cancel(now);
        self.cancel_hardware(false);
    }

    fn cancel_hardware(&mut self, jump_to_end: bool) {
        if let Some(hardware) = self.hardware.take() {
            for animator in &hardware.animators {
                if jump_to_end {
                    animator.end();
                } else {
                    animator.cancel();
                }
            }
        }
        if self.pending_hardware_exit.take().is_some() && jump_to_end {
            self.opacity.set(0.0);
            self.tween_radius.set(1.0);
            self.tween_x.set(1.0);
            self.tween_y.set(1.0);
        }
    }
}

fn covering_radius(bounds: &Rect) -> f32 {
    let half_width = bounds.width / 2.0;
    let half_height = bounds.height / 2.0;
    (half_width * half_width + half_height * half_height).sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::color::Color;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn ripple() -> Ripple {
        Ripple::new(Rect::new(0.0, 0.0, 100.0, 100.0), 50.0, 50.0, 64, 160)
    }

    #[test]
    fn test_enter_waits_then_grows() {
        let start = Instant::now();
        let mut ripple = ripple();
        ripple.enter(start);
        assert_eq!(ripple.current_radius(start + ENTER_DELAY), 0.0);
        // sqrt(64 / 1024) s
        assert_abs_diff_eq!(
            ripple.current_radius(start + ENTER_DELAY + ms(250)),
            64.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_touch_clamped_to_outer_radius() {
        let ripple = Ripple::new(Rect::new(0.0, 0.0, 100.0, 100.0), 50.0, -500.0, 20, 160);
        let (x, y) = ripple.clamped_starting_position();
        assert_abs_diff_eq!(x, 50.0, epsilon = 1e-3);
        assert_abs_diff_eq!(y, 30.0, epsilon = 1e-3);
        assert_eq!(ripple.local_bounds(), Rect::from_ltrb(-21.0, -21.0, 21.0, 21.0));
    }

    #[test]
    fn test_software_exit_reports_removal_once() {
        let start = Instant::now();
        let mut ripple = ripple();
        ripple.enter(start);
        let released = start + ms(500);
        ripple.exit(released);
        assert!(!ripple.poll_removal(released));

        // Full opacity decays at 3 per second.
        let done = released + ms(333);
        assert!(ripple.poll_removal(done));
        assert!(!ripple.poll_removal(done));
    }

    #[test]
    fn test_cancel_suppresses_removal() {
        let start = Instant::now();
        let mut ripple = ripple();
        ripple.exit(start);
        ripple.jump();
        assert_eq!(ripple.opacity(start), 0.0);
        assert!(!ripple.poll_removal(start + ms(1000)));
    }

    #[test]
    fn test_hardware_exit_starts_at_draw() {
        let start = Instant::now();
        let paint = Paint::new(Color::WHITE);
        let mut ripple = ripple();
        ripple.enter(start);

        let mut canvas = RecordingCanvas::hardware();
        assert!(!ripple.draw(&mut canvas, &paint, start));
        ripple.exit(start + ms(300));
        assert!(ripple.has_pending_hardware_exit());

        assert!(ripple.draw(&mut canvas, &paint, start + ms(300)));
        assert!(!ripple.has_pending_hardware_exit());
        assert!(ripple.is_hardware_animating());
        assert_eq!(canvas.running_animators(), 4);
        assert!(canvas.circles()[0].from_properties);

        canvas.advance_animations(start + ms(2000));
        assert!(ripple.poll_removal(start + ms(2000)));
    }

    #[test]
    fn test_software_canvas_ends_hardware_exit() {
        let start = Instant::now();
        let paint = Paint::new(Color::WHITE);
        let mut ripple = ripple();
        let mut hardware = RecordingCanvas::hardware();
        ripple.draw(&mut hardware, &paint, start);
        ripple.exit(start);
        ripple.draw(&mut hardware, &paint, start);

        let mut software = RecordingCanvas::new();
        assert!(!ripple.draw(&mut software, &paint, start));
        assert!(!ripple.is_hardware_animating());
        assert!(software.circles().is_empty());
    }
}
