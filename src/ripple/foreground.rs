use std::time::{Duration, Instant};

use super::backend::{AnimationBackend, HardwareBackend, RippleFrame, SoftwareBackend};
use super::{RippleComponent, OPACITY_HOLD_DURATION, STARTING_RADIUS_FACTOR};
use crate::canvas::{Canvas, Paint};
use crate::geometry::Rect;

/// The expanding press ripple.
///
/// A foreground grows from a disc around the touch point toward a circle
/// covering the hotspot bounds while its center slides to the bounds
/// center. All drawing happens relative to the hotspot center; the owner
/// translates the canvas before calling [`draw`](RippleForeground::draw).
///
/// Two backends can animate it. The software backend always runs. A
/// hardware backend is attached the first time the ripple is drawn on a
/// property canvas, and is ended as soon as it is drawn anywhere else.
#[derive(Debug)]
pub struct RippleForeground {
    component: RippleComponent,
    starting: (f32, f32),
    clamped_starting: (f32, f32),
    start_radius: f32,
    software: SoftwareBackend,
    hardware: Option<HardwareBackend>,
    using_properties: bool,
    force_software: bool,
    enter_started_at: Option<Instant>,
    exiting: bool,
    finished: bool,
}

impl RippleForeground {
    /// Create a ripple anchored at `(x, y)` inside `bounds`.
    pub fn new(
        bounds: Rect,
        x: f32,
        y: f32,
        max_radius: i32,
        density_dpi: u32,
        force_software: bool,
    ) -> Self {
        let mut component = RippleComponent::new(bounds);
        component.setup(max_radius, density_dpi);

        let mut foreground = Self {
            component,
            starting: (x, y),
            clamped_starting: (x, y),
            start_radius: bounds.width.max(bounds.height) * STARTING_RADIUS_FACTOR,
            software: SoftwareBackend::new(),
            hardware: None,
            using_properties: false,
            force_software,
            enter_started_at: None,
            exiting: false,
            finished: false,
        };
        foreground.clamp_starting_position();
        foreground
    }

    pub fn enter(&mut self, now: Instant) {
        self.enter_started_at = Some(now);
        self.software.enter(now);
        log::debug!(
            "Ripple entering at ({:.1}, {:.1}), radius {:.1} -> {:.1}",
            self.clamped_starting.0,
            self.clamped_starting.1,
            self.start_radius,
            self.component.target_radius()
        );
    }

    /// Fade out, holding full opacity until the ripple has been visible for
    /// at least [`OPACITY_HOLD_DURATION`].
    pub fn exit(&mut self, paint: &Paint, now: Instant) {
        let elapsed = self
            .enter_started_at
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or(OPACITY_HOLD_DURATION);
        let delay = OPACITY_HOLD_DURATION.saturating_sub(elapsed);
        let frame = self.frame(paint);

        self.exiting = true;
        self.software.exit(&frame, delay, now);
        if let Some(hardware) = self.hardware.as_mut() {
            hardware.exit(&frame, delay, now);
        }
        log::debug!("Ripple exiting after {:?} hold", delay);
    }

    /// Move the touch point. The origin is re-clamped to the target radius.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.starting = (x, y);
        self.clamp_starting_position();
    }

    /// Take new hotspot bounds.
    pub fn on_bounds_change(&mut self, bounds: Rect) {
        if self.component.on_bounds_change(bounds) {
            self.on_target_radius_changed();
        } else {
            self.clamp_starting_position();
        }
    }

    fn on_target_radius_changed(&mut self) {
        self.clamp_starting_position();
        // Hardware animators target the old radius; the software tweens
        // are fractions and pick up the new one on their own.
        if let Some(mut hardware) = self.hardware.take() {
            hardware.cancel();
        }
        self.using_properties = false;
    }

    /// Keep the touch point within `target - start` of the bounds center so
    /// the ripple's edge never leaves its final circle while the origin
    /// slides inward.
    fn clamp_starting_position(&mut self) {
        let (cx, cy) = self.component.bounds().center();
        let dx = self.starting.0 - cx;
        let dy = self.starting.1 - cy;
        let r = (self.component.target_radius() - self.start_radius).max(0.0);
        if dx * dx + dy * dy > r * r {
            let angle = dy.atan2(dx);
            self.clamped_starting = (cx + angle.cos() * r, cy + angle.sin() * r);
        } else {
            self.clamped_starting = self.starting;
        }
    }

    fn frame<'a>(&self, paint: &'a Paint) -> RippleFrame<'a> {
        let (cx, cy) = self.component.bounds().center();
        RippleFrame {
            start_radius: self.start_radius,
            target_radius: self.component.target_radius(),
            origin: (self.clamped_starting.0 - cx, self.clamped_starting.1 - cy),
            paint,
        }
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas, paint: &Paint, now: Instant) {
        let frame = self.frame(paint);
        let hardware_canvas = !self.force_software && canvas.is_hardware_accelerated();

        if !hardware_canvas && self.using_properties {
            self.end_hardware();
        } else if hardware_canvas && self.hardware.is_none() && !self.exiting {
            let radius = self.software.current_radius(&frame, now);
            let center = self.software.current_center(&frame, now);
            let alpha = self.software.current_alpha(paint, now);
            log::trace!("Ripple switching to render-thread animation");
            self.hardware = Some(HardwareBackend::enter(radius, center, alpha, &frame));
        }

        match self.hardware.as_mut() {
            Some(hardware) if hardware_canvas => {
                self.using_properties = true;
                hardware.draw(canvas, &frame, now);
            }
            _ => self.software.draw(canvas, &frame, now),
        }
    }

    /// Fast-forward the hardware animators and hand drawing back to software.
    fn end_hardware(&mut self) {
        if let Some(mut hardware) = self.hardware.take() {
            hardware.end();
            if hardware.is_exiting() {
                self.finished = true;
            }
            log::debug!("Ripple ended render-thread animation for a software canvas");
        }
        self.using_properties = false;
    }

    /// Jump every animation to its end.
    pub fn end(&mut self) {
        self.software.end();
        if let Some(hardware) = self.hardware.as_mut() {
            hardware.end();
        }
        if self.exiting {
            self.finished = true;
        }
    }

    pub fn has_finished_exit(&self, now: Instant) -> bool {
        if self.finished {
            return true;
        }
        match &self.hardware {
            Some(hardware) if self.using_properties => hardware.has_finished_exit(now),
            _ => self.software.has_finished_exit(now),
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        match &self.hardware {
            Some(hardware) if self.using_properties => hardware.is_animating(now),
            _ => self.software.is_animating(now),
        }
    }

    /// Radius as it would be drawn at `now`.
    pub fn current_radius(&self, now: Instant) -> f32 {
        match &self.hardware {
            Some(hardware) if self.using_properties => hardware.radius(),
            _ => {
                let paint = Paint::default();
                self.software.current_radius(&self.frame(&paint), now)
            }
        }
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        self.software.opacity(now)
    }

    pub fn starting_position(&self) -> (f32, f32) {
        self.starting
    }

    pub fn clamped_starting_position(&self) -> (f32, f32) {
        self.clamped_starting
    }

    pub fn start_radius(&self) -> f32 {
        self.start_radius
    }

    pub fn target_radius(&self) -> f32 {
        self.component.target_radius()
    }

    pub fn component(&self) -> &RippleComponent {
        &self.component
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Whether the last draw went through canvas properties.
    pub fn uses_properties(&self) -> bool {
        self.using_properties
    }

    /// Time left before the exit fade starts if the ripple were released at `now`.
    pub fn hold_remaining(&self, now: Instant) -> Duration {
        self.enter_started_at
            .map(|started| OPACITY_HOLD_DURATION.saturating_sub(now.saturating_duration_since(started)))
            .unwrap_or_default()
    }
}
